#[cfg(feature = "cursor")]
pub mod cursor;

#[cfg(feature = "trace")]
pub mod trace;
