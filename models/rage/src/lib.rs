//! Decoders for RAGE "openFormat" drawable resources: WDR drawables,
//! WDD drawable dictionaries and WBD bounds dictionaries.
//!
//! Everything here is a pure transform over an in-memory byte buffer.
//! Scene construction, materials and text metadata formats are left to
//! the caller.

pub mod offset;
pub mod vertex;
pub mod wbd;
pub mod wdd;
pub mod wdr;

use std::io;

use thiserror::Error;

use ragekit_core::cursor::CursorError;

#[derive(Debug, Error)]
pub enum RageImportError {
	#[error("Resource container error")]
	Container {
		#[from]
		source: ragekit_archives_rsc::import::RscImportError,
	},
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error("Truncated stream")]
	Truncated {
		#[from]
		source: CursorError,
	},
	#[error("Unsupported vertex stride: {0}")]
	UnsupportedStride(u16),
}

/// Non-fatal observations made while decoding, kept alongside the
/// decoded value rather than aborting it
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DecodeNote {
	/// The dictionary vtable did not match [`wdd::DICTIONARY_VTABLE`].
	/// The value is an integrity hint, not required for decoding.
	DictionaryVTable {
		found: u32,
	},
	/// The geometry record and its vertex declaration disagree on the
	/// stride. The declaration's value was used for layout selection.
	StrideMismatch {
		geometry: usize,
		declaration: u16,
		record: u16,
	},
}
