//! RSC resource containers: a 12-byte header encoding type, version and
//! two flags-derived memory region sizes, followed by an optionally
//! zlib-compressed payload.

use byteorder::{
	LE,
	ReadBytesExt
};

pub static MAGIC: &[u8; 3] = b"RSC";

/// Fixed container header
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Header {
	pub file_type: u8,
	pub version: u32,
	pub flags: u32,
}

impl Header {
	/// Size of the region holding bookkeeping structures. Also the
	/// displacement between on-disk data offsets and the vertex/index
	/// payloads they address.
	pub const fn system_mem_size(&self) -> u32 {
		(self.flags & 0x7FF) << (((self.flags >> 11) & 0xF) + 8)
	}

	pub const fn graphics_mem_size(&self) -> u32 {
		((self.flags >> 15) & 0x7FF) << (((self.flags >> 26) & 0xF) + 8)
	}

	pub const fn total_mem_size(&self) -> u32 {
		self.system_mem_size() + self.graphics_mem_size()
	}

	#[cfg(feature = "import")]
	pub fn read<R>(buf: &mut R) -> Result<Header, import::RscImportError>
	where
		R: ReadBytesExt,
	{
		let mut magic = [0; 3];
		buf.read_exact(&mut magic)?;
		if &magic != MAGIC {
			return Err(import::RscImportError::Magic(magic));
		}

		Ok(Header {
			file_type: buf.read_u8()?,
			version: buf.read_u32::<LE>()?,
			flags: buf.read_u32::<LE>()?,
		})
	}
}

/// A parsed container with its payload ready for format decoding
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
	pub header: Header,
	pub payload: Vec<u8>,
	/// Whether the payload bytes were stored zlib-compressed. An
	/// uncompressed payload is a normal storage variant, not an error.
	pub compressed: bool,
}

impl Container {
	#[cfg(feature = "import")]
	pub fn read(data: &[u8]) -> Result<Container, import::RscImportError> {
		let mut buf = data;
		let header = Header::read(&mut buf)?;

		// Compression is detected by trial inflation; some resources
		// are stored raw.
		match import::inflate(buf) {
			Some(payload) => Ok(Container {
				header: header,
				payload: payload,
				compressed: true,
			}),
			None => Ok(Container {
				header: header,
				payload: buf.to_vec(),
				compressed: false,
			}),
		}
	}
}

#[cfg(feature = "import")]
pub mod import {
	use std::io::{
		self,
		Read
	};

	use flate2::read::ZlibDecoder;
	use thiserror::Error;

	#[derive(Debug, Error)]
	pub enum RscImportError {
		#[error("I/O error")]
		IO {
			#[from]
			source: io::Error,
		},
		#[error("Not an RSC resource: {0:02X?}")]
		Magic([u8; 3]),
	}

	/// Attempts zlib inflation, returning `None` when the bytes are not
	/// a valid zlib stream
	pub(crate) fn inflate(data: &[u8]) -> Option<Vec<u8>> {
		if data.is_empty() {
			return None;
		}

		let mut out = vec![];
		match ZlibDecoder::new(data).read_to_end(&mut out) {
			Ok(_) => Some(out),
			Err(_) => None,
		}
	}
}
