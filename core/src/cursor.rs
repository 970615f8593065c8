use thiserror::Error;

use ultraviolet::vec::{
	Vec2,
	Vec3,
	Vec4
};

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum CursorError {
	#[error("Read of {wanted} bytes at 0x{offset:08X} runs past the end of the buffer ({len} bytes)")]
	Truncated {
		offset: usize,
		wanted: usize,
		len: usize,
	},
}

/// Sequential little endian reader over an in-memory buffer.
///
/// Resource offsets are absolute within the buffer, so the cursor
/// supports free seeking; seeking past the end is only reported once a
/// read is attempted there.
#[derive(Clone, Copy, Debug)]
pub struct ByteCursor<'a> {
	data: &'a [u8],
	pos: usize,
}

impl<'a> ByteCursor<'a> {
	pub fn new(data: &'a [u8]) -> ByteCursor<'a> {
		ByteCursor {
			data: data,
			pos: 0,
		}
	}

	pub fn pos(&self) -> usize {
		self.pos
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn seek(&mut self, pos: usize) {
		self.pos = pos;
	}

	fn take(&mut self, wanted: usize) -> Result<&'a [u8], CursorError> {
		if self.pos + wanted > self.data.len() {
			return Err(CursorError::Truncated {
				offset: self.pos,
				wanted: wanted,
				len: self.data.len(),
			});
		}

		let slice = &self.data[self.pos..self.pos + wanted];
		self.pos += wanted;
		Ok(slice)
	}

	pub fn skip(&mut self, count: usize) -> Result<(), CursorError> {
		self.take(count)?;
		Ok(())
	}

	/// Reads a raw byte block
	pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], CursorError> {
		self.take(count)
	}

	pub fn read_u8(&mut self) -> Result<u8, CursorError> {
		Ok(self.take(1)?[0])
	}

	pub fn read_u16(&mut self) -> Result<u16, CursorError> {
		let b = self.take(2)?;
		Ok(u16::from_le_bytes([b[0], b[1]]))
	}

	pub fn read_u32(&mut self) -> Result<u32, CursorError> {
		let b = self.take(4)?;
		Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
	}

	pub fn read_f32(&mut self) -> Result<f32, CursorError> {
		let b = self.take(4)?;
		Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
	}

	/// Reads a little endian 2D vector
	pub fn read_vec2(&mut self) -> Result<Vec2, CursorError> {
		let x = self.read_f32()?;
		let y = self.read_f32()?;

		Ok(Vec2::new(x, y))
	}

	/// Reads a little endian 3D vector
	pub fn read_vec3(&mut self) -> Result<Vec3, CursorError> {
		let x = self.read_f32()?;
		let y = self.read_f32()?;
		let z = self.read_f32()?;

		Ok(Vec3::new(x, y, z))
	}

	/// Reads a little endian 4D vector
	pub fn read_vec4(&mut self) -> Result<Vec4, CursorError> {
		let x = self.read_f32()?;
		let y = self.read_f32()?;
		let z = self.read_f32()?;
		let w = self.read_f32()?;

		Ok(Vec4::new(x, y, z, w))
	}
}
