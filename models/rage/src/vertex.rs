//! Vertex declarations and stride-keyed vertex record decoding.

use ultraviolet::vec::{
	Vec2,
	Vec3,
	Vec4
};

use ragekit_core::cursor::ByteCursor;

use crate::RageImportError;

/// The closed set of byte strides with a known field layout
pub const SUPPORTED_STRIDES: [u16; 6] = [28, 36, 44, 52, 60, 68];

/// Describes the byte stride and usage of a vertex stream.
/// `usage_flags` is diagnostic only; the stride alone selects the
/// decode layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexDeclaration {
	pub usage_flags: u32,
	pub stride: u16,
	pub decoder: u8,
	pub decl_type: u8,
	pub unknown_8: u32,
	pub unknown_c: u32,
}

impl VertexDeclaration {
	#[cfg(feature = "import")]
	pub fn read(cur: &mut ByteCursor<'_>) -> Result<VertexDeclaration, RageImportError> {
		Ok(VertexDeclaration {
			usage_flags: cur.read_u32()?,
			stride: cur.read_u16()?,
			decoder: cur.read_u8()?,
			decl_type: cur.read_u8()?,
			unknown_8: cur.read_u32()?,
			unknown_c: cur.read_u32()?,
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkinInfluence {
	pub weights: [u8; 4],
	pub indices: [u8; 4],
}

/// One decoded vertex record. Colors are raw bytes, not normalized;
/// which optional fields are present follows from the stride.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
	pub position: Vec3,
	pub normal: Option<Vec3>,
	pub color: [u8; 4],
	pub color2: Option<[u8; 4]>,
	pub uv: Vec2,
	pub uv2: Option<Vec2>,
	pub tangent: Option<Vec4>,
	pub skin: Option<SkinInfluence>,
}

impl Vertex {
	/// Decodes one vertex record, consuming exactly `stride` bytes.
	///
	/// | stride | fields                                                  |
	/// |--------|---------------------------------------------------------|
	/// | 28     | position, color, color2, uv                             |
	/// | 36     | position, normal, color, uv                             |
	/// | 44     | position, skin, normal, color, uv                       |
	/// | 52     | position, normal, color, uv, tangent                    |
	/// | 60     | position, skin, normal, color, uv, tangent              |
	/// | 68     | position, skin, normal, color, uv, uv2, tangent         |
	///
	/// A stride outside the table fails before any byte is consumed.
	#[cfg(feature = "import")]
	pub fn read(cur: &mut ByteCursor<'_>, stride: u16) -> Result<Vertex, RageImportError> {
		if !SUPPORTED_STRIDES.contains(&stride) {
			return Err(RageImportError::UnsupportedStride(stride));
		}

		let position = cur.read_vec3()?;

		let skin = match stride {
			44 | 60 | 68 => Some(SkinInfluence {
				weights: read_bytes4(cur)?,
				indices: read_bytes4(cur)?,
			}),
			_ => None,
		};

		let normal = if stride == 28 {
			None
		} else {
			Some(cur.read_vec3()?)
		};

		let color = read_bytes4(cur)?;
		let color2 = if stride == 28 {
			Some(read_bytes4(cur)?)
		} else {
			None
		};

		let uv = cur.read_vec2()?;
		let uv2 = if stride == 68 {
			Some(cur.read_vec2()?)
		} else {
			None
		};

		let tangent = match stride {
			52 | 60 | 68 => Some(cur.read_vec4()?),
			_ => None,
		};

		Ok(Vertex {
			position: position,
			normal: normal,
			color: color,
			color2: color2,
			uv: uv,
			uv2: uv2,
			tangent: tangent,
			skin: skin,
		})
	}
}

#[cfg(feature = "import")]
fn read_bytes4(cur: &mut ByteCursor<'_>) -> Result<[u8; 4], RageImportError> {
	let b = cur.read_bytes(4)?;
	Ok([b[0], b[1], b[2], b[3]])
}
