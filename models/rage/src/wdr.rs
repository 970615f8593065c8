//! WDR drawable geometry decoding: drawable header → model collection
//! → model → geometry array → vertex/index buffers → typed vertex
//! stream and triangle list.
//!
//! The walk is a pure function of the decompressed payload, the rebase
//! origin and the container's system memory size. Embedded dictionary
//! entries use the same walk with a non-zero origin.

use ultraviolet::vec::Vec4;

use ragekit_core::{
	cursor::{
		ByteCursor,
		CursorError
	},
	trace::TraceLog
};

use ragekit_archives_rsc::Container;

use crate::{
	DecodeNote,
	RageImportError,
	offset::RebaseContext,
	vertex::{
		Vertex,
		VertexDeclaration
	}
};

/// Fixed drawable header length
pub const HEADER_SIZE: usize = 0x94;

/// Full drawable header. Pointers that the decoder does not follow
/// (shader group, skeleton, LOD collections, 2dfx) are kept raw, tag
/// nibble included.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawableHeader {
	pub vtable: u32,
	pub header_length: u8,
	pub shader_group_offset: u32,
	pub skeleton_offset: u32,
	pub center: Vec4,
	pub min: Vec4,
	pub max: Vec4,
	/// Payload-local position of the model collection
	pub model_collection_offset: u32,
	pub lod_collection_offsets: [u32; 3],
	pub max_extent: Vec4,
	pub object_count: u32,
	pub unknown_64: u32,
	pub unknown_68: u32,
	pub unknown_6c: u32,
	pub unknown_70: f32,
	pub unknown_74: u32,
	pub unknown_78: u32,
	pub unknown_7c: u32,
	pub fx_offset: u32,
	pub fx_count: u16,
	pub fx_size: u16,
	pub reserved_88: [u8; 8],
	pub end_marker: u32,
}

/// Model collection record the drawable header points at
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelCollectionInfo {
	/// Payload-local position of the model pointer table
	pub ptr_table_offset: u32,
	pub model_count: u16,
	pub model_count2: u16,
	pub padding_8: u32,
	pub padding_c: u32,
}

/// Model record: owns the geometry pointer array
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelInfo {
	pub vtable: u32,
	/// Payload-local position of the geometry pointer array
	pub geometry_collection_offset: u32,
	pub geometry_ptr_count: u16,
	pub geometry_count: u16,
	pub vector_array_offset: u32,
	pub material_array_offset: u32,
	pub unknown_14: u16,
	pub unknown_16: u16,
	pub unknown_18: u16,
	pub geometry_count2: u16,
	pub padding: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexBufferInfo {
	pub vtable: u32,
	pub vertex_count: u16,
	pub unknown_6: u16,
	/// Payload-local; the vertex records live `system_mem` bytes past it
	pub data_offset: u32,
	pub stride: u32,
	pub declaration_offset: u32,
	pub unknown_14: u32,
	pub data_offset2: u32,
	pub unknown_1c: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexBufferInfo {
	pub vtable: u32,
	pub index_count: u32,
	/// Payload-local; the index words live `system_mem` bytes past it
	pub data_offset: u32,
	pub unknown_c: u32,
	/// Opaque trailing block, preserved but not interpreted
	pub reserved: [u8; 0x30],
}

/// One decoded geometry: buffer records plus the typed vertex stream
/// and triangle list built from them
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryBlock {
	pub vtable: u32,
	pub unknown_04: [u32; 2],
	pub vertex_buffer_offset: u32,
	pub unknown_10: [u32; 3],
	pub index_buffer_offset: u32,
	pub unknown_20: [u32; 3],
	pub index_count: u32,
	pub face_count: u32,
	pub vertex_count: u16,
	pub primitive_type: u16,
	pub unknown_38: u32,
	pub vertex_stride: u16,
	pub unknown_3e: u16,
	pub unknown_40: [u32; 3],
	pub padding: u32,
	pub vertex_buffer: VertexBufferInfo,
	pub index_buffer: IndexBufferInfo,
	pub declaration: VertexDeclaration,
	pub vertices: Vec<Vertex>,
	pub triangles: Vec<[u16; 3]>,
}

/// A geometry that failed to decode; siblings still succeed
#[derive(Debug)]
pub struct GeometrySkip {
	pub index: usize,
	/// Payload-local position of the failed geometry record
	pub offset: u32,
	pub error: RageImportError,
}

#[derive(Debug)]
pub struct DrawableModel {
	pub header: DrawableHeader,
	pub collection: ModelCollectionInfo,
	pub model: ModelInfo,
	pub geometries: Vec<GeometryBlock>,
	pub skipped: Vec<GeometrySkip>,
	pub notes: Vec<DecodeNote>,
	pub trace: TraceLog,
}

impl DrawableModel {
	/// Decodes a drawable from its decompressed payload.
	///
	/// `rebase.origin` must be the payload's placement offset when it
	/// was sliced out of a dictionary, zero for a standalone file.
	/// `system_mem` is the system memory size of the container that
	/// wrapped this payload.
	#[cfg(feature = "import")]
	pub fn read(
		payload: &[u8],
		rebase: &RebaseContext,
		system_mem: u32,
	) -> Result<DrawableModel, RageImportError> {
		import::DrawableReader::new(payload, *rebase, system_mem).read()
	}
}

/// Reads a standalone `.wdr` file: container first, then the drawable
/// walk with a zero origin
#[cfg(feature = "import")]
pub fn read_wdr(data: &[u8]) -> Result<DrawableModel, RageImportError> {
	let container = Container::read(data)?;

	DrawableModel::read(
		&container.payload,
		&RebaseContext::TOP_LEVEL,
		container.header.system_mem_size(),
	)
}

#[cfg(feature = "import")]
mod import {
	use super::*;

	pub(super) struct DrawableReader<'a> {
		cur: ByteCursor<'a>,
		rebase: RebaseContext,
		system_mem: u32,
		trace: TraceLog,
		notes: Vec<DecodeNote>,
	}

	impl<'a> DrawableReader<'a> {
		pub(super) fn new(
			payload: &'a [u8],
			rebase: RebaseContext,
			system_mem: u32,
		) -> DrawableReader<'a> {
			DrawableReader {
				cur: ByteCursor::new(payload),
				rebase: rebase,
				system_mem: system_mem,
				trace: TraceLog::new(),
				notes: vec![],
			}
		}

		fn read_u16_tr(&mut self, field: &'static str) -> Result<u16, RageImportError> {
			let offset = self.cur.pos();
			let value = self.cur.read_u16()?;
			self.trace.record(offset, field, value);
			Ok(value)
		}

		fn read_u32_tr(&mut self, field: &'static str) -> Result<u32, RageImportError> {
			let offset = self.cur.pos();
			let value = self.cur.read_u32()?;
			self.trace.record(offset, field, value);
			Ok(value)
		}

		/// Reads a tagged pointer and returns its payload-local position
		fn read_offset(&mut self, field: &'static str) -> Result<u32, RageImportError> {
			let offset = self.cur.pos();
			let raw = self.cur.read_u32()?;
			self.trace.record(offset, field, raw);
			Ok(self.rebase.rebase(raw))
		}

		pub(super) fn read(mut self) -> Result<DrawableModel, RageImportError> {
			if self.cur.len() < HEADER_SIZE {
				return Err(CursorError::Truncated {
					offset: 0,
					wanted: HEADER_SIZE,
					len: self.cur.len(),
				}
				.into());
			}

			let header = self.read_header()?;
			let collection = self.read_collection(&header)?;
			let model = self.read_model(&collection)?;

			self.cur.seek(model.geometry_collection_offset as usize);
			let mut offsets = Vec::with_capacity(model.geometry_count as usize);
			for _ in 0..model.geometry_count {
				offsets.push(self.read_offset("geometry_offset")?);
			}

			let mut geometries = vec![];
			let mut skipped = vec![];
			for (i, &offset) in offsets.iter().enumerate() {
				// One bad geometry must not take its siblings down
				match self.read_geometry(i, offset) {
					Ok(geometry) => geometries.push(geometry),
					Err(error) => skipped.push(GeometrySkip {
						index: i,
						offset: offset,
						error: error,
					}),
				}
			}

			Ok(DrawableModel {
				header: header,
				collection: collection,
				model: model,
				geometries: geometries,
				skipped: skipped,
				notes: self.notes,
				trace: self.trace,
			})
		}

		fn read_header(&mut self) -> Result<DrawableHeader, RageImportError> {
			let vtable = self.read_u32_tr("vtable")?;
			let header_length = self.cur.read_u8()?;
			self.cur.skip(3)?;
			let shader_group_offset = self.read_u32_tr("shader_group_offset")?;
			let skeleton_offset = self.read_u32_tr("skeleton_offset")?;
			let center = self.cur.read_vec4()?;
			let min = self.cur.read_vec4()?;
			let max = self.cur.read_vec4()?;

			// 0x40: the model collection pointer, then one pointer per
			// LOD collection
			let model_collection_offset = self.read_offset("model_collection_offset")?;
			let lod_collection_offsets = [
				self.cur.read_u32()?,
				self.cur.read_u32()?,
				self.cur.read_u32()?,
			];

			let max_extent = self.cur.read_vec4()?;
			let object_count = self.read_u32_tr("object_count")?;

			let unknown_64 = self.cur.read_u32()?;
			let unknown_68 = self.cur.read_u32()?;
			let unknown_6c = self.cur.read_u32()?;
			let unknown_70 = self.cur.read_f32()?;
			let unknown_74 = self.cur.read_u32()?;
			let unknown_78 = self.cur.read_u32()?;
			let unknown_7c = self.cur.read_u32()?;

			let fx_offset = self.read_u32_tr("fx_offset")?;
			let fx_count = self.cur.read_u16()?;
			let fx_size = self.cur.read_u16()?;
			let reserved = self.cur.read_bytes(8)?;
			let mut reserved_88 = [0; 8];
			reserved_88.copy_from_slice(reserved);
			let end_marker = self.cur.read_u32()?;

			Ok(DrawableHeader {
				vtable: vtable,
				header_length: header_length,
				shader_group_offset: shader_group_offset,
				skeleton_offset: skeleton_offset,
				center: center,
				min: min,
				max: max,
				model_collection_offset: model_collection_offset,
				lod_collection_offsets: lod_collection_offsets,
				max_extent: max_extent,
				object_count: object_count,
				unknown_64: unknown_64,
				unknown_68: unknown_68,
				unknown_6c: unknown_6c,
				unknown_70: unknown_70,
				unknown_74: unknown_74,
				unknown_78: unknown_78,
				unknown_7c: unknown_7c,
				fx_offset: fx_offset,
				fx_count: fx_count,
				fx_size: fx_size,
				reserved_88: reserved_88,
				end_marker: end_marker,
			})
		}

		fn read_collection(
			&mut self,
			header: &DrawableHeader,
		) -> Result<ModelCollectionInfo, RageImportError> {
			self.cur.seek(header.model_collection_offset as usize);

			Ok(ModelCollectionInfo {
				ptr_table_offset: self.read_offset("model_ptr_table_offset")?,
				model_count: self.read_u16_tr("model_count")?,
				model_count2: self.cur.read_u16()?,
				padding_8: self.cur.read_u32()?,
				padding_c: self.cur.read_u32()?,
			})
		}

		fn read_model(
			&mut self,
			collection: &ModelCollectionInfo,
		) -> Result<ModelInfo, RageImportError> {
			self.cur.seek(collection.ptr_table_offset as usize);
			let model_offset = self.read_offset("model_offset")?;
			self.cur.seek(model_offset as usize);

			Ok(ModelInfo {
				vtable: self.read_u32_tr("model_vtable")?,
				geometry_collection_offset: self.read_offset("geometry_collection_offset")?,
				geometry_ptr_count: self.read_u16_tr("geometry_ptr_count")?,
				geometry_count: self.read_u16_tr("geometry_count")?,
				vector_array_offset: self.cur.read_u32()?,
				material_array_offset: self.cur.read_u32()?,
				unknown_14: self.cur.read_u16()?,
				unknown_16: self.cur.read_u16()?,
				unknown_18: self.cur.read_u16()?,
				geometry_count2: self.cur.read_u16()?,
				padding: self.cur.read_u32()?,
			})
		}

		fn read_geometry(
			&mut self,
			index: usize,
			offset: u32,
		) -> Result<GeometryBlock, RageImportError> {
			self.cur.seek(offset as usize);

			let vtable = self.read_u32_tr("geometry_vtable")?;
			let unknown_04 = [self.cur.read_u32()?, self.cur.read_u32()?];
			let vertex_buffer_offset = self.read_offset("vertex_buffer_offset")?;
			let unknown_10 = [
				self.cur.read_u32()?,
				self.cur.read_u32()?,
				self.cur.read_u32()?,
			];
			let index_buffer_offset = self.read_offset("index_buffer_offset")?;
			let unknown_20 = [
				self.cur.read_u32()?,
				self.cur.read_u32()?,
				self.cur.read_u32()?,
			];
			let index_count = self.read_u32_tr("index_count")?;
			let face_count = self.read_u32_tr("face_count")?;
			let vertex_count = self.read_u16_tr("vertex_count")?;
			let primitive_type = self.read_u16_tr("primitive_type")?;
			let unknown_38 = self.cur.read_u32()?;
			let vertex_stride = self.read_u16_tr("vertex_stride")?;
			let unknown_3e = self.cur.read_u16()?;
			let unknown_40 = [
				self.cur.read_u32()?,
				self.cur.read_u32()?,
				self.cur.read_u32()?,
			];
			let padding = self.cur.read_u32()?;

			let vertex_buffer = self.read_vertex_buffer(vertex_buffer_offset)?;

			self.cur.seek(vertex_buffer.declaration_offset as usize);
			let declaration = VertexDeclaration::read(&mut self.cur)?;

			// The geometry record's stride is sometimes stale; the
			// declaration is authoritative, a disagreement is flagged.
			if declaration.stride != vertex_stride {
				self.notes.push(DecodeNote::StrideMismatch {
					geometry: index,
					declaration: declaration.stride,
					record: vertex_stride,
				});
			}

			// Vertex payload lives past the system memory region
			let data_start = vertex_buffer.data_offset.wrapping_add(self.system_mem);
			self.cur.seek(data_start as usize);
			let mut vertices = Vec::with_capacity(vertex_buffer.vertex_count as usize);
			for _ in 0..vertex_buffer.vertex_count {
				vertices.push(Vertex::read(&mut self.cur, declaration.stride)?);
			}

			let index_buffer = self.read_index_buffer(index_buffer_offset)?;

			// Triangle list: three consecutive u16 words per face,
			// trailing non-triangle remainder dropped
			let index_start = index_buffer.data_offset.wrapping_add(self.system_mem);
			self.cur.seek(index_start as usize);

			// The count is untrusted; reserve no more than the buffer
			// can still hold and let the reads surface truncation
			let remaining = self.cur.len().saturating_sub(index_start as usize);
			let capacity = ((index_buffer.index_count / 3) as usize).min(remaining / 6);
			let mut triangles = Vec::with_capacity(capacity);
			for _ in 0..index_buffer.index_count / 3 {
				let a = self.cur.read_u16()?;
				let b = self.cur.read_u16()?;
				let c = self.cur.read_u16()?;
				triangles.push([a, b, c]);
			}

			Ok(GeometryBlock {
				vtable: vtable,
				unknown_04: unknown_04,
				vertex_buffer_offset: vertex_buffer_offset,
				unknown_10: unknown_10,
				index_buffer_offset: index_buffer_offset,
				unknown_20: unknown_20,
				index_count: index_count,
				face_count: face_count,
				vertex_count: vertex_count,
				primitive_type: primitive_type,
				unknown_38: unknown_38,
				vertex_stride: vertex_stride,
				unknown_3e: unknown_3e,
				unknown_40: unknown_40,
				padding: padding,
				vertex_buffer: vertex_buffer,
				index_buffer: index_buffer,
				declaration: declaration,
				vertices: vertices,
				triangles: triangles,
			})
		}

		fn read_vertex_buffer(
			&mut self,
			offset: u32,
		) -> Result<VertexBufferInfo, RageImportError> {
			self.cur.seek(offset as usize);

			Ok(VertexBufferInfo {
				vtable: self.read_u32_tr("vb_vtable")?,
				vertex_count: self.read_u16_tr("vb_vertex_count")?,
				unknown_6: self.cur.read_u16()?,
				data_offset: self.read_offset("vb_data_offset")?,
				stride: self.read_u32_tr("vb_stride")?,
				declaration_offset: self.read_offset("vb_declaration_offset")?,
				unknown_14: self.cur.read_u32()?,
				data_offset2: self.cur.read_u32()?,
				unknown_1c: self.cur.read_u32()?,
			})
		}

		fn read_index_buffer(
			&mut self,
			offset: u32,
		) -> Result<IndexBufferInfo, RageImportError> {
			self.cur.seek(offset as usize);

			let vtable = self.read_u32_tr("ib_vtable")?;
			let index_count = self.read_u32_tr("ib_index_count")?;
			let data_offset = self.read_offset("ib_data_offset")?;
			let unknown_c = self.cur.read_u32()?;
			let mut reserved = [0; 0x30];
			reserved.copy_from_slice(self.cur.read_bytes(0x30)?);

			Ok(IndexBufferInfo {
				vtable: vtable,
				index_count: index_count,
				data_offset: data_offset,
				unknown_c: unknown_c,
				reserved: reserved,
			})
		}
	}
}
