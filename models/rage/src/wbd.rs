//! WBD bounds dictionaries: the same two-table header shape as WDD,
//! but each pointer resolves to one fixed-size bounds record. No
//! geometry, no recursion, no RSC wrapper.

use ultraviolet::vec::Vec3;

use ragekit_core::{
	cursor::ByteCursor,
	trace::TraceLog
};

use crate::{
	RageImportError,
	offset::resolve
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundsHeader {
	pub vtable: u32,
	pub block_map: u32,
	pub unknown_8: u32,
	pub unknown_c: u32,
	pub hash_table_offset: u32,
	pub hash_count: u16,
	pub hash_stride: u16,
	pub entry_table_offset: u32,
	pub entry_count: u16,
	pub entry_flags: u16,
}

/// One collision bounds record: bounding sphere, AABB and pivot
/// vectors. The five marker words after each vector are constant in
/// known files and kept for inspection only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundsEntry {
	pub vtable: u32,
	pub pivot_count: u16,
	pub unknown_6: u16,
	pub unknown_8: u16,
	pub unknown_a: u16,
	pub sphere_radius: f32,
	pub aabb_max: Vec3,
	pub aabb_min: Vec3,
	pub sphere_pos: Vec3,
	pub box_center: Vec3,
	pub geom_center: Vec3,
	pub markers: [u32; 5],
}

impl BoundsEntry {
	#[cfg(feature = "import")]
	fn read(cur: &mut ByteCursor<'_>) -> Result<BoundsEntry, RageImportError> {
		let vtable = cur.read_u32()?;
		let pivot_count = cur.read_u16()?;
		let unknown_6 = cur.read_u16()?;
		let unknown_8 = cur.read_u16()?;
		let unknown_a = cur.read_u16()?;
		let sphere_radius = cur.read_f32()?;

		let aabb_max = cur.read_vec3()?;
		let marker_0 = cur.read_u32()?;
		let aabb_min = cur.read_vec3()?;
		let marker_1 = cur.read_u32()?;
		let sphere_pos = cur.read_vec3()?;
		let marker_2 = cur.read_u32()?;
		let box_center = cur.read_vec3()?;
		let marker_3 = cur.read_u32()?;
		let geom_center = cur.read_vec3()?;
		let marker_4 = cur.read_u32()?;

		Ok(BoundsEntry {
			vtable: vtable,
			pivot_count: pivot_count,
			unknown_6: unknown_6,
			unknown_8: unknown_8,
			unknown_a: unknown_a,
			sphere_radius: sphere_radius,
			aabb_max: aabb_max,
			aabb_min: aabb_min,
			sphere_pos: sphere_pos,
			box_center: box_center,
			geom_center: geom_center,
			markers: [marker_0, marker_1, marker_2, marker_3, marker_4],
		})
	}
}

#[derive(Debug)]
pub struct BoundsDictionary {
	pub header: BoundsHeader,
	pub hashes: Vec<u32>,
	/// Index-aligned with the pointer table; per-entry failures are
	/// recorded without aborting siblings
	pub entries: Vec<Result<BoundsEntry, RageImportError>>,
	pub trace: TraceLog,
}

impl BoundsDictionary {
	/// Reads a `.wbd` file. This format is stored without an RSC
	/// wrapper.
	#[cfg(feature = "import")]
	pub fn read(data: &[u8]) -> Result<BoundsDictionary, RageImportError> {
		let mut cur = ByteCursor::new(data);
		let mut trace = TraceLog::new();

		let header = BoundsHeader {
			vtable: cur.read_u32()?,
			block_map: cur.read_u32()?,
			unknown_8: cur.read_u32()?,
			unknown_c: cur.read_u32()?,
			hash_table_offset: resolve(cur.read_u32()?),
			hash_count: cur.read_u16()?,
			hash_stride: cur.read_u16()?,
			entry_table_offset: resolve(cur.read_u32()?),
			entry_count: cur.read_u16()?,
			entry_flags: cur.read_u16()?,
		};
		trace.record(0x10, "hash_table_offset", header.hash_table_offset);
		trace.record(0x14, "hash_count", header.hash_count);
		trace.record(0x18, "entry_table_offset", header.entry_table_offset);
		trace.record(0x1C, "entry_count", header.entry_count);

		// Independent counts, as in WDD
		cur.seek(header.hash_table_offset as usize);
		let mut hashes = Vec::with_capacity(header.hash_count as usize);
		for _ in 0..header.hash_count {
			hashes.push(cur.read_u32()?);
		}

		cur.seek(header.entry_table_offset as usize);
		let mut offsets = Vec::with_capacity(header.entry_count as usize);
		for _ in 0..header.entry_count {
			offsets.push(resolve(cur.read_u32()?));
		}

		let entries = offsets
			.iter()
			.map(|&offset| {
				let mut entry_cur = ByteCursor::new(data);
				entry_cur.seek(offset as usize);
				BoundsEntry::read(&mut entry_cur)
			})
			.collect();

		Ok(BoundsDictionary {
			header: header,
			hashes: hashes,
			entries: entries,
			trace: trace,
		})
	}
}
