//! End-to-end decodes over synthetic in-memory resources.

use ultraviolet::vec::Vec3;

use ragekit_core::cursor::CursorError;

use ragekit_models_rage::{
	DecodeNote,
	RageImportError,
	offset::RebaseContext,
	wdd::Dictionary,
	wdr::{
		DrawableModel,
		HEADER_SIZE,
		read_wdr
	}
};

fn w16(buf: &mut [u8], pos: usize, v: u16) {
	buf[pos..pos + 2].copy_from_slice(&v.to_le_bytes());
}

fn w32(buf: &mut [u8], pos: usize, v: u32) {
	buf[pos..pos + 4].copy_from_slice(&v.to_le_bytes());
}

fn wf32(buf: &mut [u8], pos: usize, v: f32) {
	buf[pos..pos + 4].copy_from_slice(&v.to_le_bytes());
}

/// Tags a payload-local position the way the serializer would have,
/// relative to the payload's placement at `origin`
fn tag(origin: u32, local: u32) -> u32 {
	0x5000_0000 | (origin + local)
}

const VERTEX_COUNT: u16 = 3;

/// Builds a drawable payload with one model and one stride-36 geometry,
/// all internal pointers authored relative to `origin`.
///
/// Layout: header @0, model collection @0xA0, model pointer table
/// @0xB0, model @0xC0, geometry pointer array @0xE0, geometry record
/// @0x100, vertex buffer @0x160, index buffer @0x1A0, vertex
/// declaration @0x1E0, vertex data @0x200, index data @0x300.
fn build_drawable_payload(origin: u32, index_count: u32) -> Vec<u8> {
	let mut buf = vec![0u8; 0x300 + index_count as usize * 2];

	// drawable header
	w32(&mut buf, 0x00, 0x6972_0001);
	buf[0x04] = 0x94;
	wf32(&mut buf, 0x10, 0.5); // center.x
	wf32(&mut buf, 0x20, -8.0); // min.x
	wf32(&mut buf, 0x30, 8.0); // max.x
	w32(&mut buf, 0x40, tag(origin, 0xA0));
	w32(&mut buf, 0x60, 1); // object count

	// model collection
	w32(&mut buf, 0xA0, tag(origin, 0xB0));
	w16(&mut buf, 0xA4, 1);

	// model pointer table
	w32(&mut buf, 0xB0, tag(origin, 0xC0));

	// model
	w32(&mut buf, 0xC0, 0x6972_0002);
	w32(&mut buf, 0xC4, tag(origin, 0xE0));
	w16(&mut buf, 0xC8, 1);
	w16(&mut buf, 0xCA, 1);
	w16(&mut buf, 0xDA, 1);

	// geometry pointer array
	w32(&mut buf, 0xE0, tag(origin, 0x100));

	// geometry record
	w32(&mut buf, 0x100, 0x6972_0003);
	w32(&mut buf, 0x10C, tag(origin, 0x160));
	w32(&mut buf, 0x11C, tag(origin, 0x1A0));
	w32(&mut buf, 0x12C, index_count);
	w32(&mut buf, 0x130, index_count / 3);
	w16(&mut buf, 0x134, VERTEX_COUNT);
	w16(&mut buf, 0x136, 3);
	w16(&mut buf, 0x13C, 36);

	// vertex buffer record
	w32(&mut buf, 0x160, 0x6972_0004);
	w16(&mut buf, 0x164, VERTEX_COUNT);
	w32(&mut buf, 0x168, tag(origin, 0x200));
	w32(&mut buf, 0x16C, 36);
	w32(&mut buf, 0x170, tag(origin, 0x1E0));

	// index buffer record
	w32(&mut buf, 0x1A0, 0x6972_0005);
	w32(&mut buf, 0x1A4, index_count);
	w32(&mut buf, 0x1A8, tag(origin, 0x300));

	// vertex declaration
	w32(&mut buf, 0x1E0, 0x0000_00D9);
	w16(&mut buf, 0x1E4, 36);
	buf[0x1E6] = 1;

	// stride-36 vertex records: position, normal, color, uv
	for i in 0..VERTEX_COUNT as usize {
		let base = 0x200 + i * 36;
		wf32(&mut buf, base, i as f32);
		wf32(&mut buf, base + 4, i as f32 * 2.0);
		wf32(&mut buf, base + 8, -(i as f32));
		wf32(&mut buf, base + 20, 1.0); // normal.z
		buf[base + 24..base + 28].copy_from_slice(&[i as u8, 0x80, 0x40, 0xFF]);
		wf32(&mut buf, base + 28, 0.25);
		wf32(&mut buf, base + 32, 0.75);
	}

	// index words, one triangle fan over the three vertices
	for i in 0..index_count as usize {
		w16(&mut buf, 0x300 + i * 2, (i % VERTEX_COUNT as usize) as u16);
	}

	buf
}

/// Wraps a payload in an uncompressed RSC container
fn wrap_container(payload: &[u8]) -> Vec<u8> {
	let mut data = b"RSC".to_vec();
	data.push(0x05);
	data.extend_from_slice(&110u32.to_le_bytes());
	data.extend_from_slice(&0u32.to_le_bytes());
	data.extend_from_slice(payload);
	data
}

#[test]
fn test_wdr_file_decode() {
	let file = wrap_container(&build_drawable_payload(0, 9));
	let model = read_wdr(&file).unwrap();

	assert_eq!(model.header.object_count, 1);
	assert_eq!(model.model.geometry_count, 1);
	assert_eq!(model.geometries.len(), 1);
	assert!(model.skipped.is_empty());
	assert!(model.notes.is_empty());

	let geometry = &model.geometries[0];
	assert_eq!(geometry.declaration.stride, 36);
	assert_eq!(geometry.vertices.len(), 3);
	assert_eq!(geometry.vertices[1].position, Vec3::new(1.0, 2.0, -1.0));
	assert_eq!(geometry.vertices[2].color, [2, 0x80, 0x40, 0xFF]);
	assert_eq!(geometry.triangles, vec![[0, 1, 2]; 3]);

	let rec = model.trace.find("object_count").unwrap();
	assert_eq!(rec.offset, 0x60);
}

#[test]
fn test_trailing_index_remainder_dropped() {
	let file = wrap_container(&build_drawable_payload(0, 10));
	let model = read_wdr(&file).unwrap();

	// 10 indices hold 3 whole triangles; the leftover word is dropped
	assert_eq!(model.geometries[0].triangles.len(), 3);
	assert_eq!(model.geometries[0].index_count, 10);
}

#[test]
fn test_rebase_equivalence() {
	let flat = build_drawable_payload(0, 9);
	let moved = build_drawable_payload(0x2000, 9);

	let a = DrawableModel::read(&flat, &RebaseContext::TOP_LEVEL, 0).unwrap();
	let b = DrawableModel::read(&moved, &RebaseContext::new(0x2000), 0).unwrap();

	assert_eq!(a.geometries, b.geometries);
}

#[test]
fn test_unsupported_stride_skips_geometry() {
	let mut payload = build_drawable_payload(0, 9);
	w16(&mut payload, 0x1E4, 40); // declaration stride
	w16(&mut payload, 0x13C, 40); // geometry record stride

	let model = DrawableModel::read(&payload, &RebaseContext::TOP_LEVEL, 0).unwrap();
	assert!(model.geometries.is_empty());
	assert_eq!(model.skipped.len(), 1);
	assert_eq!(model.skipped[0].index, 0);
	assert!(matches!(
		model.skipped[0].error,
		RageImportError::UnsupportedStride(40)
	));
}

#[test]
fn test_bad_geometry_does_not_abort_siblings() {
	let mut payload = build_drawable_payload(0, 9);
	w16(&mut payload, 0xCA, 2); // two geometry pointers
	w32(&mut payload, 0xE4, tag(0, 0x00FF_0000)); // second points past the buffer

	let model = DrawableModel::read(&payload, &RebaseContext::TOP_LEVEL, 0).unwrap();
	assert_eq!(model.geometries.len(), 1);
	assert_eq!(model.skipped.len(), 1);
	assert_eq!(model.skipped[0].index, 1);
	assert!(matches!(
		model.skipped[0].error,
		RageImportError::Truncated { .. }
	));
}

#[test]
fn test_huge_index_count_fails_without_reserving() {
	let mut payload = build_drawable_payload(0, 9);
	// an index count far past what the buffer could ever hold must
	// not be trusted for the triangle allocation
	w32(&mut payload, 0x1A4, 0x7FFF_FFF4);

	let model = DrawableModel::read(&payload, &RebaseContext::TOP_LEVEL, 0).unwrap();
	assert!(model.geometries.is_empty());
	assert_eq!(model.skipped.len(), 1);
	assert!(matches!(
		model.skipped[0].error,
		RageImportError::Truncated { .. }
	));
}

#[test]
fn test_short_payload_rejected_up_front() {
	let payload = [0u8; 0x40];

	let err = DrawableModel::read(&payload, &RebaseContext::TOP_LEVEL, 0).unwrap_err();
	assert!(matches!(
		err,
		RageImportError::Truncated {
			source: CursorError::Truncated {
				wanted: HEADER_SIZE,
				..
			},
		}
	));
}

#[test]
fn test_stride_mismatch_prefers_declaration() {
	let mut payload = build_drawable_payload(0, 9);
	w16(&mut payload, 0x13C, 28); // stale geometry record stride

	let model = DrawableModel::read(&payload, &RebaseContext::TOP_LEVEL, 0).unwrap();
	assert_eq!(model.geometries.len(), 1);
	assert_eq!(model.geometries[0].vertices.len(), 3);
	assert!(model.geometries[0].vertices[0].normal.is_some());
	assert_eq!(model.notes, vec![DecodeNote::StrideMismatch {
		geometry: 0,
		declaration: 36,
		record: 28,
	}]);
}

/// Builds a dictionary payload embedding `entries` drawables at 0x1000
/// intervals, with `hashes` name hashes. The two counts are
/// deliberately independent.
fn build_dictionary_payload(vtable: u32, hashes: &[u32], entries: usize) -> Vec<u8> {
	let mut buf = vec![0u8; 0x1000 * (entries + 1)];

	w32(&mut buf, 0x00, vtable);
	w32(&mut buf, 0x10, 0x5000_0040); // hash table
	w16(&mut buf, 0x14, hashes.len() as u16);
	w16(&mut buf, 0x16, 8);
	w32(&mut buf, 0x18, 0x5000_0400); // pointer table
	w16(&mut buf, 0x1C, entries as u16);
	w32(&mut buf, 0x20, 0x0BAD_CAFE); // unknown trailing word
	buf[0x24..0x30].fill(0xCD);

	for (i, &hash) in hashes.iter().enumerate() {
		w32(&mut buf, 0x40 + i * 8, hash);
	}

	for i in 0..entries {
		let offset = 0x1000 * (i as u32 + 1);
		w32(&mut buf, 0x400 + i * 4, 0x6000_0000 | offset);

		let embedded = wrap_container(&build_drawable_payload(offset, 9));
		let start = offset as usize;
		buf[start..start + embedded.len()].copy_from_slice(&embedded);
	}

	buf
}

#[test]
fn test_dictionary_demux() {
	let payload = build_dictionary_payload(0xA453_6900, &[0x1111_1111, 0x2222_2222], 3);
	let file = wrap_container(&payload);
	let dict = Dictionary::read(&file).unwrap();

	// two hash records, three pointer records, never zipped
	assert_eq!(dict.hashes.len(), 2);
	assert_eq!(dict.entries.len(), 3);
	assert_eq!(dict.models.len(), 3);
	assert!(dict.notes.is_empty());

	// the header tail past the table records is preserved opaque
	assert_eq!(dict.header.unknown_20, 0x0BAD_CAFE);
	assert_eq!(dict.header.padding, [0xCD; 12]);
	assert!(dict.header.padding_valid());

	assert_eq!(dict.entries[0].name_hash, Some(0x1111_1111));
	assert_eq!(dict.entries[1].name_hash, Some(0x2222_2222));
	assert_eq!(dict.entries[2].name_hash, None);
	assert_eq!(dict.entries[1].offset, 0x2000);

	// every embedded drawable decodes to the flat-file result
	let standalone = DrawableModel::read(
		&build_drawable_payload(0, 9),
		&RebaseContext::TOP_LEVEL,
		0,
	)
	.unwrap();
	for model in &dict.models {
		let model = model.as_ref().unwrap();
		assert_eq!(model.geometries, standalone.geometries);
	}
}

#[test]
fn test_dictionary_vtable_note() {
	let payload = build_dictionary_payload(0xBAD0_BAD0, &[], 1);
	let dict = Dictionary::read_payload(&payload).unwrap();

	assert_eq!(dict.notes, vec![DecodeNote::DictionaryVTable {
		found: 0xBAD0_BAD0,
	}]);
	assert_eq!(dict.models.len(), 1);
	assert!(dict.models[0].is_ok());
}

#[test]
fn test_dictionary_bad_entry_recorded() {
	let mut payload = build_dictionary_payload(0xA453_6900, &[0x1111_1111], 2);
	// corrupt the second embedded container's magic
	payload[0x2000] = b'X';

	let dict = Dictionary::read_payload(&payload).unwrap();
	assert!(dict.models[0].is_ok());
	assert!(matches!(
		dict.models[1],
		Err(RageImportError::Container { .. })
	));
}
