//! WDD drawable dictionaries: a name-hash table and a pointer table to
//! independently addressed, RSC-wrapped WDR payloads embedded in the
//! dictionary's own decompressed buffer.

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
	offset::{
		RebaseContext,
		resolve
	},
	wdr::DrawableModel
};

/// Dictionary vtable seen in known-good files. A mismatch is reported
/// as a note, not an error.
pub const DICTIONARY_VTABLE: u32 = 0xA453_6900;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DictionaryHeader {
	pub vtable: u32,
	pub block_map: u32,
	pub parent: u32,
	pub usage_count: u32,
	/// Payload-local position of the name-hash table
	pub hash_table_offset: u32,
	pub hash_count: u16,
	pub hash_stride: u16,
	/// Payload-local position of the embedded-resource pointer table
	pub entry_table_offset: u32,
	pub entry_count: u16,
	pub entry_flags: u16,
	pub unknown_20: u32,
	/// Trailing header bytes, 0xCD-filled in known-good files
	pub padding: [u8; 12],
}

impl DictionaryHeader {
	/// Whether the trailing padding carries the expected 0xCD fill
	pub fn padding_valid(&self) -> bool {
		self.padding.iter().all(|&b| b == 0xCD)
	}
}

/// One name-hash table record
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HashEntry {
	pub hash: u32,
	pub rel_ptr: u32,
}

/// One pointer-table record, joined to a name hash where the hash
/// table is long enough. The two tables carry independent counts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DictionaryEntry {
	pub name_hash: Option<u32>,
	/// Payload-local position of the embedded RSC container
	pub offset: u32,
}

#[derive(Debug)]
pub struct Dictionary {
	pub header: DictionaryHeader,
	pub hashes: Vec<HashEntry>,
	pub entries: Vec<DictionaryEntry>,
	/// Index-aligned with `entries`; a failed entry does not abort its
	/// siblings
	pub models: Vec<Result<DrawableModel, RageImportError>>,
	pub notes: Vec<DecodeNote>,
	pub trace: TraceLog,
}

impl Dictionary {
	/// Reads a standalone `.wdd` file: outer container first, then the
	/// dictionary walk over its decompressed payload
	#[cfg(feature = "import")]
	pub fn read(data: &[u8]) -> Result<Dictionary, RageImportError> {
		let container = Container::read(data)?;
		Dictionary::read_payload(&container.payload)
	}

	#[cfg(feature = "import")]
	pub fn read_payload(payload: &[u8]) -> Result<Dictionary, RageImportError> {
		let mut cur = ByteCursor::new(payload);
		let mut trace = TraceLog::new();
		let mut notes = vec![];

		let vtable = cur.read_u32()?;
		trace.record(0, "vtable", vtable);
		if vtable != DICTIONARY_VTABLE {
			notes.push(DecodeNote::DictionaryVTable {
				found: vtable,
			});
		}

		let header = DictionaryHeader {
			vtable: vtable,
			block_map: cur.read_u32()?,
			parent: cur.read_u32()?,
			usage_count: cur.read_u32()?,
			hash_table_offset: resolve(cur.read_u32()?),
			hash_count: cur.read_u16()?,
			hash_stride: cur.read_u16()?,
			entry_table_offset: resolve(cur.read_u32()?),
			entry_count: cur.read_u16()?,
			entry_flags: cur.read_u16()?,
			unknown_20: cur.read_u32()?,
			padding: read_padding(&mut cur)?,
		};
		trace.record(0x10, "hash_table_offset", header.hash_table_offset);
		trace.record(0x14, "hash_count", header.hash_count);
		trace.record(0x18, "entry_table_offset", header.entry_table_offset);
		trace.record(0x1C, "entry_count", header.entry_count);

		// The two tables are sized by their own counts; they are not
		// required to match and must never be zipped implicitly.
		cur.seek(header.hash_table_offset as usize);
		let mut hashes = Vec::with_capacity(header.hash_count as usize);
		for _ in 0..header.hash_count {
			hashes.push(HashEntry {
				hash: cur.read_u32()?,
				rel_ptr: cur.read_u32()?,
			});
		}

		cur.seek(header.entry_table_offset as usize);
		let mut entries = Vec::with_capacity(header.entry_count as usize);
		for i in 0..header.entry_count as usize {
			entries.push(DictionaryEntry {
				name_hash: hashes.get(i).map(|h| h.hash),
				offset: resolve(cur.read_u32()?),
			});
		}

		let models = entries
			.iter()
			.map(|entry| read_entry(payload, entry.offset))
			.collect();

		Ok(Dictionary {
			header: header,
			hashes: hashes,
			entries: entries,
			models: models,
			notes: notes,
			trace: trace,
		})
	}
}

#[cfg(feature = "import")]
fn read_padding(cur: &mut ByteCursor<'_>) -> Result<[u8; 12], CursorError> {
	let mut padding = [0; 12];
	padding.copy_from_slice(cur.read_bytes(12)?);
	Ok(padding)
}

/// Decodes one embedded WDR. The entry's own RSC header starts at
/// `offset` in the dictionary payload; its internal pointers are
/// relative to that placement, so the drawable walk is rebased by it.
#[cfg(feature = "import")]
fn read_entry(payload: &[u8], offset: u32) -> Result<DrawableModel, RageImportError> {
	let slice = payload.get(offset as usize..).ok_or(CursorError::Truncated {
		offset: offset as usize,
		wanted: 12,
		len: payload.len(),
	})?;

	let container = Container::read(slice)?;

	DrawableModel::read(
		&container.payload,
		&RebaseContext::new(offset),
		container.header.system_mem_size(),
	)
}
