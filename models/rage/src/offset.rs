//! Tagged offset resolution. Serialized pointers keep a 4-bit
//! allocator-region tag in their top nibble; once the resource is flat
//! in a file only the low 28 bits carry addressing information.

/// Low 28 bits of a tagged pointer hold the in-region offset
pub const OFFSET_MASK: u32 = 0x0FFF_FFFF;

/// Strips the region tag from a raw pointer value.
///
/// Zero passes through (a null pointer, meaningful as "absent"). The
/// serializer is only observed to emit tag nibbles 5 and 6, but any
/// other nibble is masked the same way rather than rejected; known-good
/// files give no evidence for stricter validation.
pub const fn resolve(raw: u32) -> u32 {
	if raw == 0 {
		0
	} else {
		raw & OFFSET_MASK
	}
}

/// Origin subtracted from every resolved offset of a payload that was
/// sliced out of a larger buffer, whose internal pointers are relative
/// to its own placement rather than to the slice start.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RebaseContext {
	pub origin: u32,
}

impl RebaseContext {
	/// For a standalone resource file the offsets are already flat
	pub const TOP_LEVEL: RebaseContext = RebaseContext { origin: 0 };

	pub fn new(origin: u32) -> RebaseContext {
		RebaseContext {
			origin: origin,
		}
	}

	/// Resolves a tagged pointer into a payload-local position
	pub fn rebase(&self, raw: u32) -> u32 {
		resolve(raw).wrapping_sub(self.origin)
	}
}
