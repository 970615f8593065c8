/// Value captured for one decoded field
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TraceValue {
	U8(u8),
	U16(u16),
	U32(u32),
	F32(f32),
}

impl From<u8> for TraceValue {
	fn from(v: u8) -> TraceValue {
		TraceValue::U8(v)
	}
}

impl From<u16> for TraceValue {
	fn from(v: u16) -> TraceValue {
		TraceValue::U16(v)
	}
}

impl From<u32> for TraceValue {
	fn from(v: u32) -> TraceValue {
		TraceValue::U32(v)
	}
}

impl From<f32> for TraceValue {
	fn from(v: f32) -> TraceValue {
		TraceValue::F32(v)
	}
}

/// One field observation made while decoding a resource
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldTrace {
	pub offset: usize,
	pub field: &'static str,
	pub value: TraceValue,
}

/// Ordered record of every traced field of a decode pass.
///
/// Decoders append to this instead of printing; tests and diagnostics
/// query it afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceLog {
	records: Vec<FieldTrace>,
}

impl TraceLog {
	pub fn new() -> TraceLog {
		TraceLog {
			records: vec![],
		}
	}

	pub fn record<V>(&mut self, offset: usize, field: &'static str, value: V)
	where
		V: Into<TraceValue>,
	{
		self.records.push(FieldTrace {
			offset: offset,
			field: field,
			value: value.into(),
		});
	}

	/// Returns the first record for the named field, if any
	pub fn find(&self, field: &str) -> Option<&FieldTrace> {
		self.records.iter().find(|r| r.field == field)
	}

	pub fn iter(&self) -> impl Iterator<Item = &FieldTrace> {
		self.records.iter()
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}
