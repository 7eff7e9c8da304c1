//! Fixture parsing functionality.
//!
//! Turns the raw bytes of a fixture file into validated [`Record`]s.

use super::{FixtureFormat, Record, value};
use crate::error::{FixtureError, FixtureResult};

/// Parser for fixture content.
///
/// The top level of a fixture must be either a sequence of records or a
/// mapping whose values are records; mapping keys are labels and are not
/// inserted. Records come back in document order.
#[derive(Debug, Default)]
pub struct FixtureParser;

impl FixtureParser {
	/// Creates a new fixture parser.
	pub fn new() -> Self {
		Self
	}

	/// Parses fixture content destined for `table`.
	///
	/// Whitespace-only content yields no records.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - The content is not valid YAML or JSON
	/// - The top level is a scalar ([`FixtureError::FileIsNotSliceOrMap`])
	/// - A record is not a mapping ([`FixtureError::RecordIsNotMap`])
	/// - A column name is not a string ([`FixtureError::KeyIsNotString`])
	/// - A column value is nested ([`FixtureError::UnsupportedValue`])
	pub fn parse(
		&self,
		table: &str,
		content: &[u8],
		format: FixtureFormat,
	) -> FixtureResult<Vec<Record>> {
		if content.iter().all(u8::is_ascii_whitespace) {
			return Ok(Vec::new());
		}

		match format {
			FixtureFormat::Yaml => self.parse_yaml(table, content),
			FixtureFormat::Json => self.parse_json(table, content),
		}
	}

	fn parse_yaml(&self, table: &str, content: &[u8]) -> FixtureResult<Vec<Record>> {
		use serde_yaml::Value;

		let items: Vec<Value> = match serde_yaml::from_slice::<Value>(content)? {
			Value::Sequence(seq) => seq,
			Value::Mapping(map) => map.into_iter().map(|(_, record)| record).collect(),
			_ => return Err(not_slice_or_map(table)),
		};

		items
			.into_iter()
			.map(|item| yaml_record(table, item))
			.collect()
	}

	fn parse_json(&self, table: &str, content: &[u8]) -> FixtureResult<Vec<Record>> {
		use serde_json::Value;

		let items: Vec<Value> = match serde_json::from_slice::<Value>(content)? {
			Value::Array(arr) => arr,
			Value::Object(map) => map.into_iter().map(|(_, record)| record).collect(),
			_ => return Err(not_slice_or_map(table)),
		};

		items
			.into_iter()
			.map(|item| json_record(table, item))
			.collect()
	}
}

fn yaml_record(table: &str, item: serde_yaml::Value) -> FixtureResult<Record> {
	use serde_yaml::Value;

	let map = match item {
		Value::Mapping(map) => map,
		Value::Tagged(tagged) => return yaml_record(table, tagged.value),
		_ => {
			return Err(FixtureError::RecordIsNotMap {
				table: table.to_string(),
			});
		}
	};

	let mut record = Record::new();
	for (key, column_value) in map {
		let Value::String(column) = key else {
			return Err(FixtureError::KeyIsNotString {
				table: table.to_string(),
			});
		};
		let converted = value::from_yaml(table, &column, column_value)?;
		record.insert(column, converted);
	}
	Ok(record)
}

fn json_record(table: &str, item: serde_json::Value) -> FixtureResult<Record> {
	let serde_json::Value::Object(map) = item else {
		return Err(FixtureError::RecordIsNotMap {
			table: table.to_string(),
		});
	};

	let mut record = Record::new();
	for (column, column_value) in map {
		let converted = value::from_json(table, &column, column_value)?;
		record.insert(column, converted);
	}
	Ok(record)
}

fn not_slice_or_map(table: &str) -> FixtureError {
	FixtureError::FileIsNotSliceOrMap {
		table: table.to_string(),
	}
}
