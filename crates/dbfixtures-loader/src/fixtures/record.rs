//! A single fixture row.

use dbfixtures_backends::QueryValue;
use indexmap::IndexMap;

/// One row of a fixture: column name to value, in document order.
///
/// Records only come out of the fixture parser or are assembled by callers
/// through [`Record::insert`], so column names are always strings and
/// values are always scalars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
	columns: IndexMap<String, QueryValue>,
}

impl Record {
	/// Creates an empty record.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets a column value, keeping the position of an existing column.
	pub fn insert(&mut self, column: impl Into<String>, value: impl Into<QueryValue>) {
		self.columns.insert(column.into(), value.into());
	}

	/// Builder-style variant of [`Record::insert`].
	pub fn with(mut self, column: impl Into<String>, value: impl Into<QueryValue>) -> Self {
		self.insert(column, value);
		self
	}

	/// Looks up a column value.
	pub fn get(&self, column: &str) -> Option<&QueryValue> {
		self.columns.get(column)
	}

	/// Iterates columns in document order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
		self.columns.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Column names in document order.
	pub fn columns(&self) -> impl Iterator<Item = &str> {
		self.columns.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.columns.len()
	}

	pub fn is_empty(&self) -> bool {
		self.columns.is_empty()
	}
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for Record {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			columns: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}
