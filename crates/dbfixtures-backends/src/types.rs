//! Common type definitions for database abstraction

use crate::error::DatabaseError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Database engine family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
	Postgres,
	Mysql,
	Sqlite,
	SqlServer,
	Oracle,
}

impl DatabaseType {
	/// Detects the engine family from a connection URL scheme.
	///
	/// # Examples
	///
	/// ```
	/// use dbfixtures_backends::types::DatabaseType;
	///
	/// assert_eq!(DatabaseType::from_url("postgres://localhost/app_test"), Some(DatabaseType::Postgres));
	/// assert_eq!(DatabaseType::from_url("sqlite::memory:"), Some(DatabaseType::Sqlite));
	/// assert_eq!(DatabaseType::from_url("redis://localhost"), None);
	/// ```
	pub fn from_url(url: &str) -> Option<Self> {
		let scheme = url.split(':').next()?;
		match scheme.to_ascii_lowercase().as_str() {
			"postgres" | "postgresql" => Some(Self::Postgres),
			"mysql" | "mariadb" => Some(Self::Mysql),
			"sqlite" => Some(Self::Sqlite),
			"sqlserver" | "mssql" => Some(Self::SqlServer),
			"oracle" => Some(Self::Oracle),
			_ => None,
		}
	}

	/// Canonical lowercase name of the engine family.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Postgres => "postgres",
			Self::Mysql => "mysql",
			Self::Sqlite => "sqlite",
			Self::SqlServer => "sqlserver",
			Self::Oracle => "oracle",
		}
	}
}

impl FromStr for DatabaseType {
	type Err = DatabaseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
			"mysql" | "mariadb" => Ok(Self::Mysql),
			"sqlite" | "sqlite3" => Ok(Self::Sqlite),
			"sqlserver" | "mssql" => Ok(Self::SqlServer),
			"oracle" => Ok(Self::Oracle),
			other => Err(DatabaseError::UnsupportedScheme(other.to_string())),
		}
	}
}

impl fmt::Display for DatabaseType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Query value types
///
/// Temporal values keep the shape they were written in: a calendar date,
/// a time of day, a datetime without offset, or an instant in UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryValue {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	Bytes(Vec<u8>),
	Date(NaiveDate),
	Time(NaiveTime),
	DateTime(NaiveDateTime),
	Timestamp(DateTime<Utc>),
}

impl QueryValue {
	/// Short name of the variant, used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			QueryValue::Null => "null",
			QueryValue::Bool(_) => "bool",
			QueryValue::Int(_) => "int",
			QueryValue::Float(_) => "float",
			QueryValue::String(_) => "string",
			QueryValue::Bytes(_) => "bytes",
			QueryValue::Date(_) => "date",
			QueryValue::Time(_) => "time",
			QueryValue::DateTime(_) => "datetime",
			QueryValue::Timestamp(_) => "timestamp",
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, QueryValue::Null)
	}
}

impl From<&str> for QueryValue {
	fn from(s: &str) -> Self {
		QueryValue::String(s.to_string())
	}
}

impl From<String> for QueryValue {
	fn from(s: String) -> Self {
		QueryValue::String(s)
	}
}

impl From<i64> for QueryValue {
	fn from(i: i64) -> Self {
		QueryValue::Int(i)
	}
}

impl From<i32> for QueryValue {
	fn from(i: i32) -> Self {
		QueryValue::Int(i as i64)
	}
}

impl From<f64> for QueryValue {
	fn from(f: f64) -> Self {
		QueryValue::Float(f)
	}
}

impl From<bool> for QueryValue {
	fn from(b: bool) -> Self {
		QueryValue::Bool(b)
	}
}

impl From<NaiveDate> for QueryValue {
	fn from(d: NaiveDate) -> Self {
		QueryValue::Date(d)
	}
}

impl From<NaiveTime> for QueryValue {
	fn from(t: NaiveTime) -> Self {
		QueryValue::Time(t)
	}
}

impl From<NaiveDateTime> for QueryValue {
	fn from(dt: NaiveDateTime) -> Self {
		QueryValue::DateTime(dt)
	}
}

impl From<DateTime<Utc>> for QueryValue {
	fn from(dt: DateTime<Utc>) -> Self {
		QueryValue::Timestamp(dt)
	}
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(QueryValue::Null, Into::into)
	}
}

/// Query result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
	pub rows_affected: u64,
}

/// Row from query result
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
	pub data: HashMap<String, QueryValue>,
}

impl Row {
	pub fn new() -> Self {
		Self {
			data: HashMap::new(),
		}
	}

	pub fn insert(&mut self, key: String, value: QueryValue) {
		self.data.insert(key, value);
	}

	pub fn get<T: TryFrom<QueryValue>>(&self, key: &str) -> std::result::Result<T, DatabaseError>
	where
		DatabaseError: From<<T as TryFrom<QueryValue>>::Error>,
	{
		self.data
			.get(key)
			.cloned()
			.ok_or_else(|| DatabaseError::ColumnNotFound(key.to_string()))
			.and_then(|v| v.try_into().map_err(Into::into))
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}
}

impl Default for Row {
	fn default() -> Self {
		Self::new()
	}
}

// Type conversions for QueryValue
impl TryFrom<QueryValue> for i64 {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Int(i) => Ok(i),
			// SQLite and MySQL report some integer expressions as text or float
			QueryValue::Float(f) if f.fract() == 0.0 => Ok(f as i64),
			QueryValue::String(ref s) => s.parse().map_err(|_| {
				DatabaseError::TypeError(format!("Cannot convert {:?} to i64", value))
			}),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to i64",
				value
			))),
		}
	}
}

impl TryFrom<QueryValue> for String {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::String(s) => Ok(s),
			QueryValue::Bytes(b) => String::from_utf8(b)
				.map_err(|e| DatabaseError::TypeError(format!("Invalid UTF-8 in column: {}", e))),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to String",
				value
			))),
		}
	}
}

impl TryFrom<QueryValue> for Option<String> {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Null => Ok(None),
			other => String::try_from(other).map(Some),
		}
	}
}

impl TryFrom<QueryValue> for bool {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Bool(b) => Ok(b),
			QueryValue::Int(i) => Ok(i != 0),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to bool",
				value
			))),
		}
	}
}

impl TryFrom<QueryValue> for f64 {
	type Error = DatabaseError;

	fn try_from(value: QueryValue) -> std::result::Result<Self, Self::Error> {
		match value {
			QueryValue::Float(f) => Ok(f),
			QueryValue::Int(i) => Ok(i as f64),
			_ => Err(DatabaseError::TypeError(format!(
				"Cannot convert {:?} to f64",
				value
			))),
		}
	}
}
