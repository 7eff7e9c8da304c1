//! Conversion of parsed YAML/JSON scalars into bindable values.
//!
//! Strings shaped like dates, times or timestamps become temporal values so
//! that every dialect can bind them with the right type.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use dbfixtures_backends::QueryValue;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{FixtureError, FixtureResult};

static DATE_SHAPE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"));

static TIME_SHAPE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"^[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?$").expect("valid time regex")
});

static DATETIME_SHAPE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}[ T][0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?$")
		.expect("valid datetime regex")
});

/// Interprets a string scalar, recognizing temporal shapes.
///
/// | shape | result |
/// |---|---|
/// | `2016-01-01` | [`QueryValue::Date`] |
/// | `12:30:00`, `12:30:00.5` | [`QueryValue::Time`] |
/// | `2016-01-01 12:30:00`, `2016-01-01T12:30:00` | [`QueryValue::DateTime`] |
/// | `2016-01-01T12:30:00+02:00` | [`QueryValue::Timestamp`] (UTC) |
///
/// Anything else, including shaped strings that are not valid calendar
/// values such as `2016-13-45`, stays a string.
pub fn interpret_string(text: &str) -> QueryValue {
	if DATE_SHAPE.is_match(text) {
		if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
			return QueryValue::Date(date);
		}
	} else if TIME_SHAPE.is_match(text) {
		if let Ok(time) = NaiveTime::parse_from_str(text, "%H:%M:%S%.f") {
			return QueryValue::Time(time);
		}
	} else if DATETIME_SHAPE.is_match(text) {
		let normalized = text.replacen('T', " ", 1);
		if let Ok(datetime) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f") {
			return QueryValue::DateTime(datetime);
		}
	} else if let Some(timestamp) = parse_timestamp(text) {
		return QueryValue::Timestamp(timestamp);
	}
	QueryValue::String(text.to_string())
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
	if !text.as_bytes().first().is_some_and(u8::is_ascii_digit) {
		return None;
	}
	DateTime::parse_from_rfc3339(text)
		.or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f %z"))
		.ok()
		.map(|datetime| datetime.with_timezone(&Utc))
}

/// Converts one YAML column value.
///
/// Integers outside the `i64` range are rejected rather than bound inexactly.
pub(crate) fn from_yaml(
	table: &str,
	column: &str,
	value: serde_yaml::Value,
) -> FixtureResult<QueryValue> {
	use serde_yaml::Value;

	match value {
		Value::Null => Ok(QueryValue::Null),
		Value::Bool(b) => Ok(QueryValue::Bool(b)),
		Value::Number(n) => {
			if let Some(i) = n.as_i64() {
				Ok(QueryValue::Int(i))
			} else if let Some(f) = n.as_f64().filter(|_| n.is_f64()) {
				Ok(QueryValue::Float(f))
			} else {
				Err(unsupported(table, column, "number"))
			}
		}
		Value::String(s) => Ok(interpret_string(&s)),
		Value::Sequence(_) => Err(unsupported(table, column, "sequence")),
		Value::Mapping(_) => Err(unsupported(table, column, "mapping")),
		Value::Tagged(tagged) => from_yaml(table, column, tagged.value),
	}
}

/// Converts one JSON column value.
pub(crate) fn from_json(
	table: &str,
	column: &str,
	value: serde_json::Value,
) -> FixtureResult<QueryValue> {
	use serde_json::Value;

	match value {
		Value::Null => Ok(QueryValue::Null),
		Value::Bool(b) => Ok(QueryValue::Bool(b)),
		Value::Number(n) => {
			if let Some(i) = n.as_i64() {
				Ok(QueryValue::Int(i))
			} else if let Some(f) = n.as_f64().filter(|_| n.is_f64()) {
				Ok(QueryValue::Float(f))
			} else {
				Err(unsupported(table, column, "number"))
			}
		}
		Value::String(s) => Ok(interpret_string(&s)),
		Value::Array(_) => Err(unsupported(table, column, "array")),
		Value::Object(_) => Err(unsupported(table, column, "object")),
	}
}

fn unsupported(table: &str, column: &str, kind: &'static str) -> FixtureError {
	FixtureError::UnsupportedValue {
		table: table.to_string(),
		column: column.to_string(),
		kind,
	}
}
