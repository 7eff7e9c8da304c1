//! Oracle dialect.

use async_trait::async_trait;
use dbfixtures_backends::{DatabaseType, QueryValue, TransactionExecutor};

use super::{Dialect, execute, fetch_all};
use crate::error::FixtureResult;

const FOREIGN_KEYS_SQL: &str = "SELECT table_name AS \"table_name\", \
	constraint_name AS \"constraint_name\" \
	FROM user_constraints WHERE constraint_type = 'R'";

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Oracle SQL policy.
///
/// Placeholders are numbered (`:1`), and temporal values are bound as text
/// and converted with `to_date` using a matching format mask. Foreign keys
/// are suspended by disabling every referential constraint owned by the
/// current user. Oracle commits implicitly around `ALTER TABLE`, so the
/// load is not atomic on this engine.
#[derive(Debug, Clone, Default)]
pub struct OracleDialect;

impl OracleDialect {
	pub fn new() -> Self {
		Self
	}

	async fn alter_foreign_keys(
		&self,
		tx: &mut dyn TransactionExecutor,
		action: &str,
	) -> FixtureResult<()> {
		let constraints = fetch_all(tx, FOREIGN_KEYS_SQL, Vec::new()).await?;
		for row in constraints {
			let table: String = row.get("table_name")?;
			let constraint: String = row.get("constraint_name")?;
			let sql = format!(
				"ALTER TABLE {} {} CONSTRAINT {}",
				self.quote_identifier(&table),
				action,
				self.quote_identifier(&constraint)
			);
			execute(tx, &sql, Vec::new()).await?;
		}
		Ok(())
	}
}

#[async_trait]
impl Dialect for OracleDialect {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::Oracle
	}

	fn quote_chars(&self) -> (char, char) {
		('"', '"')
	}

	fn placeholder(&self, position: usize, value: &QueryValue) -> String {
		match value {
			QueryValue::DateTime(_) | QueryValue::Timestamp(_) => {
				format!("to_date(:{position}, 'YYYY-MM-DD HH24:MI:SS')")
			}
			QueryValue::Date(_) => format!("to_date(:{position}, 'YYYY-MM-DD')"),
			QueryValue::Time(_) => format!("to_date(:{position}, 'HH24:MI:SS')"),
			_ => format!(":{position}"),
		}
	}

	fn bind_value(&self, value: &QueryValue) -> QueryValue {
		match value {
			QueryValue::DateTime(dt) => QueryValue::String(dt.format(DATETIME_FORMAT).to_string()),
			QueryValue::Timestamp(ts) => QueryValue::String(ts.format(DATETIME_FORMAT).to_string()),
			QueryValue::Date(d) => QueryValue::String(d.format(DATE_FORMAT).to_string()),
			QueryValue::Time(t) => QueryValue::String(t.format(TIME_FORMAT).to_string()),
			other => other.clone(),
		}
	}

	fn current_database_sql(&self) -> &'static str {
		"SELECT user AS \"database_name\" FROM dual"
	}

	async fn disable_referential_integrity(
		&self,
		tx: &mut dyn TransactionExecutor,
		_tables: &[String],
	) -> FixtureResult<()> {
		self.alter_foreign_keys(tx, "DISABLE").await
	}

	async fn enable_referential_integrity(
		&self,
		tx: &mut dyn TransactionExecutor,
		_tables: &[String],
	) -> FixtureResult<()> {
		self.alter_foreign_keys(tx, "ENABLE").await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::RecordingBackend;
	use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
	use dbfixtures_backends::Row;
	use rstest::rstest;

	fn datetime() -> QueryValue {
		QueryValue::DateTime(
			NaiveDate::from_ymd_opt(2016, 1, 1)
				.unwrap()
				.and_hms_opt(12, 30, 12)
				.unwrap(),
		)
	}

	#[rstest]
	#[case(datetime(), "to_date(:1, 'YYYY-MM-DD HH24:MI:SS')")]
	#[case(
		QueryValue::Timestamp(Utc.with_ymd_and_hms(2016, 1, 1, 12, 30, 12).unwrap()),
		"to_date(:1, 'YYYY-MM-DD HH24:MI:SS')"
	)]
	#[case(QueryValue::Date(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap()), "to_date(:1, 'YYYY-MM-DD')")]
	#[case(QueryValue::Time(NaiveTime::from_hms_opt(12, 30, 12).unwrap()), "to_date(:1, 'HH24:MI:SS')")]
	#[case(QueryValue::Int(1), ":1")]
	#[case(QueryValue::String("2016-01-01".to_string()), ":1")]
	fn test_placeholder(#[case] value: QueryValue, #[case] expected: &str) {
		assert_eq!(OracleDialect::new().placeholder(1, &value), expected);
	}

	#[rstest]
	#[case(datetime(), "2016-01-01 12:30:12")]
	#[case(QueryValue::Date(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap()), "2016-01-01")]
	#[case(QueryValue::Time(NaiveTime::from_hms_milli_opt(12, 30, 12, 500).unwrap()), "12:30:12")]
	fn test_bind_value_matches_mask(#[case] value: QueryValue, #[case] expected: &str) {
		assert_eq!(
			OracleDialect::new().bind_value(&value),
			QueryValue::String(expected.to_string())
		);
	}

	#[rstest]
	fn test_bind_value_passes_scalars() {
		assert_eq!(OracleDialect::new().bind_value(&QueryValue::Int(3)), QueryValue::Int(3));
	}

	#[tokio::test]
	async fn test_foreign_keys_toggled() {
		// Arrange
		let (connection, recorder) = RecordingBackend::connection(DatabaseType::Oracle);
		let mut constraint = Row::new();
		constraint.insert("table_name".to_string(), "COMMENTS".into());
		constraint.insert("constraint_name".to_string(), "FK_COMMENTS_POST".into());
		recorder.respond("user_constraints", vec![constraint]);
		let mut tx = connection.begin().await.unwrap();
		let dialect = OracleDialect::new();

		// Act
		dialect
			.disable_referential_integrity(tx.as_mut(), &[])
			.await
			.unwrap();
		dialect
			.enable_referential_integrity(tx.as_mut(), &[])
			.await
			.unwrap();

		// Assert
		assert_eq!(
			recorder.sql(),
			vec![
				"BEGIN",
				FOREIGN_KEYS_SQL,
				"ALTER TABLE \"COMMENTS\" DISABLE CONSTRAINT \"FK_COMMENTS_POST\"",
				FOREIGN_KEYS_SQL,
				"ALTER TABLE \"COMMENTS\" ENABLE CONSTRAINT \"FK_COMMENTS_POST\"",
			]
		);
	}
}
