//! PostgreSQL dialect.

use async_trait::async_trait;
use dbfixtures_backends::{DatabaseType, QueryValue, TransactionExecutor};

use super::{Dialect, execute, fetch_all};
use crate::error::FixtureResult;

const SERIAL_COLUMNS_SQL: &str = "SELECT a.attname::text AS column_name, \
	pg_get_serial_sequence($1, a.attname)::text AS sequence_name \
	FROM pg_attribute a \
	WHERE a.attrelid = $1::regclass AND a.attnum > 0 AND NOT a.attisdropped \
	AND pg_get_serial_sequence($1, a.attname) IS NOT NULL";

/// PostgreSQL SQL policy.
///
/// By default foreign keys are suspended by disabling all triggers of each
/// fixture table, which needs table ownership (or superuser) but works with
/// any constraint definition. [`PostgresDialect::with_deferred_constraints`]
/// switches to `SET CONSTRAINTS ALL DEFERRED`, which needs no extra
/// privileges but only affects constraints declared `DEFERRABLE`.
///
/// After the rows of a table are inserted, every serial or identity sequence
/// owned by that table is moved past the highest loaded value so ordinary
/// inserts keep working.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect {
	deferred_constraints: bool,
	reset_sequences_to: Option<i64>,
}

impl PostgresDialect {
	pub fn new() -> Self {
		Self::default()
	}

	/// Suspends foreign keys with `SET CONSTRAINTS ALL DEFERRED`.
	pub fn with_deferred_constraints(mut self) -> Self {
		self.deferred_constraints = true;
		self
	}

	/// Resets every sequence to `value` instead of `MAX(column) + 1`.
	pub fn with_reset_sequences_to(mut self, value: i64) -> Self {
		self.reset_sequences_to = Some(value);
		self
	}

	async fn alter_triggers(
		&self,
		tx: &mut dyn TransactionExecutor,
		tables: &[String],
		action: &str,
	) -> FixtureResult<()> {
		for table in tables {
			let sql = format!(
				"ALTER TABLE {} {} TRIGGER ALL",
				self.quote_identifier(table),
				action
			);
			execute(tx, &sql, Vec::new()).await?;
		}
		Ok(())
	}
}

#[async_trait]
impl Dialect for PostgresDialect {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::Postgres
	}

	fn quote_chars(&self) -> (char, char) {
		('"', '"')
	}

	fn placeholder(&self, position: usize, _value: &QueryValue) -> String {
		format!("${position}")
	}

	fn current_database_sql(&self) -> &'static str {
		"SELECT current_database()::text AS database_name"
	}

	async fn disable_referential_integrity(
		&self,
		tx: &mut dyn TransactionExecutor,
		tables: &[String],
	) -> FixtureResult<()> {
		if self.deferred_constraints {
			execute(tx, "SET CONSTRAINTS ALL DEFERRED", Vec::new()).await?;
			Ok(())
		} else {
			self.alter_triggers(tx, tables, "DISABLE").await
		}
	}

	async fn enable_referential_integrity(
		&self,
		tx: &mut dyn TransactionExecutor,
		tables: &[String],
	) -> FixtureResult<()> {
		if self.deferred_constraints {
			execute(tx, "SET CONSTRAINTS ALL IMMEDIATE", Vec::new()).await?;
			Ok(())
		} else {
			self.alter_triggers(tx, tables, "ENABLE").await
		}
	}

	async fn after_table_insert(
		&self,
		tx: &mut dyn TransactionExecutor,
		table: &str,
	) -> FixtureResult<()> {
		let quoted_table = self.quote_identifier(table);
		let rows = fetch_all(
			tx,
			SERIAL_COLUMNS_SQL,
			vec![QueryValue::String(quoted_table.clone())],
		)
		.await?;

		for row in rows {
			let column: String = row.get("column_name")?;
			let sequence: String = row.get("sequence_name")?;

			match self.reset_sequences_to {
				Some(value) => {
					execute(
						tx,
						"SELECT setval($1::regclass, $2, false)",
						vec![QueryValue::String(sequence), QueryValue::Int(value)],
					)
					.await?;
				}
				None => {
					let sql = format!(
						"SELECT setval($1::regclass, COALESCE((SELECT MAX({}) FROM {}), 0) + 1, false)",
						self.quote_identifier(&column),
						quoted_table
					);
					execute(tx, &sql, vec![QueryValue::String(sequence)]).await?;
				}
			}
		}
		Ok(())
	}
}
