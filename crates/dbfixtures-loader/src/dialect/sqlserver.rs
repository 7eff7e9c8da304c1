//! SQL Server dialect.

use async_trait::async_trait;
use dbfixtures_backends::{DatabaseType, QueryValue, TransactionExecutor};

use super::{Dialect, execute};
use crate::error::{FixtureError, FixtureResult};

const HAS_IDENTITY_SQL: &str =
	"SELECT OBJECTPROPERTY(OBJECT_ID(?), 'TableHasIdentity') AS has_identity";

/// SQL Server SQL policy.
///
/// Constraints are switched off per table with `NOCHECK CONSTRAINT ALL` and
/// re-validated afterwards. Tables with an identity column get
/// `IDENTITY_INSERT` turned on around their inserts so fixture ids can be
/// written explicitly.
#[derive(Debug, Clone, Default)]
pub struct SqlServerDialect;

impl SqlServerDialect {
	pub fn new() -> Self {
		Self
	}

	async fn table_has_identity(
		&self,
		tx: &mut dyn TransactionExecutor,
		table: &str,
	) -> FixtureResult<bool> {
		let row = tx
			.fetch_optional(
				HAS_IDENTITY_SQL,
				vec![QueryValue::String(self.quote_identifier(table))],
			)
			.await
			.map_err(|e| FixtureError::statement(HAS_IDENTITY_SQL, e))?;
		Ok(matches!(
			row.map(|row| row.get::<i64>("has_identity")),
			Some(Ok(1))
		))
	}

	async fn set_identity_insert(
		&self,
		tx: &mut dyn TransactionExecutor,
		table: &str,
		state: &str,
	) -> FixtureResult<()> {
		if self.table_has_identity(tx, table).await? {
			let sql = format!(
				"SET IDENTITY_INSERT {} {}",
				self.quote_identifier(table),
				state
			);
			execute(tx, &sql, Vec::new()).await?;
		}
		Ok(())
	}
}

#[async_trait]
impl Dialect for SqlServerDialect {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::SqlServer
	}

	fn quote_chars(&self) -> (char, char) {
		('[', ']')
	}

	fn placeholder(&self, _position: usize, _value: &QueryValue) -> String {
		"?".to_string()
	}

	fn current_database_sql(&self) -> &'static str {
		"SELECT DB_NAME() AS database_name"
	}

	async fn disable_referential_integrity(
		&self,
		tx: &mut dyn TransactionExecutor,
		tables: &[String],
	) -> FixtureResult<()> {
		for table in tables {
			let sql = format!(
				"ALTER TABLE {} NOCHECK CONSTRAINT ALL",
				self.quote_identifier(table)
			);
			execute(tx, &sql, Vec::new()).await?;
		}
		Ok(())
	}

	async fn enable_referential_integrity(
		&self,
		tx: &mut dyn TransactionExecutor,
		tables: &[String],
	) -> FixtureResult<()> {
		for table in tables {
			let sql = format!(
				"ALTER TABLE {} WITH CHECK CHECK CONSTRAINT ALL",
				self.quote_identifier(table)
			);
			execute(tx, &sql, Vec::new()).await?;
		}
		Ok(())
	}

	async fn before_table_insert(
		&self,
		tx: &mut dyn TransactionExecutor,
		table: &str,
	) -> FixtureResult<()> {
		self.set_identity_insert(tx, table, "ON").await
	}

	async fn after_table_insert(
		&self,
		tx: &mut dyn TransactionExecutor,
		table: &str,
	) -> FixtureResult<()> {
		self.set_identity_insert(tx, table, "OFF").await
	}

	fn split_script(&self, script: &str) -> Vec<String> {
		let mut batches = Vec::new();
		let mut current = String::new();
		for line in script.lines() {
			if line.trim().eq_ignore_ascii_case("GO") {
				if !current.trim().is_empty() {
					batches.push(std::mem::take(&mut current));
				}
				current.clear();
			} else {
				current.push_str(line);
				current.push('\n');
			}
		}
		if !current.trim().is_empty() {
			batches.push(current);
		}
		batches
	}
}
