//! SQLite dialect.

use std::path::Path;

use async_trait::async_trait;
use dbfixtures_backends::{DatabaseConnection, DatabaseType, QueryValue, TransactionExecutor};

use super::{Dialect, execute, fetch_all};
use crate::error::{FixtureError, FixtureResult};

/// SQLite SQL policy.
///
/// Foreign keys are deferred to commit time with `PRAGMA defer_foreign_keys`,
/// which SQLite clears when the transaction ends. Restoring checks runs
/// `pragma_foreign_key_check` over every fixture table, so a dangling
/// reference fails the load before commit. The database name is the file
/// name of the `main` database.
#[derive(Debug, Clone, Default)]
pub struct SqliteDialect;

const FOREIGN_KEY_CHECK_SQL: &str = "SELECT \"table\", parent FROM pragma_foreign_key_check(?)";

const SCHEMA_FOREIGN_KEY_CHECK_SQL: &str =
	"SELECT \"table\", parent FROM pragma_foreign_key_check(?, ?)";

impl SqliteDialect {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Dialect for SqliteDialect {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::Sqlite
	}

	fn quote_chars(&self) -> (char, char) {
		('"', '"')
	}

	fn placeholder(&self, _position: usize, _value: &QueryValue) -> String {
		"?".to_string()
	}

	fn current_database_sql(&self) -> &'static str {
		"SELECT file AS database_name FROM pragma_database_list WHERE name = 'main'"
	}

	async fn database_name(&self, connection: &DatabaseConnection) -> FixtureResult<String> {
		let sql = self.current_database_sql();
		let row = connection
			.fetch_optional(sql, Vec::new())
			.await
			.map_err(|e| FixtureError::statement(sql, e))?;
		let file = match row {
			Some(row) => row.get::<Option<String>>("database_name")?.unwrap_or_default(),
			None => String::new(),
		};
		Ok(Path::new(&file)
			.file_name()
			.and_then(|name| name.to_str())
			.unwrap_or_default()
			.to_string())
	}

	async fn disable_referential_integrity(
		&self,
		tx: &mut dyn TransactionExecutor,
		_tables: &[String],
	) -> FixtureResult<()> {
		execute(tx, "PRAGMA defer_foreign_keys = ON", Vec::new()).await?;
		Ok(())
	}

	async fn enable_referential_integrity(
		&self,
		tx: &mut dyn TransactionExecutor,
		tables: &[String],
	) -> FixtureResult<()> {
		for table in tables {
			let (sql, params) = match table.split_once('.') {
				Some((schema, name)) => (
					SCHEMA_FOREIGN_KEY_CHECK_SQL,
					vec![QueryValue::from(name), QueryValue::from(schema)],
				),
				None => (FOREIGN_KEY_CHECK_SQL, vec![QueryValue::from(table.as_str())]),
			};
			let violations = fetch_all(tx, sql, params).await?;
			if let Some(violation) = violations.first() {
				return Err(FixtureError::ForeignKeyViolation {
					table: table.clone(),
					parent: violation.get::<String>("parent")?,
				});
			}
		}
		Ok(())
	}
}
