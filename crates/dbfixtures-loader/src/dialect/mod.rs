//! Per-engine SQL policy.
//!
//! A [`Dialect`] captures everything that differs between database engines
//! while loading fixtures: identifier quoting, placeholder syntax, how
//! foreign key enforcement is suspended, and any per-table work around the
//! inserts. The loader itself never branches on the engine.
//!
//! | Engine | Dialect | Placeholder |
//! |--------|---------|-------------|
//! | PostgreSQL | [`PostgresDialect`] | `$1` |
//! | MySQL/MariaDB | [`MySqlDialect`] | `?` |
//! | SQLite | [`SqliteDialect`] | `?` |
//! | SQL Server | [`SqlServerDialect`] | `?` |
//! | Oracle | [`OracleDialect`] | `:1` |

mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod sqlserver;

pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dbfixtures_backends::{
	DatabaseConnection, DatabaseType, QueryResult, QueryValue, Row, TransactionExecutor,
};

use crate::error::{FixtureError, FixtureResult};

/// Work run inside a bracket opened by a [`Dialect`].
///
/// The loader hands its per-fixture work to the dialect through this trait,
/// and the dialect decides what happens before and after it on the same
/// transaction.
#[async_trait]
pub trait TransactionBody: Send {
	async fn run(&mut self, tx: &mut dyn TransactionExecutor) -> FixtureResult<()>;
}

/// SQL policy of one database engine family.
///
/// Implementations are stateless apart from construction-time options and
/// are shared read-only between loaders.
#[async_trait]
pub trait Dialect: Send + Sync + fmt::Debug {
	/// Engine family this dialect speaks.
	fn database_type(&self) -> DatabaseType;

	/// Opening and closing identifier quote characters.
	fn quote_chars(&self) -> (char, char);

	/// Quotes an identifier, segment by segment.
	///
	/// `test_schema.posts` becomes `"test_schema"."posts"` in PostgreSQL.
	/// Quote characters already around a segment are stripped first, so
	/// quoting an already quoted name returns it unchanged. Case is kept.
	fn quote_identifier(&self, name: &str) -> String {
		let (open, close) = self.quote_chars();
		name.split('.')
			.map(|segment| {
				let bare = segment.strip_prefix(open).unwrap_or(segment);
				let bare = bare.strip_suffix(close).unwrap_or(bare);
				format!("{open}{bare}{close}")
			})
			.collect::<Vec<_>>()
			.join(".")
	}

	/// Placeholder text for the value at 1-based `position`.
	fn placeholder(&self, position: usize, value: &QueryValue) -> String;

	/// Value bound for a record value.
	fn bind_value(&self, value: &QueryValue) -> QueryValue {
		value.clone()
	}

	/// Query returning the current database name in a `database_name` column.
	fn current_database_sql(&self) -> &'static str;

	/// Name of the database the connection points at.
	async fn database_name(&self, connection: &DatabaseConnection) -> FixtureResult<String> {
		let sql = self.current_database_sql();
		let row = connection
			.fetch_optional(sql, Vec::new())
			.await
			.map_err(|e| FixtureError::statement(sql, e))?;
		Ok(row
			.map(|row| row.get::<Option<String>>("database_name"))
			.transpose()?
			.flatten()
			.unwrap_or_default())
	}

	/// Suspends foreign key enforcement for the given tables.
	async fn disable_referential_integrity(
		&self,
		tx: &mut dyn TransactionExecutor,
		tables: &[String],
	) -> FixtureResult<()>;

	/// Restores foreign key enforcement for the given tables.
	async fn enable_referential_integrity(
		&self,
		tx: &mut dyn TransactionExecutor,
		tables: &[String],
	) -> FixtureResult<()>;

	/// Runs `body` with foreign key enforcement suspended.
	///
	/// Enforcement is restored whether or not the body succeeds. The body's
	/// error wins over a failure to restore.
	async fn run_exclusive_of_referential_integrity(
		&self,
		tx: &mut dyn TransactionExecutor,
		tables: &[String],
		body: &mut dyn TransactionBody,
	) -> FixtureResult<()> {
		self.disable_referential_integrity(tx, tables).await?;
		let outcome = body.run(tx).await;
		let restored = self.enable_referential_integrity(tx, tables).await;
		outcome.and(restored)
	}

	/// Runs before the rows of `table` are inserted.
	async fn before_table_insert(
		&self,
		_tx: &mut dyn TransactionExecutor,
		_table: &str,
	) -> FixtureResult<()> {
		Ok(())
	}

	/// Runs after the rows of `table` are inserted, even if inserting failed.
	async fn after_table_insert(
		&self,
		_tx: &mut dyn TransactionExecutor,
		_table: &str,
	) -> FixtureResult<()> {
		Ok(())
	}

	/// Brackets the inserts of one table with the before/after hooks.
	async fn around_table_insert(
		&self,
		tx: &mut dyn TransactionExecutor,
		table: &str,
		body: &mut dyn TransactionBody,
	) -> FixtureResult<()> {
		self.before_table_insert(tx, table).await?;
		let outcome = body.run(tx).await;
		let after = self.after_table_insert(tx, table).await;
		outcome.and(after)
	}

	/// Statement inserting a row made only of column defaults.
	fn empty_insert_sql(&self, quoted_table: &str) -> String {
		format!("INSERT INTO {quoted_table} DEFAULT VALUES")
	}

	/// Splits a schema script into separately executable batches.
	fn split_script(&self, script: &str) -> Vec<String> {
		if script.trim().is_empty() {
			Vec::new()
		} else {
			vec![script.to_string()]
		}
	}
}

/// Returns the dialect for an engine family with default options.
pub fn dialect_for(database_type: DatabaseType) -> Arc<dyn Dialect> {
	match database_type {
		DatabaseType::Postgres => Arc::new(PostgresDialect::new()),
		DatabaseType::Mysql => Arc::new(MySqlDialect::new()),
		DatabaseType::Sqlite => Arc::new(SqliteDialect::new()),
		DatabaseType::SqlServer => Arc::new(SqlServerDialect::new()),
		DatabaseType::Oracle => Arc::new(OracleDialect::new()),
	}
}

/// Looks up a dialect by name.
///
/// # Example
///
/// ```
/// # use dbfixtures_loader::dialect::dialect_for_name;
/// # use dbfixtures_backends::DatabaseType;
/// let dialect = dialect_for_name("postgresql").unwrap();
/// assert_eq!(dialect.database_type(), DatabaseType::Postgres);
/// assert!(dialect_for_name("db2").is_err());
/// ```
pub fn dialect_for_name(name: &str) -> FixtureResult<Arc<dyn Dialect>> {
	let database_type = match name.to_ascii_lowercase().as_str() {
		"postgres" | "postgresql" => DatabaseType::Postgres,
		"mysql" | "mariadb" => DatabaseType::Mysql,
		"sqlite" | "sqlite3" => DatabaseType::Sqlite,
		"sqlserver" | "mssql" => DatabaseType::SqlServer,
		"oracle" => DatabaseType::Oracle,
		_ => return Err(FixtureError::UnknownDialect(name.to_string())),
	};
	Ok(dialect_for(database_type))
}

/// Executes one statement, attaching its SQL to any failure.
pub(crate) async fn execute(
	tx: &mut dyn TransactionExecutor,
	sql: &str,
	params: Vec<QueryValue>,
) -> FixtureResult<QueryResult> {
	tx.execute(sql, params)
		.await
		.map_err(|e| FixtureError::statement(sql, e))
}

/// Runs one query, attaching its SQL to any failure.
pub(crate) async fn fetch_all(
	tx: &mut dyn TransactionExecutor,
	sql: &str,
	params: Vec<QueryValue>,
) -> FixtureResult<Vec<Row>> {
	tx.fetch_all(sql, params)
		.await
		.map_err(|e| FixtureError::statement(sql, e))
}
