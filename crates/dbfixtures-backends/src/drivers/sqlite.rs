//! SQLite driver

use async_trait::async_trait;
use sqlx::{
	Column, Decode, Row as SqlxRow, Sqlite, SqlitePool, Transaction, Type, TypeInfo, ValueRef,
	sqlite::{SqliteArguments, SqliteRow},
};
use std::sync::Arc;

use crate::{
	backend::{DatabaseBackend, TransactionExecutor},
	error::{DatabaseError, Result},
	types::{DatabaseType, QueryResult, QueryValue, Row},
};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

fn bind_value<'q>(query: SqliteQuery<'q>, value: &'q QueryValue) -> SqliteQuery<'q> {
	match value {
		QueryValue::Null => query.bind(None::<i32>),
		QueryValue::Bool(b) => query.bind(b),
		QueryValue::Int(i) => query.bind(i),
		QueryValue::Float(f) => query.bind(f),
		QueryValue::String(s) => query.bind(s),
		QueryValue::Bytes(b) => query.bind(b),
		QueryValue::Date(d) => query.bind(d),
		QueryValue::Time(t) => query.bind(t),
		QueryValue::DateTime(dt) => query.bind(dt),
		QueryValue::Timestamp(ts) => query.bind(ts),
	}
}

fn build_query<'q>(sql: &'q str, params: &'q [QueryValue]) -> SqliteQuery<'q> {
	params
		.iter()
		.fold(sqlx::query(sql), |query, param| bind_value(query, param))
}

fn try_decode<'r, T>(row: &'r SqliteRow, index: usize) -> Option<T>
where
	T: Decode<'r, Sqlite> + Type<Sqlite>,
{
	row.try_get::<T, _>(index).ok()
}

fn convert_row(sqlite_row: SqliteRow) -> Result<Row> {
	let mut row = Row::new();
	for (index, column) in sqlite_row.columns().iter().enumerate() {
		let name = column.name().to_string();
		if sqlite_row.try_get_raw(index)?.is_null() {
			row.insert(name, QueryValue::Null);
			continue;
		}

		// SQLite stores booleans as integers (0/1), so the declared column type
		// decides whether an integer is read back as a boolean.
		let declared = column.type_info().name().to_uppercase();
		let value = if declared.contains("BOOL") {
			match try_decode::<i64>(&sqlite_row, index) {
				Some(v) => QueryValue::Bool(v != 0),
				None => QueryValue::Null,
			}
		} else if let Some(v) = try_decode::<i64>(&sqlite_row, index) {
			QueryValue::Int(v)
		} else if let Some(v) = try_decode::<f64>(&sqlite_row, index) {
			QueryValue::Float(v)
		} else if let Some(v) = try_decode::<String>(&sqlite_row, index) {
			QueryValue::String(v)
		} else if let Some(v) = try_decode::<Vec<u8>>(&sqlite_row, index) {
			QueryValue::Bytes(v)
		} else {
			return Err(DatabaseError::TypeError(format!(
				"Unsupported SQLite column type for '{}'",
				name
			)));
		};
		row.insert(name, value);
	}
	Ok(row)
}

/// SQLite database backend
pub struct SqliteBackend {
	pool: Arc<SqlitePool>,
}

impl SqliteBackend {
	pub fn new(pool: SqlitePool) -> Self {
		Self {
			pool: Arc::new(pool),
		}
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}
}

#[async_trait]
impl DatabaseBackend for SqliteBackend {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::Sqlite
	}

	async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<QueryResult> {
		let result = build_query(sql, &params).execute(self.pool.as_ref()).await?;
		Ok(QueryResult {
			rows_affected: result.rows_affected(),
		})
	}

	async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>> {
		let rows = build_query(sql, &params).fetch_all(self.pool.as_ref()).await?;
		rows.into_iter().map(convert_row).collect()
	}

	async fn fetch_optional(&self, sql: &str, params: Vec<QueryValue>) -> Result<Option<Row>> {
		let row = build_query(sql, &params)
			.fetch_optional(self.pool.as_ref())
			.await?;
		row.map(convert_row).transpose()
	}

	async fn execute_script(&self, sql: &str) -> Result<()> {
		sqlx::raw_sql(sql).execute(self.pool.as_ref()).await?;
		Ok(())
	}

	async fn begin(&self) -> Result<Box<dyn TransactionExecutor>> {
		let tx = self.pool.begin().await?;
		Ok(Box::new(SqliteTransactionExecutor::new(tx)))
	}
}

/// SQLite transaction executor
pub struct SqliteTransactionExecutor {
	tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteTransactionExecutor {
	pub fn new(tx: Transaction<'static, Sqlite>) -> Self {
		Self { tx: Some(tx) }
	}

	fn tx(&mut self) -> Result<&mut Transaction<'static, Sqlite>> {
		self.tx.as_mut().ok_or_else(|| {
			DatabaseError::TransactionError("Transaction already consumed".to_string())
		})
	}
}

#[async_trait]
impl TransactionExecutor for SqliteTransactionExecutor {
	async fn execute(&mut self, sql: &str, params: Vec<QueryValue>) -> Result<QueryResult> {
		let tx = self.tx()?;
		let result = build_query(sql, &params).execute(&mut **tx).await?;
		Ok(QueryResult {
			rows_affected: result.rows_affected(),
		})
	}

	async fn fetch_all(&mut self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>> {
		let tx = self.tx()?;
		let rows = build_query(sql, &params).fetch_all(&mut **tx).await?;
		rows.into_iter().map(convert_row).collect()
	}

	async fn fetch_optional(&mut self, sql: &str, params: Vec<QueryValue>) -> Result<Option<Row>> {
		let tx = self.tx()?;
		let row = build_query(sql, &params).fetch_optional(&mut **tx).await?;
		row.map(convert_row).transpose()
	}

	async fn commit(mut self: Box<Self>) -> Result<()> {
		let tx = self.tx.take().ok_or_else(|| {
			DatabaseError::TransactionError("Transaction already consumed".to_string())
		})?;
		tx.commit().await?;
		Ok(())
	}

	async fn rollback(mut self: Box<Self>) -> Result<()> {
		let tx = self.tx.take().ok_or_else(|| {
			DatabaseError::TransactionError("Transaction already consumed".to_string())
		})?;
		tx.rollback().await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use sqlx::sqlite::SqlitePoolOptions;

	async fn memory_backend() -> SqliteBackend {
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.connect("sqlite::memory:")
			.await
			.unwrap();
		let backend = SqliteBackend::new(pool);
		backend
			.execute_script(
				"CREATE TABLE tags (id INTEGER PRIMARY KEY, name TEXT NOT NULL, pinned BOOLEAN);
				 CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT);",
			)
			.await
			.unwrap();
		backend
	}

	#[rstest]
	#[tokio::test]
	async fn test_execute_and_fetch_roundtrip() {
		// Arrange
		let backend = memory_backend().await;

		// Act
		let result = backend
			.execute(
				"INSERT INTO tags (id, name, pinned) VALUES (?, ?, ?)",
				vec![QueryValue::Int(1), "rust".into(), QueryValue::Bool(true)],
			)
			.await
			.unwrap();
		let rows = backend
			.fetch_all("SELECT id, name, pinned FROM tags", vec![])
			.await
			.unwrap();

		// Assert
		assert_eq!(result.rows_affected, 1);
		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0].get::<i64>("id").unwrap(), 1);
		assert_eq!(rows[0].get::<String>("name").unwrap(), "rust");
		assert!(rows[0].get::<bool>("pinned").unwrap());
	}

	#[rstest]
	#[tokio::test]
	async fn test_null_column_is_read_as_null() {
		let backend = memory_backend().await;
		backend
			.execute(
				"INSERT INTO notes (id, body) VALUES (?, ?)",
				vec![QueryValue::Int(1), QueryValue::Null],
			)
			.await
			.unwrap();

		let row = backend
			.fetch_optional("SELECT body FROM notes WHERE id = 1", vec![])
			.await
			.unwrap()
			.unwrap();

		assert_eq!(row.data.get("body"), Some(&QueryValue::Null));
	}

	#[rstest]
	#[tokio::test]
	async fn test_transaction_rollback_discards_writes() {
		// Arrange
		let backend = memory_backend().await;

		// Act
		let mut tx = backend.begin().await.unwrap();
		tx.execute(
			"INSERT INTO tags (id, name) VALUES (?, ?)",
			vec![QueryValue::Int(7), "tmp".into()],
		)
		.await
		.unwrap();
		let inside = tx
			.fetch_all("SELECT COUNT(*) AS n FROM tags", vec![])
			.await
			.unwrap();
		tx.rollback().await.unwrap();
		let after = backend
			.fetch_all("SELECT COUNT(*) AS n FROM tags", vec![])
			.await
			.unwrap();

		// Assert
		assert_eq!(inside[0].get::<i64>("n").unwrap(), 1);
		assert_eq!(after[0].get::<i64>("n").unwrap(), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_transaction_commit_persists_writes() {
		let backend = memory_backend().await;

		let mut tx = backend.begin().await.unwrap();
		tx.execute(
			"INSERT INTO tags (id, name) VALUES (?, ?)",
			vec![QueryValue::Int(1), "kept".into()],
		)
		.await
		.unwrap();
		tx.commit().await.unwrap();

		let rows = backend
			.fetch_all("SELECT name FROM tags", vec![])
			.await
			.unwrap();
		assert_eq!(rows[0].get::<String>("name").unwrap(), "kept");
	}
}
