//! Backend and transaction traits implemented by every database driver.

use async_trait::async_trait;

use crate::{
	error::Result,
	types::{DatabaseType, QueryResult, QueryValue, Row},
};

/// A pooled connection to one database.
///
/// Statements issued directly on the backend may run on any pooled
/// connection; anything that must share session state goes through
/// [`DatabaseBackend::begin`].
#[async_trait]
pub trait DatabaseBackend: Send + Sync {
	/// Engine family of this backend.
	fn database_type(&self) -> DatabaseType;

	/// Execute a statement outside of any explicit transaction.
	async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<QueryResult>;

	/// Fetch all matching rows.
	async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>>;

	/// Fetch an optional single row.
	async fn fetch_optional(&self, sql: &str, params: Vec<QueryValue>) -> Result<Option<Row>>;

	/// Execute a multi-statement script without parameters, e.g. a schema file.
	async fn execute_script(&self, sql: &str) -> Result<()>;

	/// Begin a transaction pinned to a single connection.
	async fn begin(&self) -> Result<Box<dyn TransactionExecutor>>;
}

/// Transaction executor trait for database-specific transaction handling
///
/// This trait represents a dedicated database connection that is used for
/// transaction operations. All queries executed through this executor
/// are guaranteed to run on the same physical connection, so session-level
/// settings made inside the transaction apply to every later statement.
///
/// # Implementation Notes
///
/// SQLx connection pools distribute queries across multiple connections.
/// To ensure transaction consistency, drivers acquire a dedicated
/// connection via `pool.begin()` which returns a `Transaction` that
/// maintains connection affinity.
#[async_trait]
pub trait TransactionExecutor: Send {
	/// Execute a query that modifies the database within the transaction
	async fn execute(&mut self, sql: &str, params: Vec<QueryValue>) -> Result<QueryResult>;

	/// Fetch all matching rows within the transaction
	async fn fetch_all(&mut self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>>;

	/// Fetch an optional single row within the transaction
	async fn fetch_optional(&mut self, sql: &str, params: Vec<QueryValue>) -> Result<Option<Row>>;

	/// Commit the transaction
	async fn commit(self: Box<Self>) -> Result<()>;

	/// Rollback the transaction
	async fn rollback(self: Box<Self>) -> Result<()>;
}
