//! Database connection management

use std::sync::Arc;

use crate::{
	backend::{DatabaseBackend, TransactionExecutor},
	error::{DatabaseError, Result},
	types::{DatabaseType, QueryResult, QueryValue, Row},
};

#[cfg(feature = "postgres")]
use crate::drivers::PostgresBackend;

#[cfg(feature = "sqlite")]
use crate::drivers::SqliteBackend;

#[cfg(feature = "mysql")]
use crate::drivers::MySqlBackend;

/// Database connection wrapper
///
/// Cheap to clone; every clone shares the same backend and pool.
#[derive(Clone)]
pub struct DatabaseConnection {
	backend: Arc<dyn DatabaseBackend>,
}

impl std::fmt::Debug for DatabaseConnection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DatabaseConnection")
			.field("database_type", &self.backend.database_type())
			.finish()
	}
}

impl DatabaseConnection {
	pub fn new(backend: Arc<dyn DatabaseBackend>) -> Self {
		Self { backend }
	}

	/// Connect using the driver selected by the URL scheme.
	///
	/// # Errors
	///
	/// Returns [`DatabaseError::UnsupportedScheme`] when the scheme is unknown
	/// or its driver feature is not compiled in.
	pub async fn connect(url: &str) -> Result<Self> {
		let database_type = DatabaseType::from_url(url);
		tracing::debug!(?database_type, "Connecting to database");
		match database_type {
			#[cfg(feature = "postgres")]
			Some(DatabaseType::Postgres) => Self::connect_postgres(url).await,
			#[cfg(feature = "mysql")]
			Some(DatabaseType::Mysql) => Self::connect_mysql(url).await,
			#[cfg(feature = "sqlite")]
			Some(DatabaseType::Sqlite) => Self::connect_sqlite(url).await,
			_ => Err(DatabaseError::UnsupportedScheme(
				url.split(':').next().unwrap_or_default().to_string(),
			)),
		}
	}

	#[cfg(feature = "postgres")]
	pub async fn connect_postgres(url: &str) -> Result<Self> {
		use sqlx::PgPool;
		let pool = PgPool::connect(url).await?;
		Ok(Self::from_postgres_pool(pool))
	}

	#[cfg(feature = "postgres")]
	pub fn from_postgres_pool(pool: sqlx::PgPool) -> Self {
		Self {
			backend: Arc::new(PostgresBackend::new(pool)),
		}
	}

	#[cfg(feature = "sqlite")]
	pub async fn connect_sqlite(url: &str) -> Result<Self> {
		use sqlx::SqlitePool;
		let pool = SqlitePool::connect(url).await?;
		Ok(Self::from_sqlite_pool(pool))
	}

	#[cfg(feature = "sqlite")]
	pub fn from_sqlite_pool(pool: sqlx::SqlitePool) -> Self {
		Self {
			backend: Arc::new(SqliteBackend::new(pool)),
		}
	}

	#[cfg(feature = "mysql")]
	pub async fn connect_mysql(url: &str) -> Result<Self> {
		use sqlx::MySqlPool;
		let pool = MySqlPool::connect(url).await?;
		Ok(Self::from_mysql_pool(pool))
	}

	#[cfg(feature = "mysql")]
	pub fn from_mysql_pool(pool: sqlx::MySqlPool) -> Self {
		Self {
			backend: Arc::new(MySqlBackend::new(pool)),
		}
	}

	pub fn backend(&self) -> Arc<dyn DatabaseBackend> {
		self.backend.clone()
	}

	/// Get the database type
	pub fn database_type(&self) -> DatabaseType {
		self.backend.database_type()
	}

	pub async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<QueryResult> {
		self.backend.execute(sql, params).await
	}

	pub async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>> {
		self.backend.fetch_all(sql, params).await
	}

	pub async fn fetch_optional(&self, sql: &str, params: Vec<QueryValue>) -> Result<Option<Row>> {
		self.backend.fetch_optional(sql, params).await
	}

	pub async fn execute_script(&self, sql: &str) -> Result<()> {
		self.backend.execute_script(sql).await
	}

	pub async fn begin(&self) -> Result<Box<dyn TransactionExecutor>> {
		self.backend.begin().await
	}
}
