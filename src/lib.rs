//! # dbfixtures
//!
//! Load declarative YAML or JSON fixtures into a SQL database before each
//! test, replacing the contents of every fixture table so tests start from a
//! known dataset.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL driver
//! - `mysql` (default) - MySQL/MariaDB driver
//! - `sqlite` (default) - SQLite driver
//! - `testcontainers` - Container-backed integration tests
//!
//! SQL Server and Oracle dialects are always available and run over any
//! [`DatabaseBackend`](backends::DatabaseBackend) implementation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dbfixtures::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connection = DatabaseConnection::connect("postgres://localhost/blog_test").await?;
//! let dialect = dialect_for(connection.database_type());
//! let loader = FixtureLoader::from_directory(connection, dialect, "testdata/fixtures")?;
//!
//! let result = loader.load().await?;
//! assert_eq!(result.tables.len(), 5);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`backends`] - Connections, transactions and bound values
//! - [`fixtures`] - Fixture loading, dialects and the test database guard

pub mod backends;
pub mod fixtures;

pub mod prelude {
	//! Convenience re-exports for common usage.
	pub use dbfixtures_loader::prelude::*;
}

pub use dbfixtures_backends::{DatabaseConnection, DatabaseError, DatabaseType, QueryValue};
pub use dbfixtures_loader::{
	Dialect, FixtureError, FixtureLoader, FixtureResult, FixtureSet, LoadOptions, LoadResult,
	dialect_for, dialect_for_name, skip_database_name_check,
};
