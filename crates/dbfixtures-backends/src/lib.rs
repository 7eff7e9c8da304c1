//! # dbfixtures backends
//!
//! Connection and transaction plumbing used by the fixture loader.
//!
//! ## Supported Databases
//!
//! | Database | Feature Flag | Backend Type |
//! |----------|--------------|--------------|
//! | PostgreSQL | `postgres` | [`PostgresBackend`](drivers::PostgresBackend) |
//! | MySQL/MariaDB | `mysql` | [`MySqlBackend`](drivers::MySqlBackend) |
//! | SQLite | `sqlite` | [`SqliteBackend`](drivers::SqliteBackend) |
//!
//! Other engines plug in by implementing [`DatabaseBackend`] and
//! [`TransactionExecutor`] over their own driver.
//!
//! ## Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), dbfixtures_backends::DatabaseError> {
//! use dbfixtures_backends::DatabaseConnection;
//!
//! let connection = DatabaseConnection::connect("postgres://localhost/blog_test").await?;
//! let mut tx = connection.begin().await?;
//! tx.execute("DELETE FROM posts", vec![]).await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod connection;
pub mod drivers;
pub mod error;
pub mod types;

pub use backend::{DatabaseBackend, TransactionExecutor};
pub use connection::DatabaseConnection;
pub use error::{DatabaseError, Result};
pub use types::{DatabaseType, QueryResult, QueryValue, Row};
