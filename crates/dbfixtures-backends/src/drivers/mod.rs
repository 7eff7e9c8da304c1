//! sqlx-backed drivers, one per compiled-in engine.

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mysql")]
pub use mysql::{MySqlBackend, MySqlTransactionExecutor};
#[cfg(feature = "postgres")]
pub use postgres::{PgTransactionExecutor, PostgresBackend};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteBackend, SqliteTransactionExecutor};
