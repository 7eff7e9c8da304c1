//! Convenience re-exports for common usage.
//!
//! ```
//! use dbfixtures_loader::prelude::*;
//! ```

// Error types
pub use crate::error::{FixtureError, FixtureResult};

// Dialects
pub use crate::dialect::{
	Dialect, MySqlDialect, OracleDialect, PostgresDialect, SqlServerDialect, SqliteDialect,
	dialect_for, dialect_for_name,
};

// Fixture types
pub use crate::fixtures::{FixtureFile, FixtureFormat, FixtureSet, Record};

// Loading
pub use crate::guard::{skip_database_name_check, skip_database_name_check_scoped};
pub use crate::loader::{FixtureLoader, LoadOptions, LoadResult};

// Connection types
pub use dbfixtures_backends::{DatabaseConnection, DatabaseType, QueryValue};
