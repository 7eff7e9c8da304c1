//! Transactional fixture loading for SQL databases.
//!
//! Fixtures are YAML or JSON files, one per table, named after the table
//! they fill. Loading a fixture set replaces the full contents of each
//! fixture table inside one transaction, with foreign key enforcement
//! suspended so tables can be loaded in any order.
//!
//! # Quick Start
//!
//! Create a fixture file (`fixtures/posts.yml`):
//!
//! ```yaml
//! - id: 1
//!   title: Post title
//!   content: Post content
//!   created_at: 2016-01-01 12:30:12
//!   updated_at: 2016-01-01 12:30:12
//! ```
//!
//! Load it before running tests:
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use dbfixtures_loader::prelude::*;
//!
//! let connection = DatabaseConnection::connect("sqlite://blog_test.db").await?;
//! let loader = FixtureLoader::from_directory(
//! 	connection.clone(),
//! 	dialect_for(connection.database_type()),
//! 	"fixtures",
//! )?;
//! loader.load().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`Dialect`](dialect::Dialect) - Per-engine quoting, placeholders and
//!   foreign key handling
//! - [`compile_insert`](compiler::compile_insert) - Record to INSERT statement
//! - [`FixtureSet`](fixtures::FixtureSet) - Ordered fixture files with lazily
//!   parsed records
//! - [`FixtureLoader`](loader::FixtureLoader) - Transactional delete and insert
//! - [`guard`] - Refuses to touch databases not named like test databases
//!
//! # Safety check
//!
//! A load fails with [`FixtureError::NotTestDatabase`] unless the database
//! name contains `test`. Disable the check per loader with
//! [`LoadOptions::with_database_name_check`](loader::LoadOptions::with_database_name_check),
//! or for the whole process with [`guard::skip_database_name_check`].

pub mod compiler;
pub mod dialect;
pub mod error;
pub mod fixtures;
pub mod guard;
pub mod loader;
pub mod prelude;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types at crate root
pub use compiler::{CompiledInsert, compile_insert};
pub use dialect::{Dialect, TransactionBody, dialect_for, dialect_for_name};
pub use error::{FixtureError, FixtureResult};
pub use fixtures::{FixtureFile, FixtureFormat, FixtureSet, Record};
pub use guard::{skip_database_name_check, skip_database_name_check_scoped};
pub use loader::{FixtureLoader, LoadOptions, LoadResult};
