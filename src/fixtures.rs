//! Fixture loading module.
//!
//! Dialects, fixture sets, the record compiler, the test database guard and
//! the load orchestrator.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dbfixtures::fixtures::{FixtureLoader, LoadOptions, dialect::PostgresDialect};
//! ```

pub use dbfixtures_loader::*;
