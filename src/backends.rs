//! Database backends module.
//!
//! Connection handling, transactions and the value types bound into
//! statements.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dbfixtures::backends::{DatabaseConnection, TransactionExecutor};
//! ```

pub use dbfixtures_backends::*;
