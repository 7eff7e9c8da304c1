//! Error types for database backends.

use thiserror::Error;

/// Errors raised by a database backend or one of its transactions.
#[derive(Debug, Error)]
pub enum DatabaseError {
	/// Error reported by the underlying sqlx driver.
	#[error("SQL error: {0}")]
	Sqlx(#[from] sqlx::Error),

	/// The transaction was already committed or rolled back.
	#[error("Transaction error: {0}")]
	TransactionError(String),

	/// A column requested from a row is not present.
	#[error("Column not found: {0}")]
	ColumnNotFound(String),

	/// A value could not be converted to the requested type.
	#[error("Type error: {0}")]
	TypeError(String),

	/// The connection URL names a scheme no compiled-in driver understands.
	#[error("Unsupported connection URL scheme: {0}")]
	UnsupportedScheme(String),

	/// The backend does not implement the requested operation.
	#[error("Unsupported operation: {0}")]
	UnsupportedOperation(String),
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
