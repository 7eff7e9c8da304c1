//! Error types for fixture loading.
//!
//! Every failure of a load surfaces as a [`FixtureError`] returned from
//! [`FixtureLoader::load`](crate::loader::FixtureLoader::load).

use std::path::PathBuf;

use dbfixtures_backends::DatabaseError;
use thiserror::Error;

/// Errors that can occur while building or loading a fixture set.
#[derive(Debug, Error)]
pub enum FixtureError {
	/// Top level of a fixture file is neither a sequence nor a mapping.
	#[error("The fixture file for table '{table}' is not a sequence or mapping")]
	FileIsNotSliceOrMap {
		/// Table the fixture file targets.
		table: String,
	},

	/// A record inside a fixture file is not a key/value mapping.
	#[error("Could not cast record in fixture '{table}': not a mapping")]
	RecordIsNotMap {
		/// Table the fixture file targets.
		table: String,
	},

	/// A record mapping has a key that is not a string.
	#[error("Record map key is not string in fixture '{table}'")]
	KeyIsNotString {
		/// Table the fixture file targets.
		table: String,
	},

	/// A column value is not a scalar.
	#[error("Unsupported {kind} value for column '{column}' in fixture '{table}'")]
	UnsupportedValue {
		/// Table the fixture file targets.
		table: String,
		/// Column holding the value.
		column: String,
		/// Kind of value found.
		kind: &'static str,
	},

	/// YAML content could not be parsed.
	#[error("YAML error: {0}")]
	Yaml(#[from] serde_yaml::Error),

	/// JSON content could not be parsed.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// The connected database does not look like a test database.
	#[error(
		"Loading aborted because the database name '{0}' does not look like a test database"
	)]
	NotTestDatabase(String),

	/// A statement issued by the loader failed.
	#[error("Failed to execute `{sql}`: {source}")]
	Statement {
		/// SQL text of the failing statement.
		sql: String,
		/// Driver error.
		#[source]
		source: DatabaseError,
	},

	/// Loaded rows reference a missing parent row.
	#[error("Fixture table '{table}' references missing rows in '{parent}'")]
	ForeignKeyViolation {
		/// Table holding the dangling reference.
		table: String,
		/// Referenced table.
		parent: String,
	},

	/// Any other database failure (begin, commit, name resolution).
	#[error("Database error: {0}")]
	Database(#[from] DatabaseError),

	/// Fixture directory does not exist.
	#[error("Fixture directory not found: {0}")]
	DirectoryNotFound(PathBuf),

	/// Fixture file does not exist.
	#[error("Fixture file not found: {0}")]
	FileNotFound(PathBuf),

	/// Fixture file or directory could not be read.
	#[error("Could not read {path}: {source}")]
	Io {
		/// Path being read.
		path: PathBuf,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// File extension is not a recognized fixture format.
	#[error("Unsupported fixture extension: {0}")]
	UnsupportedExtension(String),

	/// No table name can be derived from the fixture source.
	#[error("Invalid fixture name: {0:?}")]
	InvalidTableName(String),

	/// Two fixture sources target the same table.
	#[error("Duplicate fixture for table '{0}'")]
	DuplicateTable(String),

	/// Dialect name not recognized.
	#[error("Unknown database dialect: {0}")]
	UnknownDialect(String),
}

impl FixtureError {
	/// Wraps a driver error with the statement that produced it.
	pub fn statement(sql: impl Into<String>, source: DatabaseError) -> Self {
		Self::Statement {
			sql: sql.into(),
			source,
		}
	}

	/// Returns true for errors detected in fixture content before any SQL ran.
	pub fn is_input_error(&self) -> bool {
		matches!(
			self,
			Self::FileIsNotSliceOrMap { .. }
				| Self::RecordIsNotMap { .. }
				| Self::KeyIsNotString { .. }
				| Self::UnsupportedValue { .. }
				| Self::Yaml(_)
				| Self::Json(_)
		)
	}
}

/// Result type alias for fixture operations.
pub type FixtureResult<T> = Result<T, FixtureError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_not_test_database_message() {
		let error = FixtureError::NotTestDatabase("production".to_string());
		assert_eq!(
			error.to_string(),
			"Loading aborted because the database name 'production' does not look like a test database"
		);
	}

	#[rstest]
	fn test_statement_error_keeps_sql() {
		let error = FixtureError::statement(
			"DELETE FROM \"posts\"",
			DatabaseError::TransactionError("Transaction already consumed".to_string()),
		);
		assert!(error.to_string().starts_with("Failed to execute `DELETE FROM \"posts\"`"));
		assert!(std::error::Error::source(&error).is_some());
	}

	#[rstest]
	fn test_input_error_classification() {
		assert!(
			FixtureError::KeyIsNotString {
				table: "posts".to_string()
			}
			.is_input_error()
		);
		assert!(!FixtureError::NotTestDatabase("prod".to_string()).is_input_error());
	}

	#[rstest]
	fn test_yaml_error_from() {
		let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("key: [unclosed").unwrap_err();
		let error: FixtureError = yaml_error.into();
		assert!(matches!(error, FixtureError::Yaml(_)));
	}
}
