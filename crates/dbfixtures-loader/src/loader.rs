//! Load orchestration.
//!
//! [`FixtureLoader::load`] replaces the contents of every fixture table in
//! a single transaction:
//!
//! 1. Refuse to run unless the database looks like a test database.
//! 2. Begin a transaction.
//! 3. With foreign keys suspended by the dialect, for each fixture in order:
//!    `DELETE FROM` the table, then insert every record inside the
//!    dialect's per-table bracket.
//! 4. Commit, or roll back and return the first error.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dbfixtures_backends::{DatabaseConnection, TransactionExecutor};

use crate::compiler::compile_insert;
use crate::dialect::{Dialect, TransactionBody, execute};
use crate::error::FixtureResult;
use crate::fixtures::{FixtureFile, FixtureSet};
use crate::guard;

/// Options for loading fixtures.
#[derive(Debug, Clone)]
pub struct LoadOptions {
	/// Refuse to load unless the database name contains `test`.
	pub check_database_name: bool,
}

impl Default for LoadOptions {
	fn default() -> Self {
		Self {
			check_database_name: true,
		}
	}
}

impl LoadOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets whether the database name is checked before loading.
	pub fn with_database_name_check(mut self, check: bool) -> Self {
		self.check_database_name = check;
		self
	}
}

/// Result of a successful load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadResult {
	/// Tables replaced, in load order.
	pub tables: Vec<String>,

	/// Number of records inserted across all tables.
	pub records_loaded: usize,
}

/// Loads a fixture set into a database.
///
/// # Example
///
/// ```rust,no_run
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// use dbfixtures_backends::DatabaseConnection;
/// use dbfixtures_loader::dialect::dialect_for;
/// use dbfixtures_loader::loader::FixtureLoader;
///
/// let connection = DatabaseConnection::connect("postgres://localhost/blog_test").await?;
/// let dialect = dialect_for(connection.database_type());
/// let loader = FixtureLoader::from_directory(connection, dialect, "testdata/fixtures")?;
///
/// let result = loader.load().await?;
/// println!("Loaded {} records", result.records_loaded);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FixtureLoader {
	connection: DatabaseConnection,
	dialect: Arc<dyn Dialect>,
	fixtures: FixtureSet,
	options: LoadOptions,
}

impl FixtureLoader {
	/// Creates a loader for an already built fixture set.
	pub fn new(connection: DatabaseConnection, dialect: Arc<dyn Dialect>, fixtures: FixtureSet) -> Self {
		Self {
			connection,
			dialect,
			fixtures,
			options: LoadOptions::default(),
		}
	}

	/// Creates a loader for every fixture file directly inside `dir`.
	pub fn from_directory(
		connection: DatabaseConnection,
		dialect: Arc<dyn Dialect>,
		dir: impl AsRef<Path>,
	) -> FixtureResult<Self> {
		let fixtures = FixtureSet::from_directory(dir)?;
		Ok(Self::new(connection, dialect, fixtures))
	}

	/// Creates a loader for the given fixture files, loaded in that order.
	pub fn from_files<I, P>(
		connection: DatabaseConnection,
		dialect: Arc<dyn Dialect>,
		paths: I,
	) -> FixtureResult<Self>
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		let fixtures = FixtureSet::from_files(paths)?;
		Ok(Self::new(connection, dialect, fixtures))
	}

	/// Replaces the loader options.
	pub fn with_options(mut self, options: LoadOptions) -> Self {
		self.options = options;
		self
	}

	/// Fixtures this loader writes, in load order.
	pub fn fixtures(&self) -> &FixtureSet {
		&self.fixtures
	}

	/// SQL policy used for every statement.
	pub fn dialect(&self) -> &Arc<dyn Dialect> {
		&self.dialect
	}

	/// Current loader options.
	pub fn options(&self) -> &LoadOptions {
		&self.options
	}

	/// Runs only the test database check.
	///
	/// Returns the database name when it looks like a test database.
	pub async fn detect_test_database(&self) -> FixtureResult<String> {
		guard::assert_test_database(&self.connection, self.dialect.as_ref()).await
	}

	/// Loads every fixture, replacing the current table contents.
	///
	/// Either all tables end up holding exactly their fixture rows, or the
	/// transaction is rolled back and the first error is returned.
	pub async fn load(&self) -> FixtureResult<LoadResult> {
		if self.options.check_database_name && !guard::database_name_check_skipped() {
			self.detect_test_database().await?;
		}

		let tables = self.fixtures.table_names();
		let mut tx = self.connection.begin().await?;
		let mut body = LoadBody {
			dialect: self.dialect.as_ref(),
			fixtures: &self.fixtures,
			records_loaded: 0,
		};

		let outcome = self
			.dialect
			.run_exclusive_of_referential_integrity(tx.as_mut(), &tables, &mut body)
			.await;

		if let Err(error) = outcome {
			if let Err(rollback_error) = tx.rollback().await {
				tracing::warn!(
					error = %rollback_error,
					"Failed to roll back fixture load"
				);
			}
			return Err(error);
		}

		tx.commit().await?;

		tracing::info!(
			database_type = %self.dialect.database_type(),
			tables = tables.len(),
			records = body.records_loaded,
			"Loaded fixtures"
		);

		Ok(LoadResult {
			tables,
			records_loaded: body.records_loaded,
		})
	}
}

/// Deletes and refills every fixture table.
struct LoadBody<'a> {
	dialect: &'a dyn Dialect,
	fixtures: &'a FixtureSet,
	records_loaded: usize,
}

#[async_trait]
impl TransactionBody for LoadBody<'_> {
	async fn run(&mut self, tx: &mut dyn TransactionExecutor) -> FixtureResult<()> {
		for file in self.fixtures {
			let table = file.table_name();
			let delete = format!("DELETE FROM {}", self.dialect.quote_identifier(table));
			execute(tx, &delete, Vec::new()).await?;

			let mut inserts = TableInserts {
				dialect: self.dialect,
				file,
				inserted: 0,
			};
			self.dialect
				.around_table_insert(tx, table, &mut inserts)
				.await?;

			tracing::debug!(table, records = inserts.inserted, "Loaded fixture");
			self.records_loaded += inserts.inserted;
		}
		Ok(())
	}
}

/// Inserts the records of one fixture file.
struct TableInserts<'a> {
	dialect: &'a dyn Dialect,
	file: &'a FixtureFile,
	inserted: usize,
}

#[async_trait]
impl TransactionBody for TableInserts<'_> {
	async fn run(&mut self, tx: &mut dyn TransactionExecutor) -> FixtureResult<()> {
		let table = self.file.table_name();
		for record in self.file.records()? {
			let insert = compile_insert(self.dialect, table, record);
			execute(tx, &insert.sql, insert.values).await?;
			self.inserted += 1;
		}
		Ok(())
	}
}
