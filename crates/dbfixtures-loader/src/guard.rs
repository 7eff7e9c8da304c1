//! Test database guard.
//!
//! Loading fixtures deletes every row of every fixture table, so loads are
//! refused unless the target database name contains `test` (ASCII, any
//! case).

use std::sync::atomic::{AtomicBool, Ordering};

use dbfixtures_backends::DatabaseConnection;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::dialect::Dialect;
use crate::error::{FixtureError, FixtureResult};

static TEST_DATABASE_NAME: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"(?i-u)test").expect("valid test database regex"));

static SKIP_DATABASE_NAME_CHECK: AtomicBool = AtomicBool::new(false);

/// Turns the database name check off (or back on) for every later load in
/// this process.
///
/// Meant to be called once while setting up a test suite whose database
/// name cannot contain `test`. Per-loader control is available through
/// [`LoadOptions::with_database_name_check`](crate::loader::LoadOptions::with_database_name_check).
pub fn skip_database_name_check(skip: bool) {
	SKIP_DATABASE_NAME_CHECK.store(skip, Ordering::SeqCst);
}

/// Turns the database name check off until the returned guard is dropped.
///
/// The previous setting is restored on drop, including when the scope
/// unwinds from a panic.
///
/// # Example
///
/// ```
/// # use dbfixtures_loader::guard::{database_name_check_skipped, skip_database_name_check_scoped};
/// {
/// 	let _skip = skip_database_name_check_scoped();
/// 	assert!(database_name_check_skipped());
/// }
/// assert!(!database_name_check_skipped());
/// ```
#[must_use = "the check is restored as soon as the guard is dropped"]
pub fn skip_database_name_check_scoped() -> DatabaseNameCheckSkip {
	let previous = SKIP_DATABASE_NAME_CHECK.swap(true, Ordering::SeqCst);
	DatabaseNameCheckSkip { previous }
}

/// Guard returned by [`skip_database_name_check_scoped`].
#[derive(Debug)]
pub struct DatabaseNameCheckSkip {
	previous: bool,
}

impl Drop for DatabaseNameCheckSkip {
	fn drop(&mut self) {
		SKIP_DATABASE_NAME_CHECK.store(self.previous, Ordering::SeqCst);
	}
}

/// Whether the process-wide skip is active.
pub fn database_name_check_skipped() -> bool {
	SKIP_DATABASE_NAME_CHECK.load(Ordering::SeqCst)
}

/// Whether `name` looks like a test database name.
///
/// # Example
///
/// ```
/// # use dbfixtures_loader::guard::is_test_database;
/// assert!(is_test_database("blog_test"));
/// assert!(is_test_database("productionTestCopy"));
/// assert!(!is_test_database("production"));
/// ```
pub fn is_test_database(name: &str) -> bool {
	TEST_DATABASE_NAME.is_match(name)
}

/// Resolves the connected database name and fails unless it looks like a
/// test database.
pub async fn assert_test_database(
	connection: &DatabaseConnection,
	dialect: &dyn Dialect,
) -> FixtureResult<String> {
	let name = dialect.database_name(connection).await?;
	if is_test_database(&name) {
		Ok(name)
	} else {
		tracing::warn!(database = %name, "Refusing to load fixtures into a non-test database");
		Err(FixtureError::NotTestDatabase(name))
	}
}
