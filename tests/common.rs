//! Shared helpers for fixture loading integration tests

// Each test binary compiles common.rs separately, causing unused code warnings.
#![allow(dead_code)]

use std::path::PathBuf;

use dbfixtures::backends::{DatabaseConnection, QueryValue};
use dbfixtures::fixtures::Dialect;
use dbfixtures::fixtures::fixtures::value::interpret_string;
use tempfile::TempDir;

/// Table names and row counts of the bundled fixtures.
pub const EXPECTED_COUNTS: [(&str, i64); 5] = [
	("posts", 2),
	("comments", 4),
	("tags", 3),
	("posts_tags", 2),
	("users", 2),
];

pub fn testdata_dir() -> PathBuf {
	PathBuf::from(env!("CARGO_MANIFEST_DIR"))
		.join("tests")
		.join("testdata")
}

pub fn fixtures_dir() -> PathBuf {
	testdata_dir().join("fixtures")
}

/// Fixture files in the order the tables are listed in [`EXPECTED_COUNTS`].
pub fn fixture_files() -> Vec<PathBuf> {
	EXPECTED_COUNTS
		.iter()
		.map(|(table, _)| fixtures_dir().join(format!("{table}.yml")))
		.collect()
}

/// Copies the bundled fixtures into a fresh directory so a test can alter them.
pub fn copy_fixtures() -> TempDir {
	let dir = tempfile::tempdir().expect("Failed to create fixture directory");
	for file in fixture_files() {
		let name = file.file_name().expect("fixture file name");
		std::fs::copy(&file, dir.path().join(name)).expect("Failed to copy fixture");
	}
	dir
}

/// Creates the blog schema, batch by batch.
pub async fn apply_schema(connection: &DatabaseConnection, dialect: &dyn Dialect, file: &str) {
	let script = std::fs::read_to_string(testdata_dir().join("schema").join(file))
		.expect("Failed to read schema file");
	for batch in dialect.split_script(&script) {
		connection
			.execute_script(&batch)
			.await
			.expect("Failed to apply schema");
	}
}

pub async fn count(connection: &DatabaseConnection, dialect: &dyn Dialect, table: &str) -> i64 {
	let sql = format!(
		"SELECT COUNT(*) AS row_count FROM {}",
		dialect.quote_identifier(table)
	);
	let row = connection
		.fetch_optional(&sql, Vec::new())
		.await
		.expect("Failed to count rows")
		.expect("COUNT returned no row");
	row.get::<i64>("row_count").expect("row_count column")
}

pub async fn assert_fixtures_loaded(connection: &DatabaseConnection, dialect: &dyn Dialect) {
	for (table, expected) in EXPECTED_COUNTS {
		assert_eq!(
			count(connection, dialect, table).await,
			expected,
			"{table} should have {expected} rows"
		);
	}
}

/// Inserts a post the way application code would, without an explicit id.
pub async fn insert_post(connection: &DatabaseConnection, dialect: &dyn Dialect) {
	let placeholders: Vec<String> = (1..=4)
		.map(|position| dialect.placeholder(position, &QueryValue::Null))
		.collect();
	let sql = format!(
		"INSERT INTO posts (title, content, created_at, updated_at) VALUES ({})",
		placeholders.join(", ")
	);
	let now = interpret_string("2024-01-01 00:00:00");
	connection
		.execute(
			&sql,
			vec![
				"Post title".into(),
				"Post content".into(),
				now.clone(),
				now,
			],
		)
		.await
		.expect("Failed to insert post after loading fixtures");
}
