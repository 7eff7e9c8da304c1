//! Fixture sets.
//!
//! A [`FixtureSet`] is the ordered list of [`FixtureFile`]s a loader works
//! through. Each file holds the complete contents of one table.
//!
//! ## Fixture format
//!
//! ```yaml
//! # posts.yml
//! - id: 1
//!   title: Post title
//!   created_at: 2016-01-01 12:30:12
//! - id: 2
//!   title: Another title
//!   created_at: 2016-01-01 12:30:12
//! ```
//!
//! The top level may also be a mapping of labels to records:
//!
//! ```yaml
//! first_tag:
//!   id: 1
//!   name: golang
//! ```

mod file;
mod format;
mod parser;
mod record;
pub mod value;

pub use file::FixtureFile;
pub use format::FixtureFormat;
pub use parser::FixtureParser;
pub use record::Record;

use std::collections::HashSet;
use std::path::Path;

use crate::error::{FixtureError, FixtureResult};

/// Ordered collection of fixtures, at most one per table.
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
	files: Vec<FixtureFile>,
}

impl FixtureSet {
	/// Builds a set from already constructed fixtures, keeping their order.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::DuplicateTable`] when two fixtures target the
	/// same table.
	pub fn new(files: Vec<FixtureFile>) -> FixtureResult<Self> {
		let mut seen = HashSet::new();
		for file in &files {
			if !seen.insert(file.table_name()) {
				return Err(FixtureError::DuplicateTable(file.table_name().to_string()));
			}
		}
		Ok(Self { files })
	}

	/// Collects every `.yml`, `.yaml` and `.json` file directly inside `dir`,
	/// ordered by file name. Subdirectories and other files are ignored.
	pub fn from_directory(dir: impl AsRef<Path>) -> FixtureResult<Self> {
		let dir = dir.as_ref();
		if !dir.is_dir() {
			return Err(FixtureError::DirectoryNotFound(dir.to_path_buf()));
		}

		let io_error = |source| FixtureError::Io {
			path: dir.to_path_buf(),
			source,
		};

		let mut paths = Vec::new();
		for entry in std::fs::read_dir(dir).map_err(io_error)? {
			let entry = entry.map_err(io_error)?;
			let path = entry.path();
			if path.is_file() && FixtureFormat::from_path(&path).is_some() {
				paths.push(path);
			}
		}
		paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

		tracing::debug!(
			directory = %dir.display(),
			count = paths.len(),
			"Discovered fixture files"
		);

		Self::from_files(paths)
	}

	/// Reads the given fixture files in the given order.
	pub fn from_files<I, P>(paths: I) -> FixtureResult<Self>
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		let files = paths
			.into_iter()
			.map(FixtureFile::from_path)
			.collect::<FixtureResult<Vec<_>>>()?;
		Self::new(files)
	}

	/// Appends a fixture.
	pub fn push(&mut self, file: FixtureFile) -> FixtureResult<()> {
		if self.files.iter().any(|f| f.table_name() == file.table_name()) {
			return Err(FixtureError::DuplicateTable(file.table_name().to_string()));
		}
		self.files.push(file);
		Ok(())
	}

	/// Fixtures in load order.
	pub fn files(&self) -> &[FixtureFile] {
		&self.files
	}

	/// Target tables in load order.
	pub fn table_names(&self) -> Vec<String> {
		self.files.iter().map(|f| f.table_name().to_string()).collect()
	}

	pub fn len(&self) -> usize {
		self.files.len()
	}

	pub fn is_empty(&self) -> bool {
		self.files.is_empty()
	}
}

impl<'a> IntoIterator for &'a FixtureSet {
	type Item = &'a FixtureFile;
	type IntoIter = std::slice::Iter<'a, FixtureFile>;

	fn into_iter(self) -> Self::IntoIter {
		self.files.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::fs;

	#[rstest]
	fn test_from_directory_sorted_and_filtered() {
		// Arrange
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("users.yml"), "[]").unwrap();
		fs::write(dir.path().join("comments.yaml"), "[]").unwrap();
		fs::write(dir.path().join("tags.json"), "[]").unwrap();
		fs::write(dir.path().join("README.md"), "# fixtures").unwrap();
		fs::create_dir(dir.path().join("nested.yml")).unwrap();
		fs::create_dir(dir.path().join("extra")).unwrap();
		fs::write(dir.path().join("extra").join("posts.yml"), "[]").unwrap();

		// Act
		let set = FixtureSet::from_directory(dir.path()).unwrap();

		// Assert
		assert_eq!(set.table_names(), vec!["comments", "tags", "users"]);
	}

	#[rstest]
	fn test_from_directory_missing() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("fixtures");

		let result = FixtureSet::from_directory(&missing);

		assert!(matches!(result, Err(FixtureError::DirectoryNotFound(p)) if p == missing));
	}

	#[rstest]
	fn test_from_files_keeps_caller_order() {
		let dir = tempfile::tempdir().unwrap();
		let users = dir.path().join("users.yml");
		let posts = dir.path().join("posts.yml");
		fs::write(&users, "[]").unwrap();
		fs::write(&posts, "[]").unwrap();

		let set = FixtureSet::from_files([&users, &posts]).unwrap();

		assert_eq!(set.table_names(), vec!["users", "posts"]);
	}

	#[rstest]
	fn test_duplicate_table_rejected() {
		let yaml = FixtureFile::from_bytes("posts.yml", "[]").unwrap();
		let json = FixtureFile::from_bytes("posts.json", "[]").unwrap();

		let result = FixtureSet::new(vec![yaml, json]);

		assert!(matches!(result, Err(FixtureError::DuplicateTable(t)) if t == "posts"));
	}

	#[rstest]
	fn test_push_rejects_duplicate() {
		let mut set = FixtureSet::default();
		set.push(FixtureFile::from_bytes("tags.yml", "[]").unwrap())
			.unwrap();

		let result = set.push(FixtureFile::from_bytes("tags.json", "[]").unwrap());

		assert!(result.is_err());
		assert_eq!(set.len(), 1);
	}
}
