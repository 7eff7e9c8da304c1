//! A fixture file: all rows for one table.

use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

use super::{FixtureFormat, FixtureParser, Record};
use crate::error::{FixtureError, FixtureResult};

/// The rows destined for a single table.
///
/// The table name is the file name with its final extension stripped, so
/// `posts.yml` targets `posts` and `test_schema.posts.yml` targets
/// `test_schema.posts`. Content is read eagerly and parsed on first use;
/// the parsed records are cached for later loads.
#[derive(Debug, Clone)]
pub struct FixtureFile {
	table_name: String,
	format: FixtureFormat,
	path: Option<PathBuf>,
	content: Vec<u8>,
	records: OnceCell<Vec<Record>>,
}

impl FixtureFile {
	/// Creates a fixture for `table_name` from in-memory content.
	pub fn new(
		table_name: impl Into<String>,
		format: FixtureFormat,
		content: impl Into<Vec<u8>>,
	) -> FixtureResult<Self> {
		let table_name = table_name.into();
		if table_name.trim().is_empty() {
			return Err(FixtureError::InvalidTableName(table_name));
		}
		Ok(Self {
			table_name,
			format,
			path: None,
			content: content.into(),
			records: OnceCell::new(),
		})
	}

	/// Creates a fixture from a file name such as `posts.yml` and its content.
	///
	/// # Example
	///
	/// ```
	/// # use dbfixtures_loader::fixtures::FixtureFile;
	/// let fixture = FixtureFile::from_bytes("posts.yml", "- id: 1\n").unwrap();
	/// assert_eq!(fixture.table_name(), "posts");
	/// assert_eq!(fixture.records().unwrap().len(), 1);
	/// ```
	pub fn from_bytes(file_name: &str, content: impl Into<Vec<u8>>) -> FixtureResult<Self> {
		let (table_name, format) = split_file_name(Path::new(file_name))?;
		Self::new(table_name, format, content)
	}

	/// Reads a fixture file from disk.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::FileNotFound`] when the file does not exist,
	/// [`FixtureError::UnsupportedExtension`] for extensions other than
	/// `yml`, `yaml` and `json`, and [`FixtureError::Io`] for read failures.
	pub fn from_path(path: impl AsRef<Path>) -> FixtureResult<Self> {
		let path = path.as_ref();
		let (table_name, format) = split_file_name(path)?;

		let content = std::fs::read(path).map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				FixtureError::FileNotFound(path.to_path_buf())
			} else {
				FixtureError::Io {
					path: path.to_path_buf(),
					source: e,
				}
			}
		})?;

		let mut fixture = Self::new(table_name, format, content)?;
		fixture.path = Some(path.to_path_buf());
		Ok(fixture)
	}

	/// Name of the target table, possibly schema-qualified.
	pub fn table_name(&self) -> &str {
		&self.table_name
	}

	pub fn format(&self) -> FixtureFormat {
		self.format
	}

	/// Path the fixture was read from, if any.
	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	/// Raw fixture content.
	pub fn content(&self) -> &[u8] {
		&self.content
	}

	/// Parsed records, in file order.
	///
	/// Parsing happens once; failures are not cached, so a broken fixture
	/// reports the same error on every call.
	pub fn records(&self) -> FixtureResult<&[Record]> {
		self.records
			.get_or_try_init(|| {
				FixtureParser::new().parse(&self.table_name, &self.content, self.format)
			})
			.map(Vec::as_slice)
	}
}

fn split_file_name(path: &Path) -> FixtureResult<(String, FixtureFormat)> {
	let format = FixtureFormat::from_path(path).ok_or_else(|| {
		FixtureError::UnsupportedExtension(
			path.extension()
				.and_then(|e| e.to_str())
				.unwrap_or("(none)")
				.to_string(),
		)
	})?;

	let table_name = path
		.file_stem()
		.and_then(|stem| stem.to_str())
		.map(str::to_string)
		.ok_or_else(|| FixtureError::InvalidTableName(path.display().to_string()))?;

	Ok((table_name, format))
}
