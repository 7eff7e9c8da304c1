//! Record compiler: one record into one parameterized INSERT.

use dbfixtures_backends::QueryValue;

use crate::dialect::Dialect;
use crate::fixtures::Record;

/// A ready-to-execute INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledInsert {
	/// Statement text with dialect placeholders.
	pub sql: String,
	/// Bound values, position for position with the placeholders.
	pub values: Vec<QueryValue>,
}

/// Compiles `record` into an INSERT into `table`.
///
/// Columns appear in record order; each value gets the dialect's
/// placeholder for its 1-based position and is bound through
/// [`Dialect::bind_value`]. A record without columns becomes the dialect's
/// all-defaults insert.
///
/// # Example
///
/// ```
/// # use dbfixtures_loader::compiler::compile_insert;
/// # use dbfixtures_loader::dialect::PostgresDialect;
/// # use dbfixtures_loader::fixtures::Record;
/// let record = Record::new().with("id", 1).with("name", "golang");
/// let insert = compile_insert(&PostgresDialect::new(), "tags", &record);
/// assert_eq!(insert.sql, r#"INSERT INTO "tags" ("id", "name") VALUES ($1, $2)"#);
/// assert_eq!(insert.values.len(), 2);
/// ```
pub fn compile_insert(dialect: &dyn Dialect, table: &str, record: &Record) -> CompiledInsert {
	let quoted_table = dialect.quote_identifier(table);
	if record.is_empty() {
		return CompiledInsert {
			sql: dialect.empty_insert_sql(&quoted_table),
			values: Vec::new(),
		};
	}

	let mut columns = Vec::with_capacity(record.len());
	let mut placeholders = Vec::with_capacity(record.len());
	let mut values = Vec::with_capacity(record.len());

	for (index, (column, value)) in record.iter().enumerate() {
		columns.push(dialect.quote_identifier(column));
		placeholders.push(dialect.placeholder(index + 1, value));
		values.push(dialect.bind_value(value));
	}

	CompiledInsert {
		sql: format!(
			"INSERT INTO {} ({}) VALUES ({})",
			quoted_table,
			columns.join(", "),
			placeholders.join(", ")
		),
		values,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dialect::{
		MySqlDialect, OracleDialect, PostgresDialect, SqlServerDialect, SqliteDialect,
	};
	use chrono::NaiveDate;
	use rstest::rstest;

	fn post() -> Record {
		Record::new()
			.with("id", 1)
			.with("title", "Post title")
			.with(
				"created_at",
				NaiveDate::from_ymd_opt(2016, 1, 1)
					.unwrap()
					.and_hms_opt(12, 30, 12)
					.unwrap(),
			)
	}

	#[rstest]
	#[case(
		Box::new(PostgresDialect::new()) as Box<dyn Dialect>,
		r#"INSERT INTO "posts" ("id", "title", "created_at") VALUES ($1, $2, $3)"#
	)]
	#[case(
		Box::new(MySqlDialect::new()) as Box<dyn Dialect>,
		"INSERT INTO `posts` (`id`, `title`, `created_at`) VALUES (?, ?, ?)"
	)]
	#[case(
		Box::new(SqliteDialect::new()) as Box<dyn Dialect>,
		r#"INSERT INTO "posts" ("id", "title", "created_at") VALUES (?, ?, ?)"#
	)]
	#[case(
		Box::new(SqlServerDialect::new()) as Box<dyn Dialect>,
		"INSERT INTO [posts] ([id], [title], [created_at]) VALUES (?, ?, ?)"
	)]
	#[case(
		Box::new(OracleDialect::new()) as Box<dyn Dialect>,
		r#"INSERT INTO "posts" ("id", "title", "created_at") VALUES (:1, :2, to_date(:3, 'YYYY-MM-DD HH24:MI:SS'))"#
	)]
	fn test_compile_insert_per_dialect(#[case] dialect: Box<dyn Dialect>, #[case] expected: &str) {
		// Act
		let insert = compile_insert(dialect.as_ref(), "posts", &post());

		// Assert
		assert_eq!(insert.sql, expected);
		assert_eq!(insert.values.len(), 3);
	}

	#[rstest]
	fn test_values_follow_column_order() {
		let insert = compile_insert(&PostgresDialect::new(), "posts", &post());

		assert_eq!(insert.values[0], QueryValue::Int(1));
		assert_eq!(insert.values[1], QueryValue::String("Post title".to_string()));
		assert_eq!(insert.values[2].kind(), "datetime");
	}

	#[rstest]
	fn test_oracle_binds_temporal_as_text() {
		let insert = compile_insert(&OracleDialect::new(), "posts", &post());

		assert_eq!(
			insert.values[2],
			QueryValue::String("2016-01-01 12:30:12".to_string())
		);
	}

	#[rstest]
	fn test_schema_qualified_table() {
		let record = Record::new().with("post_id", 1).with("tag_id", 2);

		let insert = compile_insert(&PostgresDialect::new(), "test_schema.posts_tags", &record);

		assert_eq!(
			insert.sql,
			r#"INSERT INTO "test_schema"."posts_tags" ("post_id", "tag_id") VALUES ($1, $2)"#
		);
	}

	#[rstest]
	fn test_empty_record() {
		let insert = compile_insert(&SqliteDialect::new(), "users", &Record::new());

		assert_eq!(insert.sql, r#"INSERT INTO "users" DEFAULT VALUES"#);
		assert!(insert.values.is_empty());
	}
}
