//! MySQL and MariaDB dialect.

use async_trait::async_trait;
use dbfixtures_backends::{DatabaseType, QueryValue, TransactionExecutor};

use super::{Dialect, execute};
use crate::error::FixtureResult;

/// MySQL SQL policy.
///
/// Foreign keys are suspended for the whole session with
/// `FOREIGN_KEY_CHECKS`. Auto-increment counters follow explicitly
/// inserted ids on their own, so no per-table work is needed.
#[derive(Debug, Clone, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Dialect for MySqlDialect {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::Mysql
	}

	fn quote_chars(&self) -> (char, char) {
		('`', '`')
	}

	fn placeholder(&self, _position: usize, _value: &QueryValue) -> String {
		"?".to_string()
	}

	fn current_database_sql(&self) -> &'static str {
		"SELECT DATABASE() AS database_name"
	}

	async fn disable_referential_integrity(
		&self,
		tx: &mut dyn TransactionExecutor,
		_tables: &[String],
	) -> FixtureResult<()> {
		execute(tx, "SET FOREIGN_KEY_CHECKS = 0", Vec::new()).await?;
		Ok(())
	}

	async fn enable_referential_integrity(
		&self,
		tx: &mut dyn TransactionExecutor,
		_tables: &[String],
	) -> FixtureResult<()> {
		execute(tx, "SET FOREIGN_KEY_CHECKS = 1", Vec::new()).await?;
		Ok(())
	}

	fn empty_insert_sql(&self, quoted_table: &str) -> String {
		format!("INSERT INTO {quoted_table} () VALUES ()")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(1)]
	#[case(7)]
	fn test_placeholder_is_positionless(#[case] position: usize) {
		assert_eq!(MySqlDialect::new().placeholder(position, &QueryValue::Null), "?");
	}

	#[rstest]
	fn test_quote_identifier_backticks() {
		let dialect = MySqlDialect::new();
		assert_eq!(dialect.quote_identifier("blog.posts"), "`blog`.`posts`");
		assert_eq!(dialect.quote_identifier("`posts`"), "`posts`");
	}
}
