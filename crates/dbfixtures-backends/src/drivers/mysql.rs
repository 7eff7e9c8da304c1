//! MySQL driver

use async_trait::async_trait;
use sqlx::{
	Column, Decode, MySql, MySqlPool, Row as SqlxRow, Transaction, Type, ValueRef,
	mysql::{MySqlArguments, MySqlRow},
};
use std::sync::Arc;

use crate::{
	backend::{DatabaseBackend, TransactionExecutor},
	error::{DatabaseError, Result},
	types::{DatabaseType, QueryResult, QueryValue, Row},
};

type MySqlQuery<'q> = sqlx::query::Query<'q, MySql, MySqlArguments>;

fn bind_value<'q>(query: MySqlQuery<'q>, value: &'q QueryValue) -> MySqlQuery<'q> {
	match value {
		QueryValue::Null => query.bind(None::<i32>),
		QueryValue::Bool(b) => query.bind(b),
		QueryValue::Int(i) => query.bind(i),
		QueryValue::Float(f) => query.bind(f),
		QueryValue::String(s) => query.bind(s),
		QueryValue::Bytes(b) => query.bind(b),
		QueryValue::Date(d) => query.bind(d),
		QueryValue::Time(t) => query.bind(t),
		QueryValue::DateTime(dt) => query.bind(dt),
		QueryValue::Timestamp(ts) => query.bind(ts),
	}
}

fn build_query<'q>(sql: &'q str, params: &'q [QueryValue]) -> MySqlQuery<'q> {
	params
		.iter()
		.fold(sqlx::query(sql), |query, param| bind_value(query, param))
}

fn try_decode<'r, T>(row: &'r MySqlRow, index: usize) -> Option<T>
where
	T: Decode<'r, MySql> + Type<MySql>,
{
	row.try_get::<T, _>(index).ok()
}

fn convert_row(mysql_row: MySqlRow) -> Result<Row> {
	let mut row = Row::new();
	for (index, column) in mysql_row.columns().iter().enumerate() {
		let name = column.name().to_string();
		if mysql_row.try_get_raw(index)?.is_null() {
			row.insert(name, QueryValue::Null);
			continue;
		}

		let value = if let Some(v) = try_decode::<i64>(&mysql_row, index) {
			QueryValue::Int(v)
		} else if let Some(v) = try_decode::<i32>(&mysql_row, index) {
			QueryValue::Int(v as i64)
		} else if let Some(v) = try_decode::<u64>(&mysql_row, index) {
			QueryValue::Int(v as i64)
		} else if let Some(v) = try_decode::<f64>(&mysql_row, index) {
			QueryValue::Float(v)
		} else if let Some(v) = try_decode::<String>(&mysql_row, index) {
			QueryValue::String(v)
		} else if let Some(v) = try_decode::<chrono::NaiveDate>(&mysql_row, index) {
			QueryValue::Date(v)
		} else if let Some(v) = try_decode::<chrono::NaiveTime>(&mysql_row, index) {
			QueryValue::Time(v)
		} else if let Some(v) = try_decode::<chrono::NaiveDateTime>(&mysql_row, index) {
			// MySQL TIMESTAMP/DATETIME without timezone
			QueryValue::DateTime(v)
		} else if let Some(v) = try_decode::<chrono::DateTime<chrono::Utc>>(&mysql_row, index) {
			QueryValue::Timestamp(v)
		} else if let Some(v) = try_decode::<Vec<u8>>(&mysql_row, index) {
			QueryValue::Bytes(v)
		} else {
			return Err(DatabaseError::TypeError(format!(
				"Unsupported MySQL column type for '{}'",
				name
			)));
		};
		row.insert(name, value);
	}
	Ok(row)
}

/// MySQL database backend
pub struct MySqlBackend {
	pool: Arc<MySqlPool>,
}

impl MySqlBackend {
	pub fn new(pool: MySqlPool) -> Self {
		Self {
			pool: Arc::new(pool),
		}
	}

	pub fn pool(&self) -> &MySqlPool {
		&self.pool
	}
}

#[async_trait]
impl DatabaseBackend for MySqlBackend {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::Mysql
	}

	async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<QueryResult> {
		let result = build_query(sql, &params).execute(self.pool.as_ref()).await?;
		Ok(QueryResult {
			rows_affected: result.rows_affected(),
		})
	}

	async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>> {
		let rows = build_query(sql, &params).fetch_all(self.pool.as_ref()).await?;
		rows.into_iter().map(convert_row).collect()
	}

	async fn fetch_optional(&self, sql: &str, params: Vec<QueryValue>) -> Result<Option<Row>> {
		let row = build_query(sql, &params)
			.fetch_optional(self.pool.as_ref())
			.await?;
		row.map(convert_row).transpose()
	}

	async fn execute_script(&self, sql: &str) -> Result<()> {
		sqlx::raw_sql(sql).execute(self.pool.as_ref()).await?;
		Ok(())
	}

	async fn begin(&self) -> Result<Box<dyn TransactionExecutor>> {
		let tx = self.pool.begin().await?;
		Ok(Box::new(MySqlTransactionExecutor::new(tx)))
	}
}

/// MySQL transaction executor
pub struct MySqlTransactionExecutor {
	tx: Option<Transaction<'static, MySql>>,
}

impl MySqlTransactionExecutor {
	pub fn new(tx: Transaction<'static, MySql>) -> Self {
		Self { tx: Some(tx) }
	}

	fn tx(&mut self) -> Result<&mut Transaction<'static, MySql>> {
		self.tx.as_mut().ok_or_else(|| {
			DatabaseError::TransactionError("Transaction already consumed".to_string())
		})
	}
}

#[async_trait]
impl TransactionExecutor for MySqlTransactionExecutor {
	async fn execute(&mut self, sql: &str, params: Vec<QueryValue>) -> Result<QueryResult> {
		let tx = self.tx()?;
		let result = build_query(sql, &params).execute(&mut **tx).await?;
		Ok(QueryResult {
			rows_affected: result.rows_affected(),
		})
	}

	async fn fetch_all(&mut self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>> {
		let tx = self.tx()?;
		let rows = build_query(sql, &params).fetch_all(&mut **tx).await?;
		rows.into_iter().map(convert_row).collect()
	}

	async fn fetch_optional(&mut self, sql: &str, params: Vec<QueryValue>) -> Result<Option<Row>> {
		let tx = self.tx()?;
		let row = build_query(sql, &params).fetch_optional(&mut **tx).await?;
		row.map(convert_row).transpose()
	}

	async fn commit(mut self: Box<Self>) -> Result<()> {
		let tx = self.tx.take().ok_or_else(|| {
			DatabaseError::TransactionError("Transaction already consumed".to_string())
		})?;
		tx.commit().await?;
		Ok(())
	}

	async fn rollback(mut self: Box<Self>) -> Result<()> {
		let tx = self.tx.take().ok_or_else(|| {
			DatabaseError::TransactionError("Transaction already consumed".to_string())
		})?;
		tx.rollback().await?;
		Ok(())
	}
}
