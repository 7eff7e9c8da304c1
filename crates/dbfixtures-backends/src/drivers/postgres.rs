//! PostgreSQL driver

use async_trait::async_trait;
use sqlx::{
	Column, Decode, Encode, PgPool, Postgres, Row as SqlxRow, Transaction, Type, ValueRef,
	encode::IsNull,
	error::BoxDynError,
	postgres::{PgArgumentBuffer, PgRow, PgTypeInfo, types::Oid},
};
use std::sync::Arc;

use crate::{
	backend::{DatabaseBackend, TransactionExecutor},
	error::{DatabaseError, Result},
	types::{DatabaseType, QueryResult, QueryValue, Row},
};

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>;

/// NULL sent with an unspecified parameter type.
///
/// A typed NULL (`None::<i32>`) is rejected by columns whose type has no
/// assignment cast from that type; OID 0 lets the server infer it from the
/// target column instead.
struct UntypedNull;

impl Type<Postgres> for UntypedNull {
	fn type_info() -> PgTypeInfo {
		PgTypeInfo::with_oid(Oid(0))
	}
}

impl Encode<'_, Postgres> for UntypedNull {
	fn encode_by_ref(&self, _buf: &mut PgArgumentBuffer) -> std::result::Result<IsNull, BoxDynError> {
		Ok(IsNull::Yes)
	}
}

fn bind_value<'q>(query: PgQuery<'q>, value: &'q QueryValue) -> PgQuery<'q> {
	match value {
		QueryValue::Null => query.bind(UntypedNull),
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

fn build_query<'q>(sql: &'q str, params: &'q [QueryValue]) -> PgQuery<'q> {
	params
		.iter()
		.fold(sqlx::query(sql), |query, param| bind_value(query, param))
}

fn try_decode<'r, T>(row: &'r PgRow, index: usize) -> Option<T>
where
	T: Decode<'r, Postgres> + Type<Postgres>,
{
	row.try_get::<T, _>(index).ok()
}

fn convert_row(pg_row: PgRow) -> Result<Row> {
	let mut row = Row::new();
	for (index, column) in pg_row.columns().iter().enumerate() {
		let name = column.name().to_string();
		if pg_row.try_get_raw(index)?.is_null() {
			row.insert(name, QueryValue::Null);
			continue;
		}

		let value = if let Some(v) = try_decode::<bool>(&pg_row, index) {
			QueryValue::Bool(v)
		} else if let Some(v) = try_decode::<i64>(&pg_row, index) {
			QueryValue::Int(v)
		} else if let Some(v) = try_decode::<i32>(&pg_row, index) {
			QueryValue::Int(v as i64)
		} else if let Some(v) = try_decode::<i16>(&pg_row, index) {
			QueryValue::Int(v as i64)
		} else if let Some(v) = try_decode::<f64>(&pg_row, index) {
			QueryValue::Float(v)
		} else if let Some(v) = try_decode::<f32>(&pg_row, index) {
			QueryValue::Float(v as f64)
		} else if let Some(v) = try_decode::<String>(&pg_row, index) {
			QueryValue::String(v)
		} else if let Some(v) = try_decode::<chrono::NaiveDate>(&pg_row, index) {
			QueryValue::Date(v)
		} else if let Some(v) = try_decode::<chrono::NaiveTime>(&pg_row, index) {
			QueryValue::Time(v)
		} else if let Some(v) = try_decode::<chrono::NaiveDateTime>(&pg_row, index) {
			QueryValue::DateTime(v)
		} else if let Some(v) = try_decode::<chrono::DateTime<chrono::Utc>>(&pg_row, index) {
			QueryValue::Timestamp(v)
		} else if let Some(v) = try_decode::<Vec<u8>>(&pg_row, index) {
			QueryValue::Bytes(v)
		} else {
			return Err(DatabaseError::TypeError(format!(
				"Unsupported PostgreSQL column type for '{}'",
				name
			)));
		};
		row.insert(name, value);
	}
	Ok(row)
}

/// PostgreSQL database backend
pub struct PostgresBackend {
	pool: Arc<PgPool>,
}

impl PostgresBackend {
	pub fn new(pool: PgPool) -> Self {
		Self {
			pool: Arc::new(pool),
		}
	}

	pub fn pool(&self) -> &PgPool {
		&self.pool
	}
}

#[async_trait]
impl DatabaseBackend for PostgresBackend {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::Postgres
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
		Ok(Box::new(PgTransactionExecutor::new(tx)))
	}
}

/// PostgreSQL transaction executor
pub struct PgTransactionExecutor {
	tx: Option<Transaction<'static, Postgres>>,
}

impl PgTransactionExecutor {
	pub fn new(tx: Transaction<'static, Postgres>) -> Self {
		Self { tx: Some(tx) }
	}

	fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>> {
		self.tx.as_mut().ok_or_else(|| {
			DatabaseError::TransactionError("Transaction already consumed".to_string())
		})
	}
}

#[async_trait]
impl TransactionExecutor for PgTransactionExecutor {
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
