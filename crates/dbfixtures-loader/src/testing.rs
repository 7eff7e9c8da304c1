//! Recording test double for the backend traits.
//!
//! Lets dialect and loader tests assert on the exact statement sequence
//! without a live database, including for engines without a bundled driver.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dbfixtures_backends::{
	DatabaseBackend, DatabaseConnection, DatabaseError, DatabaseType, QueryResult, QueryValue,
	Row, TransactionExecutor,
};

#[derive(Debug, Default)]
struct State {
	statements: Vec<(String, Vec<QueryValue>)>,
	rows: Vec<(String, Vec<Row>)>,
	failures: Vec<String>,
}

/// Shared log of every statement issued through a [`RecordingBackend`].
#[derive(Debug, Clone, Default)]
pub(crate) struct Recorder {
	state: Arc<Mutex<State>>,
}

impl Recorder {
	/// Statements in issue order.
	pub(crate) fn sql(&self) -> Vec<String> {
		self.state
			.lock()
			.unwrap()
			.statements
			.iter()
			.map(|(sql, _)| sql.clone())
			.collect()
	}

	/// Statements together with their bound values.
	pub(crate) fn statements(&self) -> Vec<(String, Vec<QueryValue>)> {
		self.state.lock().unwrap().statements.clone()
	}

	/// Rows returned by any query containing `pattern`.
	pub(crate) fn respond(&self, pattern: &str, rows: Vec<Row>) {
		self.state
			.lock()
			.unwrap()
			.rows
			.push((pattern.to_string(), rows));
	}

	/// Makes every statement containing `pattern` fail.
	pub(crate) fn fail_on(&self, pattern: &str) {
		self.state
			.lock()
			.unwrap()
			.failures
			.push(pattern.to_string());
	}

	fn record(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>, DatabaseError> {
		let mut state = self.state.lock().unwrap();
		state.statements.push((sql.to_string(), params));
		if state.failures.iter().any(|p| sql.contains(p.as_str())) {
			return Err(DatabaseError::TransactionError(format!("scripted failure: {sql}")));
		}
		Ok(state
			.rows
			.iter()
			.find(|(p, _)| sql.contains(p.as_str()))
			.map(|(_, rows)| rows.clone())
			.unwrap_or_default())
	}
}

/// Builds a single-column row.
pub(crate) fn row(column: &str, value: impl Into<QueryValue>) -> Row {
	let mut row = Row::new();
	row.insert(column.to_string(), value.into());
	row
}

pub(crate) struct RecordingBackend {
	database_type: DatabaseType,
	recorder: Recorder,
}

impl RecordingBackend {
	pub(crate) fn connection(database_type: DatabaseType) -> (DatabaseConnection, Recorder) {
		let recorder = Recorder::default();
		let backend = Self {
			database_type,
			recorder: recorder.clone(),
		};
		(DatabaseConnection::new(Arc::new(backend)), recorder)
	}
}

#[async_trait]
impl DatabaseBackend for RecordingBackend {
	fn database_type(&self) -> DatabaseType {
		self.database_type
	}

	async fn execute(&self, sql: &str, params: Vec<QueryValue>) -> Result<QueryResult, DatabaseError> {
		self.recorder.record(sql, params)?;
		Ok(QueryResult { rows_affected: 1 })
	}

	async fn fetch_all(&self, sql: &str, params: Vec<QueryValue>) -> Result<Vec<Row>, DatabaseError> {
		self.recorder.record(sql, params)
	}

	async fn fetch_optional(
		&self,
		sql: &str,
		params: Vec<QueryValue>,
	) -> Result<Option<Row>, DatabaseError> {
		Ok(self.recorder.record(sql, params)?.into_iter().next())
	}

	async fn execute_script(&self, sql: &str) -> Result<(), DatabaseError> {
		self.recorder.record(sql, Vec::new()).map(|_| ())
	}

	async fn begin(&self) -> Result<Box<dyn TransactionExecutor>, DatabaseError> {
		self.recorder.record("BEGIN", Vec::new())?;
		Ok(Box::new(RecordingExecutor {
			recorder: self.recorder.clone(),
		}))
	}
}

pub(crate) struct RecordingExecutor {
	pub(crate) recorder: Recorder,
}

#[async_trait]
impl TransactionExecutor for RecordingExecutor {
	async fn execute(
		&mut self,
		sql: &str,
		params: Vec<QueryValue>,
	) -> Result<QueryResult, DatabaseError> {
		self.recorder.record(sql, params)?;
		Ok(QueryResult { rows_affected: 1 })
	}

	async fn fetch_all(
		&mut self,
		sql: &str,
		params: Vec<QueryValue>,
	) -> Result<Vec<Row>, DatabaseError> {
		self.recorder.record(sql, params)
	}

	async fn fetch_optional(
		&mut self,
		sql: &str,
		params: Vec<QueryValue>,
	) -> Result<Option<Row>, DatabaseError> {
		Ok(self.recorder.record(sql, params)?.into_iter().next())
	}

	async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
		self.recorder.record("COMMIT", Vec::new()).map(|_| ())
	}

	async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
		self.recorder.record("ROLLBACK", Vec::new()).map(|_| ())
	}
}
