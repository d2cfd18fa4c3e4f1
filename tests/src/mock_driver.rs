use crate::ExecLog;

use mart_core::{
    async_trait,
    driver::{Connection, Driver, Rows},
    Error, Result,
};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

/// An in-memory driver that answers metadata reads from a fixed table list
/// and queries from a queue of scripted responses.
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect the log through another.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<State>,
}

#[derive(Debug, Default)]
struct State {
    tables: Mutex<Vec<(String, Vec<String>)>>,

    /// Answers for `query`, consumed front to back
    responses: Mutex<VecDeque<Result<Rows>>>,

    /// When set, listing tables fails with this error
    table_names_error: Mutex<Option<Error>>,

    /// Log of all operations executed through this driver
    ops_log: Arc<Mutex<Vec<DriverOp>>>,

    connects: AtomicUsize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverOp {
    TableNames,
    ColumnNames(String),
    Query { sql: String, params: Vec<String> },
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, name: &str, columns: &[&str]) -> Self {
        self.state.tables.lock().unwrap().push((
            name.to_string(),
            columns.iter().map(|column| column.to_string()).collect(),
        ));
        self
    }

    /// Queues the rows returned by the next unanswered query.
    pub fn push_rows(&self, rows: Rows) {
        self.state.responses.lock().unwrap().push_back(Ok(rows));
    }

    /// Queues an error returned by the next unanswered query.
    pub fn push_error(&self, err: Error) {
        self.state.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn fail_table_names(&self, err: Option<Error>) {
        *self.state.table_names_error.lock().unwrap() = err;
    }

    /// Number of connections opened so far
    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> ExecLog {
        ExecLog::new(self.state.ops_log.clone())
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn connect(&self) -> Result<Box<dyn Connection>> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            state: self.state.clone(),
        }))
    }
}

#[derive(Debug)]
struct MockConnection {
    state: Arc<State>,
}

impl MockConnection {
    fn record(&self, op: DriverOp) {
        self.state.ops_log.lock().unwrap().push(op);
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn table_names(&mut self) -> Result<Vec<String>> {
        self.record(DriverOp::TableNames);

        if let Some(err) = self.state.table_names_error.lock().unwrap().clone() {
            return Err(err);
        }

        Ok(self
            .state
            .tables
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn column_names(&mut self, table: &str) -> Result<Vec<String>> {
        self.record(DriverOp::ColumnNames(table.to_string()));

        self.state
            .tables
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, columns)| columns.clone())
            .ok_or_else(|| mart_core::err!("no such table `{table}`"))
    }

    async fn query(&mut self, sql: &str, params: &[String]) -> Result<Rows> {
        self.record(DriverOp::Query {
            sql: sql.to_string(),
            params: params.to_vec(),
        });

        self.state
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Rows::default()))
    }
}
