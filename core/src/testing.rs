//! Scripted backend for exercising mapper and builder logic without a
//! live engine.

use std::collections::VecDeque;

use crate::backend::Backend;
use crate::error::Result;
use crate::record::Record;
use crate::value::Value;

/// Records every statement it is handed and replays canned responses.
///
/// Schema introspection answers from a fixed column list and is not
/// recorded, so tests can assert on the exact statements an operation
/// produced. Escaping follows the quote-doubling convention.
pub(crate) struct RecordingBackend {
    pub statements: Vec<(String, Vec<Value>)>,
    pub canned_rows: VecDeque<Vec<Record>>,
    pub columns: Vec<String>,
    pub affected: u64,
    pub last_id: i64,
}

impl RecordingBackend {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            statements: Vec::new(),
            canned_rows: VecDeque::new(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            affected: 1,
            last_id: 1,
        }
    }

    /// Queues a row set for the next read.
    pub fn push_rows(&mut self, rows: Vec<Record>) {
        self.canned_rows.push_back(rows);
    }

    /// Statement text of the `index`-th recorded statement.
    pub fn sql(&self, index: usize) -> &str {
        &self.statements[index].0
    }

    fn next_rows(&mut self) -> Vec<Record> {
        self.canned_rows.pop_front().unwrap_or_default()
    }
}

impl Backend for RecordingBackend {
    fn engine(&self) -> &'static str {
        "recording"
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Record>> {
        self.statements.push((sql.to_string(), Vec::new()));
        Ok(self.next_rows())
    }

    fn query_bound(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Record>> {
        self.statements.push((sql.to_string(), params.to_vec()));
        Ok(self.next_rows())
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        self.statements.push((sql.to_string(), Vec::new()));
        Ok(self.affected)
    }

    fn execute_bound(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        self.statements.push((sql.to_string(), params.to_vec()));
        Ok(self.affected)
    }

    fn last_insert_id(&mut self) -> i64 {
        self.last_id
    }

    fn table_columns(&mut self, _table: &str) -> Result<Vec<String>> {
        Ok(self.columns.clone())
    }

    fn escape(&self, raw: &str) -> String {
        raw.replace('\'', "''")
    }
}
