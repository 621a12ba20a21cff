//! MySQL implementation of the backend contract.

use craftdb_core::{Backend, DbError, Record, Result, Value};
use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder};
use tracing::debug;

use crate::codec;
use crate::config::{DEFAULT_PORT, MysqlConfig};

/// Backslash escaping with the server's `real_escape_string` semantics:
/// NUL, quotes, backslash, line breaks, and Ctrl-Z are neutralized.
fn escape_text(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\0' => escaped.push_str("\\0"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{1a}' => escaped.push_str("\\Z"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Backend adapter owning a live MySQL client connection.
///
/// The connection is opened eagerly at construction against the fixed
/// conventional port, with the session charset initialized to
/// `utf8mb4`, and held for the adapter's lifetime. Each statement
/// commits independently under the server's autocommit.
pub struct MysqlBackend {
    conn: Conn,
}

impl MysqlBackend {
    /// Connects and authenticates with the settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] on connect or authentication
    /// failure.
    pub fn connect(config: &MysqlConfig) -> Result<Self> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(config.host.clone()))
            .tcp_port(DEFAULT_PORT)
            .db_name(Some(config.database.clone()))
            .user(Some(config.username.clone()))
            .pass(Some(config.password.clone()))
            .init(vec!["SET NAMES utf8mb4".to_string()]);
        let conn = Conn::new(opts).map_err(|e| DbError::Connection(e.to_string()))?;
        debug!(host = %config.host, database = %config.database, "mysql connection opened");
        Ok(Self { conn })
    }
}

impl Backend for MysqlBackend {
    fn engine(&self) -> &'static str {
        "mysql"
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Record>> {
        debug!(engine = "mysql", sql, "query");
        let result = self
            .conn
            .query_iter(sql)
            .map_err(|e| DbError::Execution(e.to_string()))?;
        codec::collect_rows(result)
    }

    fn query_bound(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Record>> {
        debug!(engine = "mysql", sql, "bound query");
        let stmt = self
            .conn
            .prep(sql)
            .map_err(|e| DbError::Preparation(e.to_string()))?;
        let result = self
            .conn
            .exec_iter(&stmt, codec::to_params(params))
            .map_err(|e| DbError::Execution(e.to_string()))?;
        codec::collect_rows(result)
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        debug!(engine = "mysql", sql, "execute");
        let result = self
            .conn
            .query_iter(sql)
            .map_err(|e| DbError::Execution(e.to_string()))?;
        Ok(result.affected_rows())
    }

    fn execute_bound(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        debug!(engine = "mysql", sql, "bound execute");
        let stmt = self
            .conn
            .prep(sql)
            .map_err(|e| DbError::Preparation(e.to_string()))?;
        let result = self
            .conn
            .exec_iter(&stmt, codec::to_params(params))
            .map_err(|e| DbError::Execution(e.to_string()))?;
        Ok(result.affected_rows())
    }

    fn last_insert_id(&mut self) -> i64 {
        self.conn.last_insert_id() as i64
    }

    fn table_columns(&mut self, table: &str) -> Result<Vec<String>> {
        let sql = format!("DESCRIBE {table}");
        let rows = self.query(&sql)?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("Field"))
            .filter_map(|value| value.as_text().map(str::to_string))
            .collect())
    }

    fn escape(&self, raw: &str) -> String {
        escape_text(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The connection-backed paths are exercised end to end by the
    // workspace's embedded-engine integration suite, which drives the
    // same mapper and builder logic; escaping is pure and testable
    // without a server.
    #[test]
    fn test_escape_neutralizes_special_characters() {
        assert_eq!(escape_text("a's value"), "a\\'s value");
        assert_eq!(escape_text("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_text("back\\slash"), "back\\\\slash");
        assert_eq!(escape_text("line\nbreak\r"), "line\\nbreak\\r");
        assert_eq!(escape_text("nul\0byte"), "nul\\0byte");
        assert_eq!(escape_text("ctrl\u{1a}z"), "ctrl\\Zz");
        assert_eq!(escape_text("plain"), "plain");
    }

    #[test]
    fn test_escaped_text_survives_quoting() {
        let literal = format!("'{}'", escape_text("a's value"));
        assert_eq!(literal, "'a\\'s value'");
    }
}
