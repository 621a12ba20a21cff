//! SQLite implementation of the backend contract.

use craftdb_core::{Backend, DbError, Record, Result, Value};
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::codec;
use crate::config::SqliteConfig;

/// Backend adapter owning a live SQLite connection.
///
/// The connection is opened eagerly at construction and held for the
/// adapter's lifetime. Each statement commits independently under
/// SQLite's autocommit.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Opens the database file named by `config`, read-write, creating
    /// it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] when the file cannot be opened.
    pub fn connect(config: &SqliteConfig) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
        let conn = Connection::open_with_flags(config.path(), flags)
            .map_err(|e| DbError::Connection(e.to_string()))?;
        debug!(path = %config.path().display(), "sqlite connection opened");
        Ok(Self { conn })
    }

    /// Opens a private in-memory database. Useful for tests and
    /// scratch work.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Direct access to the underlying connection, for setup that falls
    /// outside the persistence contract (e.g. creating tables).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn prepare(&mut self, sql: &str) -> Result<rusqlite::Statement<'_>> {
        self.conn
            .prepare(sql)
            .map_err(|e| DbError::Preparation(e.to_string()))
    }
}

impl Backend for SqliteBackend {
    fn engine(&self) -> &'static str {
        "sqlite"
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Record>> {
        debug!(engine = "sqlite", sql, "query");
        let mut stmt = self.prepare(sql)?;
        codec::fetch_all(&mut stmt, [])
    }

    fn query_bound(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Record>> {
        debug!(engine = "sqlite", sql, "bound query");
        let mut stmt = self.prepare(sql)?;
        codec::fetch_all(
            &mut stmt,
            rusqlite::params_from_iter(params.iter().map(codec::to_native)),
        )
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        debug!(engine = "sqlite", sql, "execute");
        let mut stmt = self.prepare(sql)?;
        let affected = stmt
            .execute([])
            .map_err(|e| DbError::Execution(e.to_string()))?;
        Ok(affected as u64)
    }

    fn execute_bound(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        debug!(engine = "sqlite", sql, "bound execute");
        let mut stmt = self.prepare(sql)?;
        let affected = stmt
            .execute(rusqlite::params_from_iter(
                params.iter().map(codec::to_native),
            ))
            .map_err(|e| DbError::Execution(e.to_string()))?;
        Ok(affected as u64)
    }

    fn last_insert_id(&mut self) -> i64 {
        self.conn.last_insert_rowid()
    }

    fn table_columns(&mut self, table: &str) -> Result<Vec<String>> {
        let sql = format!("PRAGMA table_info({table})");
        let mut stmt = self.prepare(&sql)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>("name"))
            .map_err(|e| DbError::Execution(e.to_string()))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| DbError::Execution(e.to_string()))?;
        Ok(names)
    }

    /// SQLite's native escaping doubles single quotes; everything else
    /// passes through.
    fn escape(&self, raw: &str) -> String {
        raw.replace('\'', "''")
    }
}
