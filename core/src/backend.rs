//! Backend adapter contract.
//!
//! Each storage engine exposes the same fixed set of primitive
//! operations through the [`Backend`] trait, with exactly one concrete
//! implementation per engine. Mappers and builders are generic over the
//! trait and receive an adapter by value, so a handle's exclusive
//! ownership of its connection is structural.

use crate::error::Result;
use crate::record::Record;
use crate::value::Value;

/// Primitive operations a storage engine must expose.
///
/// An adapter owns its live connection, opened eagerly at construction
/// and held for the adapter's lifetime. Connections are never pooled or
/// shared; every operation blocks until the engine responds.
///
/// `query`/`execute` send finished SQL text. The `_bound` variants
/// prepare the statement and bind positional parameters — the only
/// injection-safe path, and the one the mapper uses throughout.
pub trait Backend {
    /// Short engine name for diagnostics (`"mysql"`, `"sqlite"`).
    fn engine(&self) -> &'static str;

    /// Executes finished SQL and fetches every resulting row.
    fn query(&mut self, sql: &str) -> Result<Vec<Record>>;

    /// Prepares `sql`, binds `params` positionally, executes, and
    /// fetches every resulting row.
    fn query_bound(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Record>>;

    /// Executes finished SQL, returning the affected-row count.
    fn execute(&mut self, sql: &str) -> Result<u64>;

    /// Prepares `sql`, binds `params` positionally, and executes,
    /// returning the affected-row count.
    fn execute_bound(&mut self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Generated key of the most recent successful insert on this
    /// connection.
    fn last_insert_id(&mut self) -> i64;

    /// Names of the live columns of `table`, in schema order.
    ///
    /// Backed by the engine's own introspection statement (`DESCRIBE`
    /// on the network engine, `PRAGMA table_info` on the embedded one).
    fn table_columns(&mut self, table: &str) -> Result<Vec<String>>;

    /// The engine's native string-escaping primitive.
    ///
    /// Neutralizes special characters so the result can be placed
    /// inside a single-quoted SQL literal. This is the query builder's
    /// escaping path; it is weaker than parameter binding and must not
    /// be treated as its equivalent.
    fn escape(&self, raw: &str) -> String;
}
