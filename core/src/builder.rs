//! Fluent, chainable SQL assembly.
//!
//! [`QueryBuilder`] accumulates statement text through chained clause
//! calls and sends the assembled statement to its backend on
//! [`execute`](QueryBuilder::execute). Every input shape is a closed
//! variant type: [`Values`] for insert payloads, [`Assignments`] for
//! SET clauses, [`Operator`] and [`JoinKind`] for comparison and join
//! flavors.
//!
//! # Escaping caveat
//!
//! Builder values pass through the backend's **native string-escaping
//! primitive** and are concatenated into the statement text. That is
//! weaker than the parameter binding the mapper uses throughout: it
//! neutralizes quote characters, but it is a compatibility shim, not a
//! security-equivalent alternative. Route untrusted input through the
//! mapper, or keep it out of builder clauses.
//!
//! # Example
//!
//! ```
//! use craftdb_core::{Backend, Execution, QueryBuilder, Result, Value};
//!
//! fn active_admins<B: Backend>(backend: B) -> Result<Execution> {
//!     let mut users = QueryBuilder::table(backend, "users")?;
//!     users
//!         .select("id, name")
//!         .where_eq(&[("role", Value::from("admin"))])
//!         .limit(10)
//!         .execute(false)
//! }
//! ```

use crate::backend::Backend;
use crate::error::{DbError, Result};
use crate::record::Record;
use crate::value::Value;

/// Statement shape selected by the first chained call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Select,
    Insert,
    Update,
    Delete,
}

/// Comparison operator for [`QueryBuilder::where_cmp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// Matches with a trailing `%` wildcard appended to the value.
    Like,
}

impl Operator {
    fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Like => "LIKE",
        }
    }
}

/// Join flavor for [`QueryBuilder::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Bare `JOIN`.
    Plain,
    Inner,
    Left,
    Right,
}

impl JoinKind {
    fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Plain => "JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

/// Insert payload for [`QueryBuilder::values`].
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    /// Positional values; the column list must come from
    /// [`insert`](QueryBuilder::insert).
    Positional(Vec<Value>),
    /// One row of column/value pairs; emits the column list itself.
    Named(Vec<(String, Value)>),
    /// Multiple rows; the column list comes from the first row and
    /// every row emits one parenthesized tuple, in input order.
    Batch(Vec<Vec<(String, Value)>>),
}

/// SET payload for [`QueryBuilder::set`].
#[derive(Debug, Clone, PartialEq)]
pub enum Assignments {
    /// Column/value pairs.
    Named(Vec<(String, Value)>),
    /// Values paired positionally with the column list stored by
    /// [`update`](QueryBuilder::update).
    Positional(Vec<Value>),
}

/// Outcome of [`QueryBuilder::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// The assembled statement text of a debug run; the backend was
    /// never contacted.
    Statement(String),
    /// Full row set of a read-shaped statement.
    Rows(Vec<Record>),
    /// A non-read statement completed.
    Done,
}

/// Mutable statement-assembly handle bound to one table and one owned
/// backend connection.
///
/// Every clause method returns `&mut Self` for chaining;
/// [`execute`](Self::execute) and [`get_result`](Self::get_result)
/// terminate a chain. A builder is single-use: after `execute`, further
/// chained calls still mutate the internal text but carry no defined
/// re-execution contract.
pub struct QueryBuilder<B> {
    backend: B,
    table: String,
    mode: Option<QueryMode>,
    query: String,
    where_clause: String,
    join_clause: String,
    columns: Vec<String>,
    if_exists: bool,
    has_on_clause: bool,
    result: Option<Vec<Record>>,
}

impl<B: Backend> QueryBuilder<B> {
    /// Starts a fresh builder bound to `table`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Configuration`] if `table` is empty.
    pub fn table(backend: B, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        if table.is_empty() {
            return Err(DbError::Configuration("table name is not set".to_string()));
        }
        Ok(Self {
            backend,
            table,
            mode: None,
            query: String::new(),
            where_clause: String::new(),
            join_clause: String::new(),
            columns: Vec::new(),
            if_exists: false,
            has_on_clause: false,
            result: None,
        })
    }

    /// Releases the handle, returning the owned backend adapter.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// The statement shape selected so far, if any.
    pub fn mode(&self) -> Option<QueryMode> {
        self.mode
    }

    /// Shapes a read statement over `columns` (e.g. `"*"` or
    /// `"id, name"`).
    pub fn select(&mut self, columns: &str) -> &mut Self {
        self.mode = Some(QueryMode::Select);
        self.query = format!("SELECT {columns} FROM {}", self.table);
        self.has_on_clause = false;
        self
    }

    /// Shapes a create statement. A non-empty `columns` slice emits the
    /// parenthesized column list; leave it empty when the payload names
    /// its own columns ([`Values::Named`] / [`Values::Batch`]).
    pub fn insert(&mut self, columns: &[&str]) -> &mut Self {
        self.mode = Some(QueryMode::Insert);
        self.query = format!("INSERT INTO {}", self.table);
        self.has_on_clause = false;
        if !columns.is_empty() {
            self.query.push_str(&format!(" ({})", columns.join(",")));
        }
        self
    }

    /// Shapes a modify statement. `columns` are retained to pair with a
    /// later [`Assignments::Positional`] payload; nothing is appended
    /// yet.
    pub fn update(&mut self, columns: &[&str]) -> &mut Self {
        self.mode = Some(QueryMode::Update);
        self.query = format!("UPDATE {}", self.table);
        self.has_on_clause = false;
        self.columns = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Shapes a modify statement with a literal SET fragment appended
    /// verbatim. The fragment is **not** escaped.
    pub fn update_raw(&mut self, set_fragment: &str) -> &mut Self {
        self.mode = Some(QueryMode::Update);
        self.query = format!("UPDATE {} SET {set_fragment}", self.table);
        self.has_on_clause = false;
        self
    }

    /// Shapes a remove statement. This is always a physical delete; a
    /// soft delete is expressed as an update of the deletion marker
    /// column.
    pub fn delete(&mut self) -> &mut Self {
        self.mode = Some(QueryMode::Delete);
        self.query = format!("DELETE FROM {}", self.table);
        self.has_on_clause = false;
        self
    }

    /// Adds equality conditions, one per pair, combined with AND.
    /// Repeated where calls also combine with AND.
    pub fn where_eq(&mut self, conditions: &[(&str, Value)]) -> &mut Self {
        let rendered: Vec<String> = conditions
            .iter()
            .map(|(column, value)| format!("{column} = {}", self.render(value)))
            .collect();
        self.append_where(&rendered);
        self
    }

    /// Adds conditions comparing `columns` to `values` by position with
    /// `operator`. Mismatched list lengths leave the clause untouched.
    pub fn where_cmp(&mut self, columns: &[&str], values: &[Value], operator: Operator) -> &mut Self {
        if columns.len() != values.len() {
            return self;
        }
        let rendered: Vec<String> = columns
            .iter()
            .zip(values)
            .map(|(column, value)| {
                let literal = if operator == Operator::Like {
                    self.render_like(value)
                } else {
                    self.render(value)
                };
                format!("{column} {} {literal}", operator.as_sql())
            })
            .collect();
        self.append_where(&rendered);
        self
    }

    /// Appends a row-limit clause to whichever fragment is currently
    /// open: the WHERE text if any has accumulated, else the base
    /// query.
    pub fn limit(&mut self, count: u64) -> &mut Self {
        let fragment = format!(" LIMIT {count}");
        if self.where_clause.is_empty() {
            self.query.push_str(&fragment);
        } else {
            self.where_clause.push_str(&fragment);
        }
        self
    }

    /// Appends a join fragment. An explicit `on` condition is appended
    /// verbatim and marks the on-clause satisfied.
    pub fn join(&mut self, table: &str, kind: JoinKind, on: Option<&str>) -> &mut Self {
        self.join_clause
            .push_str(&format!(" {} {table}", kind.as_sql()));
        if let Some(on) = on {
            self.join_clause.push_str(&format!(" ON {on}"));
            self.has_on_clause = true;
        }
        self
    }

    /// Appends an equality on-clause, once: if an on-clause has already
    /// been set for the current join, the call is a no-op.
    pub fn on(&mut self, left: &str, right: &str) -> &mut Self {
        if self.has_on_clause {
            return self;
        }
        self.join_clause.push_str(&format!(" ON {left} = {right}"));
        self.has_on_clause = true;
        self
    }

    /// Appends a SET fragment for a modify statement. Positional values
    /// pair with the column list stored by [`update`](Self::update);
    /// values beyond the stored columns are dropped.
    pub fn set(&mut self, data: Assignments) -> &mut Self {
        let rendered: Vec<String> = match &data {
            Assignments::Named(pairs) => pairs
                .iter()
                .map(|(column, value)| format!("{column} = {}", self.render(value)))
                .collect(),
            Assignments::Positional(values) => self
                .columns
                .iter()
                .zip(values)
                .map(|(column, value)| format!("{column} = {}", self.render(value)))
                .collect(),
        };
        self.query.push_str(&format!(" SET {}", rendered.join(", ")));
        self
    }

    /// Appends the VALUES fragment of a create statement.
    ///
    /// [`Values::Batch`] emits one parenthesized tuple per row in input
    /// order, taking the column list from the first row; an empty batch
    /// is a no-op.
    pub fn values(&mut self, values: Values) -> &mut Self {
        match &values {
            Values::Positional(list) => {
                let rendered = list
                    .iter()
                    .map(|value| self.render(value))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.query.push_str(&format!(" VALUES ({rendered})"));
            }
            Values::Named(pairs) => {
                let columns = pairs
                    .iter()
                    .map(|(column, _)| column.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let rendered = pairs
                    .iter()
                    .map(|(_, value)| self.render(value))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.query
                    .push_str(&format!(" ({columns}) VALUES ({rendered})"));
            }
            Values::Batch(rows) => {
                let Some(first) = rows.first() else {
                    return self;
                };
                let columns = first
                    .iter()
                    .map(|(column, _)| column.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let tuples = rows
                    .iter()
                    .map(|row| {
                        let rendered = row
                            .iter()
                            .map(|(_, value)| self.render(value))
                            .collect::<Vec<_>>()
                            .join(", ");
                        format!("({rendered})")
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                self.query
                    .push_str(&format!(" ({columns}) VALUES {tuples}"));
            }
        }
        self
    }

    /// Marks the statement with the existence-check flag. The flag has
    /// no effect on the assembled text; callers read it back through
    /// [`if_exists_requested`](Self::if_exists_requested).
    pub fn if_exists(&mut self) -> &mut Self {
        self.if_exists = true;
        self
    }

    /// Whether [`if_exists`](Self::if_exists) was called.
    pub fn if_exists_requested(&self) -> bool {
        self.if_exists
    }

    /// Assembles and runs the statement.
    ///
    /// The accumulated join text, then the accumulated WHERE text, are
    /// appended onto the base query. With `debug = true` the assembled
    /// text is returned and the backend is never contacted; the next
    /// non-debug `execute` runs exactly that text. Read-shaped
    /// statements return (and cache) the full row set; other shapes
    /// return [`Execution::Done`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Configuration`] for an unshaped builder, and
    /// passes through backend preparation/execution errors.
    pub fn execute(&mut self, debug: bool) -> Result<Execution> {
        let Some(mode) = self.mode else {
            return Err(DbError::Configuration(
                "query has no shape; call select, insert, update, or delete first".to_string(),
            ));
        };

        if !self.join_clause.is_empty() {
            let join_clause = std::mem::take(&mut self.join_clause);
            self.query.push_str(&join_clause);
        }
        if !self.where_clause.is_empty() {
            let where_clause = std::mem::take(&mut self.where_clause);
            self.query.push_str(&where_clause);
        }

        if debug {
            return Ok(Execution::Statement(self.query.clone()));
        }

        match mode {
            QueryMode::Select => {
                let rows = self.backend.query(&self.query)?;
                self.result = Some(rows.clone());
                Ok(Execution::Rows(rows))
            }
            _ => {
                self.backend.execute(&self.query)?;
                Ok(Execution::Done)
            }
        }
    }

    /// Rows cached by the most recent read execution, if any.
    pub fn get_result(&self) -> Option<&[Record]> {
        self.result.as_deref()
    }

    fn append_where(&mut self, conditions: &[String]) {
        if conditions.is_empty() {
            return;
        }
        let joined = conditions.join(" AND ");
        if self.where_clause.is_empty() {
            self.where_clause = format!(" WHERE {joined}");
        } else {
            self.where_clause.push_str(&format!(" AND {joined}"));
        }
    }

    /// Renders a value as a SQL literal, escaping text through the
    /// backend's native primitive.
    fn render(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(r) => r.to_string(),
            Value::Text(t) => format!("'{}'", self.backend.escape(t)),
        }
    }

    /// Renders a value as a LIKE pattern with a trailing wildcard.
    fn render_like(&self, value: &Value) -> String {
        let raw = match value {
            Value::Null => String::new(),
            Value::Integer(i) => i.to_string(),
            Value::Real(r) => r.to_string(),
            Value::Text(t) => t.clone(),
        };
        format!("'{}%'", self.backend.escape(&raw))
    }
}
