//! Active-Record style mapper.
//!
//! [`Mapper`] binds an [`EntityDef`] to a live backend connection and
//! implements the CRUD surface once against the [`Backend`] primitive
//! contract, so both engines behave identically with respect to
//! soft-deletion, automatic timestamping, and schema introspection.
//!
//! Every primary-key-based and condition-based read or write goes
//! through backend parameter binding, never string interpolation.
//!
//! # Example
//!
//! ```
//! use craftdb_core::{Backend, EntityDef, Mapper, Result, Value};
//!
//! fn store_and_fetch<B: Backend>(backend: B) -> Result<()> {
//!     let users = EntityDef::new("users")
//!         .with_fillable(["name", "email"])
//!         .with_soft_delete()
//!         .with_timestamps();
//!     let mut mapper = Mapper::new(backend, users)?;
//!
//!     let id = mapper.store(&[
//!         ("name", Value::from("Ann")),
//!         ("email", Value::from("a@x.com")),
//!     ])?;
//!     let row = mapper.find_or_fail(id)?;
//!     assert_eq!(row["name"].as_text(), Some("Ann"));
//!     Ok(())
//! }
//! ```

use chrono::Utc;

use crate::backend::Backend;
use crate::entity::{CREATED_AT_COLUMN, DELETED_AT_COLUMN, EntityDef, UPDATED_AT_COLUMN};
use crate::error::{DbError, Result};
use crate::record::Record;
use crate::value::Value;

/// Render format for generated timestamps.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn now_string() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Replaces `column` in `fields` or appends it.
fn upsert_field(fields: &mut Vec<(String, Value)>, column: &str, value: Value) {
    match fields.iter_mut().find(|(c, _)| c == column) {
        Some((_, existing)) => *existing = value,
        None => fields.push((column.to_string(), value)),
    }
}

/// A handle owning exactly one backend connection and one entity
/// descriptor.
///
/// The live schema of the entity's table is introspected lazily on
/// first need and cached for the handle's lifetime; soft-delete
/// behavior is active only when the capability is declared *and* the
/// `deleted_at` column actually exists.
pub struct Mapper<B> {
    backend: B,
    entity: EntityDef,
    columns: Option<Vec<String>>,
}

impl<B: Backend> Mapper<B> {
    /// Binds `entity` to `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Configuration`] if the entity's table name is
    /// empty.
    pub fn new(backend: B, entity: EntityDef) -> Result<Self> {
        if entity.table().is_empty() {
            return Err(DbError::Configuration("table name is not set".to_string()));
        }
        Ok(Self {
            backend,
            entity,
            columns: None,
        })
    }

    /// The entity descriptor this mapper serves.
    pub fn entity(&self) -> &EntityDef {
        &self.entity
    }

    /// Releases the handle, returning the owned backend adapter.
    pub fn into_backend(self) -> B {
        self.backend
    }

    fn has_column(&mut self, column: &str) -> Result<bool> {
        if self.columns.is_none() {
            let table = self.entity.table().to_string();
            self.columns = Some(self.backend.table_columns(&table)?);
        }
        Ok(self
            .columns
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|c| c == column))
    }

    fn soft_delete_active(&mut self) -> Result<bool> {
        Ok(self.entity.soft_delete() && self.has_column(DELETED_AT_COLUMN)?)
    }

    /// Applies the timestamp policy to a pending write.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::SchemaPolicy`] when the capability is declared
    /// but the live table lacks `created_at` or `updated_at`.
    fn apply_timestamps(&mut self, fields: &mut Vec<(String, Value)>, is_update: bool) -> Result<()> {
        if !self.entity.timestamps() {
            return Ok(());
        }
        if !(self.has_column(CREATED_AT_COLUMN)? && self.has_column(UPDATED_AT_COLUMN)?) {
            return Err(DbError::SchemaPolicy {
                table: self.entity.table().to_string(),
            });
        }
        let now = now_string();
        if !is_update {
            upsert_field(fields, CREATED_AT_COLUMN, Value::Text(now.clone()));
        }
        upsert_field(fields, UPDATED_AT_COLUMN, Value::Text(now));
        Ok(())
    }

    /// All rows, excluding soft-deleted ones when soft deletion is
    /// active. Row order is whatever the backend returns.
    pub fn all(&mut self) -> Result<Vec<Record>> {
        let sql = if self.soft_delete_active()? {
            format!(
                "SELECT * FROM {} WHERE {DELETED_AT_COLUMN} IS NULL",
                self.entity.table()
            )
        } else {
            format!("SELECT * FROM {}", self.entity.table())
        };
        self.backend.query(&sql)
    }

    /// All rows unconditionally, soft-deleted ones included.
    pub fn all_with_trashed(&mut self) -> Result<Vec<Record>> {
        let sql = format!("SELECT * FROM {}", self.entity.table());
        self.backend.query(&sql)
    }

    /// Only soft-deleted rows. Returns an empty set when soft deletion
    /// is not active for this entity.
    pub fn all_only_trashed(&mut self) -> Result<Vec<Record>> {
        if !self.soft_delete_active()? {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT * FROM {} WHERE {DELETED_AT_COLUMN} IS NOT NULL",
            self.entity.table()
        );
        self.backend.query(&sql)
    }

    /// Single row by primary key, excluded if soft-deleted. `None` when
    /// absent.
    pub fn find(&mut self, id: i64) -> Result<Option<Record>> {
        let sql = if self.soft_delete_active()? {
            format!(
                "SELECT * FROM {} WHERE {} = ? AND {DELETED_AT_COLUMN} IS NULL",
                self.entity.table(),
                self.entity.primary_key()
            )
        } else {
            format!(
                "SELECT * FROM {} WHERE {} = ?",
                self.entity.table(),
                self.entity.primary_key()
            )
        };
        let rows = self.backend.query_bound(&sql, &[Value::Integer(id)])?;
        Ok(rows.into_iter().next())
    }

    /// Like [`find`](Self::find), but a miss is an error.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] when no matching row exists.
    pub fn find_or_fail(&mut self, id: i64) -> Result<Record> {
        self.find(id)?.ok_or(DbError::NotFound(id))
    }

    /// Single row by primary key, ignoring soft-delete filtering.
    pub fn find_with_trashed(&mut self, id: i64) -> Result<Option<Record>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?",
            self.entity.table(),
            self.entity.primary_key()
        );
        let rows = self.backend.query_bound(&sql, &[Value::Integer(id)])?;
        Ok(rows.into_iter().next())
    }

    /// Rows matching an AND of equality conditions over `columns`.
    ///
    /// `values` pairs with `columns` by position; missing values bind as
    /// NULL. The soft-delete filter applies when active.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Configuration`] when `columns` is empty.
    pub fn find_by(&mut self, columns: &[&str], values: &[Value]) -> Result<Vec<Record>> {
        if columns.is_empty() {
            return Err(DbError::Configuration(
                "no columns specified for find_by".to_string(),
            ));
        }

        let mut conditions: Vec<String> = columns.iter().map(|c| format!("{c} = ?")).collect();
        let params: Vec<Value> = (0..columns.len())
            .map(|i| values.get(i).cloned().unwrap_or(Value::Null))
            .collect();

        if self.soft_delete_active()? {
            conditions.push(format!("{DELETED_AT_COLUMN} IS NULL"));
        }

        let sql = format!(
            "SELECT * FROM {} WHERE {}",
            self.entity.table(),
            conditions.join(" AND ")
        );
        self.backend.query_bound(&sql, &params)
    }

    /// Inserts a new row and returns the generated primary key.
    ///
    /// Fields outside the entity's fillable set are dropped (when the
    /// set is non-empty). The timestamp policy sets `created_at` and
    /// `updated_at` to now, after verifying the columns exist.
    pub fn store(&mut self, data: &[(&str, Value)]) -> Result<i64> {
        let mut fields: Vec<(String, Value)> = data
            .iter()
            .filter(|(column, _)| self.entity.is_fillable(column))
            .map(|(column, value)| ((*column).to_string(), value.clone()))
            .collect();
        self.apply_timestamps(&mut fields, false)?;

        let columns: Vec<&str> = fields.iter().map(|(c, _)| c.as_str()).collect();
        let placeholders = vec!["?"; fields.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            self.entity.table(),
            columns.join(", ")
        );
        let params: Vec<Value> = fields.iter().map(|(_, v)| v.clone()).collect();

        self.backend.execute_bound(&sql, &params)?;
        Ok(self.backend.last_insert_id())
    }

    /// Updates the row with primary key `id`, returning the affected-row
    /// count. The timestamp policy bumps `updated_at` only.
    pub fn update(&mut self, id: i64, data: &[(&str, Value)]) -> Result<u64> {
        let mut fields: Vec<(String, Value)> = data
            .iter()
            .map(|(column, value)| ((*column).to_string(), value.clone()))
            .collect();
        self.apply_timestamps(&mut fields, true)?;

        let set_clause = fields
            .iter()
            .map(|(c, _)| format!("{c} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {set_clause} WHERE {} = ?",
            self.entity.table(),
            self.entity.primary_key()
        );

        let mut params: Vec<Value> = fields.iter().map(|(_, v)| v.clone()).collect();
        params.push(Value::Integer(id));
        self.backend.execute_bound(&sql, &params)
    }

    /// Deletes the row with primary key `id`, returning the affected-row
    /// count.
    ///
    /// When soft deletion is active the row is marked with a
    /// `deleted_at` timestamp instead of being removed; a declared
    /// capability without the backing column degrades to a physical
    /// delete.
    pub fn delete(&mut self, id: i64) -> Result<u64> {
        if self.soft_delete_active()? {
            let sql = format!(
                "UPDATE {} SET {DELETED_AT_COLUMN} = ? WHERE {} = ?",
                self.entity.table(),
                self.entity.primary_key()
            );
            self.backend
                .execute_bound(&sql, &[Value::Text(now_string()), Value::Integer(id)])
        } else {
            let sql = format!(
                "DELETE FROM {} WHERE {} = ?",
                self.entity.table(),
                self.entity.primary_key()
            );
            self.backend.execute_bound(&sql, &[Value::Integer(id)])
        }
    }

    /// All rows of an inner join with `other`, keyed on the
    /// equally-named `column` in both tables. No filtering is applied.
    pub fn join(&mut self, other: &str, column: &str) -> Result<Vec<Record>> {
        let table = self.entity.table();
        let sql = format!(
            "SELECT * FROM {table} INNER JOIN {other} ON {table}.{column} = {other}.{column}"
        );
        self.backend.query(&sql)
    }

    /// Row count, honoring the soft-delete filter. `conditions` are
    /// equality conditions appended with AND; pass an empty slice for an
    /// unconditional count.
    pub fn count(&mut self, conditions: &[(&str, Value)]) -> Result<u64> {
        let soft = self.soft_delete_active()?;
        let mut sql = format!("SELECT COUNT(*) AS count FROM {}", self.entity.table());
        if soft {
            sql.push_str(&format!(" WHERE {DELETED_AT_COLUMN} IS NULL"));
        }

        let mut params: Vec<Value> = Vec::new();
        if !conditions.is_empty() {
            let clause = conditions
                .iter()
                .map(|(c, _)| format!("{c} = ?"))
                .collect::<Vec<_>>()
                .join(" AND ");
            sql.push_str(if soft { " AND " } else { " WHERE " });
            sql.push_str(&clause);
            params = conditions.iter().map(|(_, v)| v.clone()).collect();
        }

        let rows = if params.is_empty() {
            self.backend.query(&sql)?
        } else {
            self.backend.query_bound(&sql, &params)?
        };
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::Execution("count query returned no rows".to_string()))?;
        match row.get("count") {
            Some(Value::Integer(n)) if *n >= 0 => Ok(*n as u64),
            // The network engine's text protocol delivers counts as text.
            Some(Value::Text(t)) => t
                .parse::<u64>()
                .map_err(|_| DbError::Execution(format!("unexpected count value: {t}"))),
            other => Err(DbError::Execution(format!(
                "unexpected count value: {other:?}"
            ))),
        }
    }

    /// Re-serializes `record`'s current field values and updates the row
    /// with `record`'s own primary key. The primary key itself is
    /// excluded from the SET list.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Configuration`] when the record carries no
    /// usable primary-key value.
    pub fn save(&mut self, record: &Record) -> Result<u64> {
        let pk = self.entity.primary_key().to_string();
        let id = match record.get(&pk) {
            Some(Value::Integer(id)) => *id,
            Some(Value::Text(t)) => t.parse::<i64>().map_err(|_| {
                DbError::Configuration(format!("record's '{pk}' value is not an integer"))
            })?,
            _ => {
                return Err(DbError::Configuration(format!(
                    "record has no '{pk}' value to save against"
                )));
            }
        };
        let data: Vec<(&str, Value)> = record
            .iter()
            .filter(|(column, _)| *column != pk)
            .map(|(column, value)| (column, value.clone()))
            .collect();
        self.update(id, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBackend;

    const USER_COLUMNS: &[&str] = &[
        "id",
        "name",
        "email",
        "created_at",
        "updated_at",
        "deleted_at",
    ];

    fn users() -> EntityDef {
        EntityDef::new("users").with_soft_delete().with_timestamps()
    }

    fn mapper_with(columns: &[&str], entity: EntityDef) -> Mapper<RecordingBackend> {
        Mapper::new(RecordingBackend::new(columns), entity).unwrap()
    }

    fn user_row(id: i64, name: &str) -> Record {
        let mut record = Record::new();
        record.push("id", Value::Integer(id));
        record.push("name", Value::from(name));
        record
    }

    #[test]
    fn test_new_rejects_empty_table() {
        let result = Mapper::new(RecordingBackend::new(&[]), EntityDef::new(""));
        assert!(matches!(result, Err(DbError::Configuration(_))));
    }

    #[test]
    fn test_all_applies_soft_delete_filter() {
        let mut mapper = mapper_with(USER_COLUMNS, users());
        mapper.all().unwrap();
        assert_eq!(
            mapper.backend.sql(0),
            "SELECT * FROM users WHERE deleted_at IS NULL"
        );
    }

    #[test]
    fn test_all_without_deleted_at_column_skips_filter() {
        let mut mapper = mapper_with(&["id", "name"], EntityDef::new("users").with_soft_delete());
        mapper.all().unwrap();
        assert_eq!(mapper.backend.sql(0), "SELECT * FROM users");
    }

    #[test]
    fn test_all_with_trashed_is_unfiltered() {
        let mut mapper = mapper_with(USER_COLUMNS, users());
        mapper.all_with_trashed().unwrap();
        assert_eq!(mapper.backend.sql(0), "SELECT * FROM users");
    }

    #[test]
    fn test_all_only_trashed_without_capability_is_empty() {
        let mut mapper = mapper_with(&["id", "name"], EntityDef::new("users"));
        assert!(mapper.all_only_trashed().unwrap().is_empty());
        // The backend was never contacted.
        assert!(mapper.backend.statements.is_empty());
    }

    #[test]
    fn test_find_binds_id() {
        let mut mapper = mapper_with(USER_COLUMNS, users());
        mapper.backend.push_rows(vec![user_row(1, "Ann")]);
        let row = mapper.find(1).unwrap().unwrap();
        assert_eq!(row["name"].as_text(), Some("Ann"));
        let (sql, params) = &mapper.backend.statements[0];
        assert_eq!(
            sql,
            "SELECT * FROM users WHERE id = ? AND deleted_at IS NULL"
        );
        assert_eq!(params, &[Value::Integer(1)]);
    }

    #[test]
    fn test_find_or_fail_miss() {
        let mut mapper = mapper_with(USER_COLUMNS, users());
        assert!(matches!(
            mapper.find_or_fail(9),
            Err(DbError::NotFound(9))
        ));
    }

    #[test]
    fn test_find_with_trashed_skips_filter() {
        let mut mapper = mapper_with(USER_COLUMNS, users());
        mapper.find_with_trashed(1).unwrap();
        assert_eq!(mapper.backend.sql(0), "SELECT * FROM users WHERE id = ?");
    }

    #[test]
    fn test_find_by_requires_columns() {
        let mut mapper = mapper_with(USER_COLUMNS, users());
        assert!(matches!(
            mapper.find_by(&[], &[]),
            Err(DbError::Configuration(_))
        ));
    }

    #[test]
    fn test_find_by_pads_missing_values_with_null() {
        let mut mapper = mapper_with(USER_COLUMNS, users());
        mapper
            .find_by(&["name", "email"], &[Value::from("Ann")])
            .unwrap();
        let (sql, params) = &mapper.backend.statements[0];
        assert_eq!(
            sql,
            "SELECT * FROM users WHERE name = ? AND email = ? AND deleted_at IS NULL"
        );
        assert_eq!(params, &[Value::from("Ann"), Value::Null]);
    }

    #[test]
    fn test_store_applies_timestamps_and_returns_id() {
        let mut mapper = mapper_with(USER_COLUMNS, users());
        mapper.backend.last_id = 7;
        let id = mapper
            .store(&[("name", Value::from("Ann")), ("email", Value::from("a@x"))])
            .unwrap();
        assert_eq!(id, 7);
        let (sql, params) = &mapper.backend.statements[0];
        assert_eq!(
            sql,
            "INSERT INTO users (name, email, created_at, updated_at) VALUES (?, ?, ?, ?)"
        );
        assert_eq!(params.len(), 4);
        assert_eq!(params[2], params[3]);
    }

    #[test]
    fn test_store_filters_non_fillable_fields() {
        let entity = EntityDef::new("users").with_fillable(["name"]);
        let mut mapper = mapper_with(&["id", "name"], entity);
        mapper
            .store(&[("name", Value::from("Ann")), ("role", Value::from("admin"))])
            .unwrap();
        assert_eq!(
            mapper.backend.sql(0),
            "INSERT INTO users (name) VALUES (?)"
        );
    }

    #[test]
    fn test_store_without_timestamp_columns_is_schema_policy_error() {
        let mut mapper = mapper_with(&["id", "name"], EntityDef::new("users").with_timestamps());
        let result = mapper.store(&[("name", Value::from("Ann"))]);
        assert!(matches!(result, Err(DbError::SchemaPolicy { .. })));
        assert!(mapper.backend.statements.is_empty());
    }

    #[test]
    fn test_update_bumps_updated_at_only() {
        let mut mapper = mapper_with(USER_COLUMNS, users());
        let affected = mapper.update(1, &[("email", Value::from("b@x"))]).unwrap();
        assert_eq!(affected, 1);
        let (sql, params) = &mapper.backend.statements[0];
        assert_eq!(
            sql,
            "UPDATE users SET email = ?, updated_at = ? WHERE id = ?"
        );
        assert_eq!(params.len(), 3);
        assert_eq!(params[2], Value::Integer(1));
    }

    #[test]
    fn test_delete_soft_marks_deleted_at() {
        let mut mapper = mapper_with(USER_COLUMNS, users());
        mapper.delete(1).unwrap();
        let (sql, params) = &mapper.backend.statements[0];
        assert_eq!(sql, "UPDATE users SET deleted_at = ? WHERE id = ?");
        assert!(matches!(params[0], Value::Text(_)));
        assert_eq!(params[1], Value::Integer(1));
    }

    #[test]
    fn test_delete_without_column_is_physical() {
        let mut mapper = mapper_with(&["id", "name"], EntityDef::new("users").with_soft_delete());
        mapper.delete(1).unwrap();
        assert_eq!(mapper.backend.sql(0), "DELETE FROM users WHERE id = ?");
    }

    #[test]
    fn test_join_keys_on_shared_column() {
        let mut mapper = mapper_with(USER_COLUMNS, users());
        mapper.join("profiles", "id").unwrap();
        assert_eq!(
            mapper.backend.sql(0),
            "SELECT * FROM users INNER JOIN profiles ON users.id = profiles.id"
        );
    }

    #[test]
    fn test_count_combines_soft_delete_and_conditions() {
        let mut mapper = mapper_with(USER_COLUMNS, users());
        let mut row = Record::new();
        row.push("count", Value::Integer(3));
        mapper.backend.push_rows(vec![row]);
        let count = mapper.count(&[("name", Value::from("Ann"))]).unwrap();
        assert_eq!(count, 3);
        let (sql, params) = &mapper.backend.statements[0];
        assert_eq!(
            sql,
            "SELECT COUNT(*) AS count FROM users WHERE deleted_at IS NULL AND name = ?"
        );
        assert_eq!(params, &[Value::from("Ann")]);
    }

    #[test]
    fn test_count_without_conditions_uses_plain_query() {
        let mut mapper = mapper_with(&["id"], EntityDef::new("users"));
        let mut row = Record::new();
        row.push("count", Value::Text("5".to_string()));
        mapper.backend.push_rows(vec![row]);
        assert_eq!(mapper.count(&[]).unwrap(), 5);
        assert_eq!(mapper.backend.sql(0), "SELECT COUNT(*) AS count FROM users");
    }

    #[test]
    fn test_save_updates_by_own_primary_key() {
        let mut mapper = mapper_with(USER_COLUMNS, users());
        let mut record = user_row(4, "Ann");
        record.push("email", Value::from("a@x"));
        mapper.save(&record).unwrap();
        let (sql, params) = &mapper.backend.statements[0];
        assert_eq!(
            sql,
            "UPDATE users SET name = ?, email = ?, updated_at = ? WHERE id = ?"
        );
        assert_eq!(params[3], Value::Integer(4));
    }

    #[test]
    fn test_save_requires_primary_key_value() {
        let mut mapper = mapper_with(USER_COLUMNS, users());
        let mut record = Record::new();
        record.push("name", Value::from("Ann"));
        assert!(matches!(
            mapper.save(&record),
            Err(DbError::Configuration(_))
        ));
    }
}
