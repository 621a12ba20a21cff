//! Entity descriptors for Active-Record mapping.
//!
//! An [`EntityDef`] declares the static metadata of a mapped type once:
//! table name, primary-key column, fillable field set, and the
//! soft-delete/timestamp capability flags. Capabilities are explicit
//! booleans resolved at declaration time, never inferred at call time.
//! The descriptor is immutable after construction.

/// Fixed primary-key column convention.
pub const ID_COLUMN: &str = "id";

/// Fixed soft-delete marker column convention.
pub const DELETED_AT_COLUMN: &str = "deleted_at";

/// Fixed creation-timestamp column convention.
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Fixed update-timestamp column convention.
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// Static metadata for one mapped entity type.
///
/// # Examples
///
/// ```
/// use craftdb_core::EntityDef;
///
/// let users = EntityDef::new("users")
///     .with_fillable(["name", "email"])
///     .with_soft_delete()
///     .with_timestamps();
///
/// assert_eq!(users.table(), "users");
/// assert_eq!(users.primary_key(), "id");
/// assert!(users.soft_delete());
/// ```
#[derive(Debug, Clone)]
pub struct EntityDef {
    table: String,
    primary_key: String,
    fillable: Vec<String>,
    soft_delete: bool,
    timestamps: bool,
}

impl EntityDef {
    /// Declares an entity mapped to `table`, with the conventional `id`
    /// primary key, no fillable restriction, and no capabilities.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: ID_COLUMN.to_string(),
            fillable: Vec::new(),
            soft_delete: false,
            timestamps: false,
        }
    }

    /// Restricts mass assignment to the given fields.
    ///
    /// An empty fillable set (the default) admits every field.
    pub fn with_fillable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fillable = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the soft-delete capability.
    ///
    /// Soft deletion only becomes active when the backing `deleted_at`
    /// column is also present in the live schema.
    pub fn with_soft_delete(mut self) -> Self {
        self.soft_delete = true;
        self
    }

    /// Declares the timestamp capability.
    ///
    /// The table must carry `created_at` and `updated_at` columns; the
    /// first write through a mapper verifies this.
    pub fn with_timestamps(mut self) -> Self {
        self.timestamps = true;
        self
    }

    /// Table name this entity maps to.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Primary-key column name.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Fields admitted for mass assignment (empty = all).
    pub fn fillable(&self) -> &[String] {
        &self.fillable
    }

    /// Whether the soft-delete capability is declared.
    pub fn soft_delete(&self) -> bool {
        self.soft_delete
    }

    /// Whether the timestamp capability is declared.
    pub fn timestamps(&self) -> bool {
        self.timestamps
    }

    pub(crate) fn is_fillable(&self, column: &str) -> bool {
        self.fillable.is_empty() || self.fillable.iter().any(|f| f == column)
    }
}
