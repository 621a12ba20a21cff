//! Error types for mapper and builder operations.
//!
//! Provides a unified error type covering configuration, connection,
//! statement preparation, execution, lookup, and schema-policy failures.
//! Adapter crates map their driver's native errors into this taxonomy,
//! carrying the driver's diagnostic text.

use thiserror::Error;

/// Errors that can occur during mapper or builder operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// A handle was misconfigured: empty table name, empty condition
    /// column list, or an unshaped builder sent to execute.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The backend connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The backend rejected statement preparation.
    #[error("error preparing statement: {0}")]
    Preparation(String),

    /// A well-formed statement failed at runtime. Carries the backend's
    /// native diagnostic text.
    #[error("error executing query: {0}")]
    Execution(String),

    /// A lookup that must produce a row found none.
    #[error("record not found with id: {0}")]
    NotFound(i64),

    /// An entity declares the timestamp capability but its table lacks
    /// the backing columns.
    #[error(
        "table '{table}' is missing 'created_at' or 'updated_at' columns but timestamps are enabled"
    )]
    SchemaPolicy { table: String },
}

/// Convenience alias for results with [`DbError`].
pub type Result<T> = std::result::Result<T, DbError>;
