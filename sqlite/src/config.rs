//! Connection settings for the embedded engine.

use std::env;
use std::path::{Path, PathBuf};

use craftdb_core::{DbError, Result};

/// Environment key naming the database file.
pub const ENV_SQLITE_FILE: &str = "DB_SQLITE_FILE";

/// Connection settings for the embedded engine: a single database file
/// path, opened read-write and created if absent.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    path: PathBuf,
}

impl SqliteConfig {
    /// Settings pointing at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the file path from the `DB_SQLITE_FILE` environment
    /// variable.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Configuration`] when the variable is unset.
    pub fn from_env() -> Result<Self> {
        let path = env::var(ENV_SQLITE_FILE)
            .map_err(|_| DbError::Configuration(format!("{ENV_SQLITE_FILE} is not set")))?;
        Ok(Self::new(path))
    }

    /// The database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
