//! Embedded-file SQLite backend for craftdb.
//!
//! Implements the [`Backend`](craftdb_core::Backend) contract over a
//! [`rusqlite`] connection. The database lives in a single file, opened
//! read-write and created if absent; schema introspection goes through
//! `PRAGMA table_info`, and the native escaping primitive is SQLite's
//! quote-doubling.
//!
//! # Quick start
//!
//! ```no_run
//! use craftdb_core::{EntityDef, Mapper, Value};
//! use craftdb_sqlite::{SqliteBackend, SqliteConfig};
//!
//! let backend = SqliteBackend::connect(&SqliteConfig::new("app.db")).unwrap();
//! let users = EntityDef::new("users").with_soft_delete().with_timestamps();
//! let mut mapper = Mapper::new(backend, users).unwrap();
//!
//! let id = mapper.store(&[("name", Value::from("Ann"))]).unwrap();
//! println!("stored user {id}");
//! ```

mod backend;
mod codec;
mod config;

pub use backend::SqliteBackend;
pub use config::{ENV_SQLITE_FILE, SqliteConfig};
