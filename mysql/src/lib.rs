//! Network MySQL backend for craftdb.
//!
//! Implements the [`Backend`](craftdb_core::Backend) contract over a
//! synchronous [`mysql`] client connection. Schema introspection goes
//! through `DESCRIBE`, and the native escaping primitive follows the
//! server's `real_escape_string` semantics (backslash escaping).
//!
//! The connection targets the fixed conventional port 3306 and
//! initializes the session charset to `utf8mb4`.
//!
//! # Quick start
//!
//! ```no_run
//! use craftdb_core::{EntityDef, Mapper, Value};
//! use craftdb_mysql::{MysqlBackend, MysqlConfig};
//!
//! let config = MysqlConfig::new("localhost", "app", "app", "secret");
//! let backend = MysqlBackend::connect(&config).unwrap();
//! let users = EntityDef::new("users").with_soft_delete().with_timestamps();
//! let mut mapper = Mapper::new(backend, users).unwrap();
//!
//! let id = mapper.store(&[("name", Value::from("Ann"))]).unwrap();
//! println!("stored user {id}");
//! ```

mod backend;
mod codec;
mod config;

pub use backend::MysqlBackend;
pub use config::{DEFAULT_PORT, ENV_DB_HOST, ENV_DB_NAME, ENV_DB_PASS, ENV_DB_USER, MysqlConfig};
