//! Dual-backend persistence core: an Active-Record mapper and a fluent
//! query builder over interchangeable storage engines.
//!
//! This crate defines the engine-neutral half of craftdb:
//!
//! - [`Backend`] — the fixed primitive contract every engine adapter
//!   implements (execute, bound execute, row fetch, last-insert-id,
//!   schema introspection, native value escaping).
//! - [`EntityDef`] — per-entity static metadata: table, primary key,
//!   fillable set, and explicit soft-delete/timestamp capability flags.
//! - [`Mapper`] — Active-Record CRUD bound to an entity's table,
//!   implemented once against the backend contract with parameter
//!   binding throughout.
//! - [`QueryBuilder`] — chainable statement assembly with closed input
//!   variant types ([`Values`], [`Assignments`], [`Operator`],
//!   [`JoinKind`]), escaping values through the backend's native
//!   primitive.
//! - [`Record`] / [`Value`] — ordered result rows and the scalar values
//!   they carry.
//! - [`DbError`] — the unified error taxonomy shared by both access
//!   styles and both engines.
//!
//! Adapters for the concrete engines live in the `craftdb-sqlite`
//! (embedded file) and `craftdb-mysql` (network client/server) crates.
//!
//! # Two access styles, two escaping contracts
//!
//! The mapper binds every user-supplied value as a prepared-statement
//! parameter. The builder concatenates values into SQL text after
//! passing them through the backend's native string-escaping primitive
//! — a documented compatibility shim, not an equivalent guarantee. See
//! the [`QueryBuilder`] docs before routing untrusted input through it.
//!
//! # Example
//!
//! ```
//! use craftdb_core::{Backend, EntityDef, Mapper, Result, Value};
//!
//! fn newest_user_id<B: Backend>(backend: B) -> Result<i64> {
//!     let users = EntityDef::new("users")
//!         .with_fillable(["name", "email"])
//!         .with_soft_delete()
//!         .with_timestamps();
//!     let mut mapper = Mapper::new(backend, users)?;
//!     mapper.store(&[
//!         ("name", Value::from("Ann")),
//!         ("email", Value::from("a@x.com")),
//!     ])
//! }
//! ```

mod backend;
mod builder;
mod entity;
mod error;
mod mapper;
mod record;
mod value;

#[cfg(test)]
mod testing;

pub use backend::Backend;
pub use builder::{Assignments, Execution, JoinKind, Operator, QueryBuilder, QueryMode, Values};
pub use entity::{
    CREATED_AT_COLUMN, DELETED_AT_COLUMN, EntityDef, ID_COLUMN, UPDATED_AT_COLUMN,
};
pub use error::{DbError, Result};
pub use mapper::Mapper;
pub use record::Record;
pub use value::Value;
