//! Text-level building blocks for idempotent schema management.
//!
//! This crate has no database dependency. It provides:
//!
//! - [`ensure_if_not_exists`]: rewrites `CREATE TABLE|INDEX|TRIGGER|VIEW`
//!   directives to carry an `IF NOT EXISTS` guard.
//! - [`split_statements`]: splits schema text into executable statements.
//! - [`DdlObject`] / [`ObjectKind`]: catalog snapshot rows and their
//!   canonical ordering.
//! - [`CanonicalSchema`]: the guarded, ordered document produced by
//!   extraction.
//! - [`Config`]: explicit path configuration for every operation.
//!
//! # Example
//!
//! ```
//! use schema_sync_core::{ensure_if_not_exists, split_statements};
//!
//! let text = "CREATE TABLE users (id INTEGER PRIMARY KEY);\nCREATE INDEX users_id ON users(id);";
//! let statements = split_statements(&ensure_if_not_exists(text));
//! assert_eq!(
//!     statements,
//!     vec![
//!         "CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY)",
//!         "CREATE INDEX IF NOT EXISTS users_id ON users(id)",
//!     ]
//! );
//! ```

mod config;
mod document;
mod normalize;
mod object;
mod split;

pub use config::{Config, ConfigError, DB_PATH_ENV, DEFAULT_DB_PATH, DEFAULT_SCHEMA_PATH};
pub use document::{
    CanonicalSchema, FOREIGN_KEYS_PRAGMA, HEADER_MARKER, SAVED_AT_PREFIX, without_timestamp,
};
pub use normalize::{ensure_if_not_exists, needs_guard};
pub use object::{DdlObject, ObjectKind, RESERVED_PREFIX, UnknownKind, is_reserved_name};
pub use split::split_statements;
