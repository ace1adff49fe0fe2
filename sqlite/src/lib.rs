//! SQLite backend for idempotent schema management.
//!
//! [`SchemaStore`] owns one connection and runs the four operations of the
//! tool against it:
//!
//! - **apply**: guard every `CREATE` with `IF NOT EXISTS`, split the text
//!   into statements and execute them in one transaction. Re-applying the
//!   same text is a no-op.
//! - **extract**: read tables, indexes, triggers and views from
//!   `sqlite_master`, order them by kind then name, re-guard them and render
//!   a [`CanonicalSchema`](schema_sync_core::CanonicalSchema) document.
//!   Applying that document to an empty database reproduces the schema.
//! - **seed** / **clear**: insert or remove a fixed synthetic dataset keyed
//!   by natural keys.
//!
//! # Quick start
//!
//! ```no_run
//! use schema_sync_sqlite::SchemaStore;
//! use rand::SeedableRng;
//!
//! let mut store = SchemaStore::open("app.db").unwrap();
//! store.apply_file("db/schema.sql").unwrap();
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let report = store.seed(&mut rng, chrono::Utc::now()).unwrap();
//! println!("{} users seeded", report.users);
//!
//! let schema = store.extract().unwrap();
//! for statement in schema.statements() {
//!     println!("{statement}");
//! }
//! ```

mod apply;
mod catalog;
mod error;
pub mod seed;
mod store;

pub use apply::load_schema;
pub use error::{Result, StoreError};
pub use seed::{ClearReport, SeedReport};
pub use store::{ApplyReport, SchemaStore};
