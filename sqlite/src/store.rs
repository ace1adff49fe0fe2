//! The schema store: one SQLite connection and the operations run on it.
//!
//! # Example
//!
//! ```no_run
//! use schema_sync_sqlite::SchemaStore;
//!
//! let mut store = SchemaStore::open("var/app.db").unwrap();
//!
//! // Safe to run any number of times.
//! store.apply_file("db/schema.sql").unwrap();
//!
//! // Write the live schema back out in canonical form.
//! store.extract_to("db/schema.sql", chrono::Utc::now()).unwrap();
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use rand::Rng;
use rusqlite::Connection;
use schema_sync_core::{CanonicalSchema, DdlObject};
use tracing::info;

use crate::apply::{execute_schema, load_schema};
use crate::catalog::read_objects;
use crate::error::{Result, StoreError};
use crate::seed::{self, ClearReport, SeedReport};

/// Applies, extracts and seeds a schema on a single SQLite connection.
///
/// Foreign-key enforcement is switched on for the session when the store is
/// created. All mutating operations run inside one transaction: either every
/// statement commits, or the transaction is dropped and nothing is kept.
pub struct SchemaStore {
    conn: Connection,
}

impl SchemaStore {
    /// Wraps an open connection and enables foreign-key enforcement.
    pub fn new(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Opens (creating if needed) the database file at `path`.
    ///
    /// The parent directory is created first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageError`] if the parent directory cannot
    /// be created, or [`StoreError::DatabaseError`] if the file cannot be
    /// opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::StorageError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Self::new(Connection::open(path)?)
    }

    /// Applies schema text idempotently.
    ///
    /// Every `CREATE TABLE|INDEX|TRIGGER|VIEW` is guarded with
    /// `IF NOT EXISTS`, the text is split into statements, and the
    /// statements run in order inside one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StatementExecutionError`] with the offending
    /// statement when the engine rejects one; nothing is committed then.
    pub fn apply(&mut self, schema_text: &str) -> Result<ApplyReport> {
        let tx = self.conn.transaction()?;
        let statements_executed = execute_schema(&tx, schema_text)?;
        tx.commit()?;

        info!(statements = statements_executed, "Schema applied");
        Ok(ApplyReport {
            statements_executed,
        })
    }

    /// Reads the schema document at `path` and [`apply`](Self::apply)s it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SchemaLoadError`] if the file cannot be read.
    pub fn apply_file(&mut self, path: impl AsRef<Path>) -> Result<ApplyReport> {
        let text = load_schema(path.as_ref())?;
        self.apply(&text)
    }

    /// Snapshot of the live tables, indexes, triggers and views in canonical
    /// order, excluding engine-internal objects.
    pub fn objects(&self) -> Result<Vec<DdlObject>> {
        read_objects(&self.conn)
    }

    /// Builds the canonical schema document from the live catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SchemaReadError`] if the catalog query fails.
    pub fn extract(&self) -> Result<CanonicalSchema> {
        let schema = CanonicalSchema::from_objects(self.objects()?);
        info!(statements = schema.len(), "Schema extracted");
        Ok(schema)
    }

    /// Extracts the schema and writes the rendered document to `path` in a
    /// single write, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SchemaReadError`] if the catalog query fails,
    /// or [`StoreError::SchemaWriteError`] if the file cannot be written.
    pub fn extract_to(
        &self,
        path: impl AsRef<Path>,
        saved_at: DateTime<Utc>,
    ) -> Result<CanonicalSchema> {
        let path = path.as_ref();
        let schema = self.extract()?;
        let document = schema.render(saved_at);

        let write_error = |source: std::io::Error| StoreError::SchemaWriteError {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, document).map_err(write_error)?;

        Ok(schema)
    }

    /// Inserts the fixed test dataset, skipping rows that already exist.
    ///
    /// Task states, captions and retry times are drawn from `rng`; timestamps
    /// are relative to `now`. Requires the schema to be applied.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SeedError`] if any insert fails.
    pub fn seed<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) -> Result<SeedReport> {
        let tx = self.conn.transaction().map_err(StoreError::SeedError)?;
        let report = seed::insert_fixtures(&tx, rng, now).map_err(StoreError::SeedError)?;
        tx.commit().map_err(StoreError::SeedError)?;

        info!(
            users = report.users,
            products = report.products,
            photos = report.photos,
            tasks = report.tasks,
            "Test data inserted"
        );
        Ok(report)
    }

    /// Deletes the rows [`seed`](Self::seed) can insert, by natural key.
    ///
    /// Photos and tasks of the deleted users are removed by cascade.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SeedError`] if any delete fails.
    pub fn clear(&mut self) -> Result<ClearReport> {
        let tx = self.conn.transaction().map_err(StoreError::SeedError)?;
        let report = seed::delete_fixtures(&tx).map_err(StoreError::SeedError)?;
        tx.commit().map_err(StoreError::SeedError)?;

        info!(
            users = report.users,
            products = report.products,
            "Test data cleared"
        );
        Ok(report)
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the store and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

/// Outcome of [`SchemaStore::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyReport {
    /// Number of statements executed.
    pub statements_executed: usize,
}
