//! Error types for schema store operations.
//!
//! One variant per failure class: loading schema text, executing a
//! statement, reading the catalog, writing the extracted document, and
//! seeding or clearing test data.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while applying, extracting or seeding a schema.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The schema source could not be read.
    #[error("failed to read schema '{path}': {source}")]
    SchemaLoadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine rejected a schema statement.
    #[error("statement failed: {source}\n  statement: {statement}")]
    StatementExecutionError {
        statement: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The catalog query failed.
    #[error("failed to read schema catalog: {0}")]
    SchemaReadError(#[source] rusqlite::Error),

    /// The extracted document could not be written.
    #[error("failed to write schema to '{path}': {source}")]
    SchemaWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Inserting or deleting test data failed.
    #[error("seed error: {0}")]
    SeedError(#[source] rusqlite::Error),

    /// The database's parent directory could not be created.
    #[error("failed to prepare storage location '{path}': {source}")]
    StorageError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Opening the database or managing the session failed.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
