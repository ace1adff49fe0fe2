//! Idempotent execution of schema text.

use std::path::Path;

use rusqlite::Transaction;
use schema_sync_core::{ensure_if_not_exists, split_statements};
use tracing::debug;

use crate::error::{Result, StoreError};

/// Reads a schema document as UTF-8 text.
///
/// # Errors
///
/// Returns [`StoreError::SchemaLoadError`] if the file cannot be read.
pub fn load_schema(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| StoreError::SchemaLoadError {
        path: path.to_path_buf(),
        source,
    })
}

/// Normalizes, splits and executes `schema_text` within `tx`.
///
/// Returns the number of statements executed. Stops at the first failing
/// statement; the caller drops the transaction without committing.
pub(crate) fn execute_schema(tx: &Transaction<'_>, schema_text: &str) -> Result<usize> {
    let normalized = ensure_if_not_exists(schema_text);
    let statements = split_statements(&normalized);

    for statement in &statements {
        debug!(statement = %first_line(statement), "Executing schema statement");
        // execute_batch tolerates statements that return rows, e.g. PRAGMAs.
        tx.execute_batch(statement)
            .map_err(|source| StoreError::StatementExecutionError {
                statement: statement.clone(),
                source,
            })?;
    }

    Ok(statements.len())
}

fn first_line(statement: &str) -> &str {
    statement.lines().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::*;

    fn table_count(conn: &Connection, name: &str) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_execute_schema_guards_unguarded_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        for _ in 0..2 {
            let tx = conn.transaction().unwrap();
            let executed =
                execute_schema(&tx, "CREATE TABLE users (id INTEGER PRIMARY KEY);").unwrap();
            assert_eq!(executed, 1);
            tx.commit().unwrap();
        }
        assert_eq!(table_count(&conn, "users"), 1);
    }

    #[test]
    fn test_execute_schema_reports_offending_statement() {
        let mut conn = Connection::open_in_memory().unwrap();
        let tx = conn.transaction().unwrap();
        let err = execute_schema(&tx, "CREATE TABLE a (x);\nCREATE TABEL b (y);").unwrap_err();
        match err {
            StoreError::StatementExecutionError { statement, .. } => {
                assert_eq!(statement, "CREATE TABEL b (y)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_schema_missing_file() {
        let err = load_schema(Path::new("/nonexistent/schema.sql")).unwrap_err();
        assert!(matches!(err, StoreError::SchemaLoadError { .. }));
    }
}
