//! Reading live schema objects from the engine catalog.

use rusqlite::Connection;
use schema_sync_core::{DdlObject, ObjectKind};
use tracing::debug;

use crate::error::{Result, StoreError};

const CATALOG_QUERY: &str = "SELECT type, name, sql FROM sqlite_master \
                             WHERE type IN ('table', 'index', 'trigger', 'view')";

/// Reads every table, index, trigger and view, excluding engine-internal
/// objects, sorted by kind priority then name.
///
/// The sort happens here rather than in SQL so the order does not depend on
/// the engine's collation or enumeration order.
pub(crate) fn read_objects(conn: &Connection) -> Result<Vec<DdlObject>> {
    let mut stmt = conn
        .prepare(CATALOG_QUERY)
        .map_err(StoreError::SchemaReadError)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })
        .map_err(StoreError::SchemaReadError)?;

    let mut objects = Vec::new();
    for row in rows {
        let (kind, name, sql) = row.map_err(StoreError::SchemaReadError)?;
        let Ok(kind) = kind.parse::<ObjectKind>() else {
            continue;
        };
        let object = DdlObject::new(kind, name, sql);
        if object.is_internal() {
            continue;
        }
        debug!(kind = %object.kind, name = %object.name, "Read catalog object");
        objects.push(object);
    }
    objects.sort();

    Ok(objects)
}
