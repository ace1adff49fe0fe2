//! Canonical schema documents.
//!
//! A [`CanonicalSchema`] is the serialized form of a live schema: guarded
//! `CREATE` statements ordered by kind priority and name. Rendering prepends
//! a comment header carrying a tool marker and the save timestamp.
//!
//! ```text
//! -- schema.sql (auto-saved)
//! -- saved at: 2024-05-01T12:00:00.000000Z
//! PRAGMA foreign_keys = ON;
//!
//! CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY);
//!
//! ```

use chrono::{DateTime, Utc};

use crate::normalize::ensure_if_not_exists;
use crate::object::DdlObject;

/// First header line of every rendered document.
pub const HEADER_MARKER: &str = "-- schema.sql (auto-saved)";

/// Prefix of the header line holding the save timestamp.
pub const SAVED_AT_PREFIX: &str = "-- saved at: ";

/// Session pragma emitted after the header.
pub const FOREIGN_KEYS_PRAGMA: &str = "PRAGMA foreign_keys = ON;";

/// Ordered, guarded statements describing a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalSchema {
    statements: Vec<String>,
}

impl CanonicalSchema {
    /// Builds the canonical form of a set of catalog objects.
    ///
    /// Objects are sorted by kind priority then name; objects without a
    /// definition and engine-internal objects are skipped. Each definition
    /// is guarded with `IF NOT EXISTS` and terminated with `;`.
    pub fn from_objects(objects: impl IntoIterator<Item = DdlObject>) -> Self {
        let mut objects: Vec<DdlObject> = objects
            .into_iter()
            .filter(|object| !object.is_internal())
            .collect();
        objects.sort();

        let statements = objects
            .iter()
            .filter_map(DdlObject::definition)
            .map(|sql| format!("{};", ensure_if_not_exists(sql).trim()))
            .collect();

        Self { statements }
    }

    /// Statements in document order, each ending with `;`.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Renders the full document text with its header.
    pub fn render(&self, saved_at: DateTime<Utc>) -> String {
        let mut lines: Vec<String> = vec![
            HEADER_MARKER.to_string(),
            format!("{SAVED_AT_PREFIX}{}Z", saved_at.format("%Y-%m-%dT%H:%M:%S%.6f")),
            FOREIGN_KEYS_PRAGMA.to_string(),
            String::new(),
        ];
        for statement in &self.statements {
            lines.push(statement.clone());
            lines.push(String::new());
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Drops the save-timestamp header line so two renderings can be compared.
pub fn without_timestamp(document: &str) -> String {
    document
        .lines()
        .filter(|line| !line.starts_with(SAVED_AT_PREFIX))
        .collect::<Vec<_>>()
        .join("\n")
}
