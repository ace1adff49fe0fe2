//! Schema object model shared by the applier and the extractor.

use std::fmt;
use std::str::FromStr;

/// Name prefix the engine reserves for its own objects.
pub const RESERVED_PREFIX: &str = "sqlite_";

/// The kinds of schema objects managed by this crate.
///
/// Variant order is the kind priority used for canonical output:
/// tables first, then indexes, triggers and views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectKind {
    Table,
    Index,
    Trigger,
    View,
}

impl ObjectKind {
    /// All kinds in priority order.
    pub const ALL: [ObjectKind; 4] = [
        ObjectKind::Table,
        ObjectKind::Index,
        ObjectKind::Trigger,
        ObjectKind::View,
    ];

    /// Catalog spelling (`sqlite_master.type`).
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Table => "table",
            ObjectKind::Index => "index",
            ObjectKind::Trigger => "trigger",
            ObjectKind::View => "view",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a catalog type string is not one of the managed kinds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported object kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ObjectKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// One live schema object as reported by the catalog.
///
/// Ordering is kind priority, then name by ordinal (case-sensitive)
/// comparison, which is the canonical document order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DdlObject {
    pub kind: ObjectKind,
    pub name: String,
    /// Defining SQL; absent for implicitly created objects such as
    /// auto-indexes backing `UNIQUE` constraints.
    pub sql: Option<String>,
}

impl DdlObject {
    pub fn new(kind: ObjectKind, name: impl Into<String>, sql: Option<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            sql,
        }
    }

    /// Returns the definition if it holds any SQL.
    pub fn definition(&self) -> Option<&str> {
        self.sql.as_deref().map(str::trim).filter(|sql| !sql.is_empty())
    }

    /// Whether the name falls under the engine's reserved prefix.
    pub fn is_internal(&self) -> bool {
        is_reserved_name(&self.name)
    }
}

/// Whether `name` starts with [`RESERVED_PREFIX`], ignoring ASCII case.
pub fn is_reserved_name(name: &str) -> bool {
    name.get(..RESERVED_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(RESERVED_PREFIX))
}
