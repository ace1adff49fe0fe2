//! Existence-guard normalization for DDL text.
//!
//! Rewrites `CREATE TABLE|INDEX|TRIGGER|VIEW <name>` into
//! `CREATE <KIND> IF NOT EXISTS <name>` so a schema document can be executed
//! against a database that already contains its objects.
//!
//! # Examples
//!
//! ```
//! use schema_sync_core::ensure_if_not_exists;
//!
//! let sql = "create table users (id INTEGER PRIMARY KEY);";
//! assert_eq!(
//!     ensure_if_not_exists(sql),
//!     "CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY);"
//! );
//!
//! // Already guarded text is left alone.
//! let guarded = "CREATE VIEW IF NOT EXISTS v AS SELECT 1;";
//! assert_eq!(ensure_if_not_exists(guarded), guarded);
//! ```

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Matches a creation directive for one of the supported kinds.
///
/// The `regex` crate has no lookahead, so the guard is captured as an
/// optional group instead and matches carrying it are returned verbatim.
static CREATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bCREATE\s+(?:(?P<modifier>UNIQUE|TEMP|TEMPORARY)\s+)?(?P<kind>TABLE|INDEX|TRIGGER|VIEW)\s+(?P<guard>IF\s+NOT\s+EXISTS\b)?",
    )
    .expect("static regex must compile")
});

/// Adds `IF NOT EXISTS` to every unguarded creation directive in `sql`.
///
/// Keyword matching is case-insensitive. Rewritten directives use canonical
/// upper-case keywords separated by single spaces; the `UNIQUE` modifier of
/// an index and the `TEMP`/`TEMPORARY` modifier of tables, views and triggers
/// are kept. Directives for other object kinds (`CREATE VIRTUAL TABLE`, ...)
/// and directives that already carry the guard are returned verbatim.
///
/// Returns the input borrowed when nothing needed rewriting.
///
/// # Limitations
///
/// `CREATE VIRTUAL TABLE` has no guarded form here, so a document holding one
/// (for example an FTS5 table) applies once but fails on a database that
/// already has it. Extracted documents also list the module's shadow tables
/// (`docs_config`, `docs_data`, ...) as plain tables.
pub fn ensure_if_not_exists(sql: &str) -> Cow<'_, str> {
    let mut rewritten = false;
    let out = CREATE_RE.replace_all(sql, |caps: &Captures<'_>| {
        if caps.name("guard").is_some() {
            return caps[0].to_string();
        }
        rewritten = true;
        let kind = caps["kind"].to_ascii_uppercase();
        match caps.name("modifier") {
            Some(modifier) => format!(
                "CREATE {} {kind} IF NOT EXISTS ",
                modifier.as_str().to_ascii_uppercase()
            ),
            None => format!("CREATE {kind} IF NOT EXISTS "),
        }
    });

    if rewritten { out } else { Cow::Borrowed(sql) }
}

/// Returns `true` when `sql` contains a creation directive lacking the guard.
pub fn needs_guard(sql: &str) -> bool {
    CREATE_RE
        .captures_iter(sql)
        .any(|caps| caps.name("guard").is_none())
}
