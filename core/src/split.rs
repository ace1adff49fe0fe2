//! Splitting schema text into executable statements.
//!
//! The splitter is not a SQL parser. It scans for the `;` terminator while
//! skipping over quoted literals and identifiers (`'..'`, `".."`, `` `..` ``,
//! `[..]`), line comments (`-- ..`) and block comments (`/* .. */`). Inside a
//! `CREATE TRIGGER` statement the `BEGIN ... END` body is kept whole, since
//! trigger bodies always contain terminators of their own.

use std::iter::Peekable;
use std::str::Chars;

/// Splits `sql` into trimmed, non-empty statements without their terminator.
///
/// Comments preceding a statement are stripped; a chunk consisting only of
/// comments and whitespace is dropped.
///
/// # Examples
///
/// ```
/// use schema_sync_core::split_statements;
///
/// let sql = "-- users\nCREATE TABLE a (x);\n\n;CREATE INDEX a_x ON a(x);";
/// assert_eq!(
///     split_statements(sql),
///     vec!["CREATE TABLE a (x)", "CREATE INDEX a_x ON a(x)"]
/// );
/// ```
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut word = String::new();
    let mut scope = StatementScope::default();
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        if is_word_char(ch) {
            word.push(ch);
            current.push(ch);
            continue;
        }
        scope.observe(&word);
        word.clear();

        match ch {
            '\'' | '"' | '`' => {
                current.push(ch);
                consume_until(&mut chars, &mut current, ch);
            }
            '[' => {
                current.push(ch);
                consume_until(&mut chars, &mut current, ']');
            }
            '-' if chars.peek() == Some(&'-') => {
                current.push(ch);
                consume_until(&mut chars, &mut current, '\n');
            }
            '/' if chars.peek() == Some(&'*') => {
                current.push(ch);
                consume_block_comment(&mut chars, &mut current);
            }
            ';' if scope.depth == 0 => {
                push_statement(&mut statements, &current);
                current.clear();
                scope = StatementScope::default();
            }
            _ => current.push(ch),
        }
    }
    push_statement(&mut statements, &current);

    statements
}

/// Keyword tracking for the statement being accumulated.
#[derive(Debug, Default)]
struct StatementScope {
    /// Number of words seen so far, capped once the header is known.
    words: usize,
    /// Whether the statement began with `CREATE`.
    create: bool,
    /// Whether the statement is a `CREATE [TEMP] TRIGGER`.
    trigger: bool,
    /// Open `BEGIN`/`CASE` blocks inside a trigger body.
    depth: usize,
}

impl StatementScope {
    fn observe(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        self.words += 1;
        if self.words == 1 {
            self.create = word.eq_ignore_ascii_case("CREATE");
            return;
        }
        if self.create && self.words <= 3 && word.eq_ignore_ascii_case("TRIGGER") {
            self.trigger = true;
            return;
        }
        if !self.trigger {
            return;
        }
        if word.eq_ignore_ascii_case("BEGIN") || word.eq_ignore_ascii_case("CASE") {
            self.depth += 1;
        } else if word.eq_ignore_ascii_case("END") {
            self.depth = self.depth.saturating_sub(1);
        }
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Copies characters up to and including `end` (or to end of input).
fn consume_until(chars: &mut Peekable<Chars<'_>>, out: &mut String, end: char) {
    for ch in chars.by_ref() {
        out.push(ch);
        if ch == end {
            return;
        }
    }
}

fn consume_block_comment(chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    // The opening `*` must not double as the closing one in `/*/`.
    if let Some(star) = chars.next() {
        out.push(star);
    }
    let mut prev = '\0';
    for ch in chars.by_ref() {
        out.push(ch);
        if prev == '*' && ch == '/' {
            return;
        }
        prev = ch;
    }
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let statement = strip_leading_comments(raw).trim_end();
    if !statement.is_empty() {
        statements.push(statement.to_string());
    }
}

/// Removes whitespace and comments that precede the first SQL token.
pub(crate) fn strip_leading_comments(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return sql;
        }
    }
}
