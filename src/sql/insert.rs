/*!
 * INSERT statement parsing.
 *
 * Recognizes `INSERT INTO t (c1, ...) VALUES (...), (...)` and
 * `INSERT INTO t VALUES (...)`. Everything the parser cannot place is kept
 * as raw text so a statement can be rebuilt without losing content.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::literal::strip_identifier_quotes;
use super::splitter::dollar_tag_len;
use crate::errors::SeedError;

static INSERT_WITH_COLUMNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^INSERT\s+INTO\s+([^\s(]+)\s*\((.*?)\)\s*VALUES\s*(.*)$")
        .expect("valid insert regex")
});

static INSERT_WITHOUT_COLUMNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^INSERT\s+INTO\s+([^\s(]+)\s*VALUES\s*(.*)$").expect("valid insert regex")
});

/// A recognized INSERT statement, borrowing from the statement text
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInsert<'a> {
    /// Whitespace, comments and BOMs before the INSERT keyword
    pub leading: &'a str,
    /// Table token as written
    pub table: &'a str,
    /// Column names with identifier quoting removed, when a column list is present
    pub columns: Option<Vec<String>>,
    /// Row literals, each trimmed
    pub rows: Vec<Vec<&'a str>>,
    /// Text after the last value group (e.g. `ON CONFLICT DO NOTHING`)
    pub tail: &'a str,
    /// Whether the statement ended with `;`
    pub terminated: bool,
}

impl ParsedInsert<'_> {
    /// Table name with identifier quoting removed
    pub fn table_name(&self) -> String {
        strip_identifier_quotes(self.table)
    }
}

/// Parser for the two INSERT shapes
pub struct InsertParser;

impl InsertParser {
    /// Parse one statement as produced by the splitter
    pub fn parse(statement: &str) -> Result<ParsedInsert<'_>, SeedError> {
        let body_start = skip_trivia(statement);
        let leading = &statement[..body_start];
        let mut body = &statement[body_start..];

        let terminated = body.trim_end().ends_with(';');
        if terminated {
            let trimmed = body.trim_end();
            body = &trimmed[..trimmed.len() - 1];
        }

        let (table, columns, values) = if let Some(caps) = INSERT_WITH_COLUMNS.captures(body) {
            let (Some(table), Some(cols), Some(values)) = (caps.get(1), caps.get(2), caps.get(3)) else {
                return Err(SeedError::Parse(preview(statement)));
            };
            let columns = split_top_level(cols.as_str(), b',')
                .into_iter()
                .map(strip_identifier_quotes)
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>();
            (table.as_str(), Some(columns), values)
        } else if let Some(caps) = INSERT_WITHOUT_COLUMNS.captures(body) {
            let (Some(table), Some(values)) = (caps.get(1), caps.get(2)) else {
                return Err(SeedError::Parse(preview(statement)));
            };
            (table.as_str(), None, values)
        } else {
            return Err(SeedError::Parse(preview(statement)));
        };

        let segment = values.as_str();
        let groups = value_groups(segment);
        let Some(&(_, last_end)) = groups.last() else {
            return Err(SeedError::Parse(preview(statement)));
        };

        let rows = groups
            .iter()
            .map(|&(start, end)| split_top_level(&segment[start + 1..end - 1], b','))
            .collect();

        Ok(ParsedInsert {
            leading,
            table,
            columns,
            rows,
            tail: &segment[last_end..],
            terminated,
        })
    }
}

fn preview(statement: &str) -> String {
    let trimmed = statement.trim();
    match trimmed.char_indices().nth(60) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Byte offset of the first character after leading whitespace, BOMs and comments
fn skip_trivia(s: &str) -> usize {
    let mut rest = s;
    loop {
        let before = rest.len();
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
        if let Some(comment) = rest.strip_prefix("--") {
            rest = match comment.find('\n') {
                Some(pos) => &comment[pos + 1..],
                None => "",
            };
        } else if let Some(comment) = rest.strip_prefix("/*") {
            rest = match comment.find("*/") {
                Some(pos) => &comment[pos + 2..],
                None => "",
            };
        }
        if rest.len() == before {
            break;
        }
    }
    s.len() - rest.len()
}

/// If a quoted region starts at `i`, the index just past its end
fn skip_quoted(bytes: &[u8], i: usize) -> Option<usize> {
    match bytes[i] {
        quote @ (b'\'' | b'"') => {
            let mut j = i + 1;
            while j < bytes.len() {
                if bytes[j] == quote {
                    if bytes.get(j + 1) == Some(&quote) {
                        j += 2;
                        continue;
                    }
                    return Some(j + 1);
                }
                j += 1;
            }
            Some(bytes.len())
        }
        b'$' => {
            let len = dollar_tag_len(&bytes[i..])?;
            let tag = &bytes[i..i + len];
            let mut j = i + len;
            while j < bytes.len() {
                if bytes[j..].starts_with(tag) {
                    return Some(j + len);
                }
                j += 1;
            }
            Some(bytes.len())
        }
        _ => None,
    }
}

/// Byte ranges of the top-level parenthesized groups, parentheses included
fn value_groups(segment: &str) -> Vec<(usize, usize)> {
    let bytes = segment.as_bytes();
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(next) = skip_quoted(bytes, i) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'(' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            b')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    groups.push((start, i + 1));
                }
            }
            // The row list ends at the first clause word after a group, e.g. ON CONFLICT (id)
            b if depth == 0 && !groups.is_empty() && b != b',' && !b.is_ascii_whitespace() => break,
            _ => {}
        }
        i += 1;
    }
    groups
}

/// Split on `separator` outside quotes, parentheses and brackets; pieces are trimmed
pub(crate) fn split_top_level(s: &str, separator: u8) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(next) = skip_quoted(bytes, i) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b if b == separator && depth == 0 => {
                pieces.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    pieces.push(s[start..].trim());
    pieces
}
