/*!
 * SQL literal and identifier helpers.
 */

/// A single-quoted SQL string literal, optionally followed by a `::type` cast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    /// Unescaped text between the quotes
    pub text: String,
    /// Cast suffix including the leading `::`, kept verbatim
    pub cast: Option<String>,
}

impl StringLiteral {
    /// Parse a raw value token. Returns `None` for anything that is not a
    /// quoted string (numbers, NULL, function calls, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if !raw.starts_with('\'') {
            return None;
        }

        let bytes = raw.as_bytes();
        let mut i = 1;
        while i < bytes.len() {
            if bytes[i] == b'\'' {
                if bytes.get(i + 1) == Some(&b'\'') {
                    i += 2;
                    continue;
                }
                break;
            }
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }

        let inner = &raw[1..i];
        let rest = raw[i + 1..].trim();
        let cast = if rest.is_empty() {
            None
        } else if rest.starts_with("::") && is_cast_type(&rest[2..]) {
            Some(rest.to_string())
        } else {
            return None;
        };

        Some(Self {
            text: inner.replace("''", "'"),
            cast,
        })
    }

    /// Render `text` as a literal carrying this literal's cast
    pub fn render_with(&self, text: &str) -> String {
        match &self.cast {
            Some(cast) => format!("{}{}", quote_sql_string(text), cast),
            None => quote_sql_string(text),
        }
    }
}

fn is_cast_type(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '[' | ']' | '(' | ')' | ',' | '.' | '"'))
}

/// Quote text as a SQL string literal, doubling single quotes
pub fn quote_sql_string(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Value of a raw token with SQL quoting removed; non-string tokens are returned trimmed
pub fn unquote_value(raw: &str) -> String {
    match StringLiteral::parse(raw) {
        Some(literal) => literal.text,
        None => raw.trim().to_string(),
    }
}

/// Whether text looks like a JSON object or array
pub fn is_likely_json(text: &str) -> bool {
    let t = text.trim();
    (t.starts_with('{') && t.ends_with('}')) || (t.starts_with('[') && t.ends_with(']'))
}

/// Strip identifier quoting (`"x"`, `` `x` ``, `[x]`) from every dotted segment
pub fn strip_identifier_quotes(name: &str) -> String {
    name.trim()
        .split('.')
        .map(|segment| {
            segment
                .trim()
                .trim_matches('"')
                .trim_matches('`')
                .trim_start_matches('[')
                .trim_end_matches(']')
        })
        .collect::<Vec<_>>()
        .join(".")
}
