/*!
 * Translatable strings inside JSON column values.
 *
 * Paths are built while descending: `$.member` for object members and
 * `[i]` for array elements. The same walk runs during extraction (to read
 * strings) and reinjection (to replace them), so paths always agree.
 */

use std::collections::BTreeSet;

use serde_json::Value;

use crate::errors::SeedError;

/// Which strings of a JSON document are translatable
#[derive(Debug, Clone, Copy)]
pub struct JsonTextRules<'a> {
    /// Member names whose string values are translated
    pub keys: &'a BTreeSet<String>,
    /// Whether a root array of plain strings is translated element-wise
    pub string_array: bool,
}

/// Visit every translatable string, passing its path and a mutable handle
pub fn walk_strings(root: &mut Value, rules: JsonTextRules<'_>, visit: &mut dyn FnMut(&str, &mut String)) {
    if rules.string_array {
        if let Value::Array(items) = root {
            if !items.is_empty() && items.iter().all(Value::is_string) {
                for (i, item) in items.iter_mut().enumerate() {
                    if let Value::String(text) = item {
                        visit(&format!("$[{}]", i), text);
                    }
                }
                return;
            }
        }
    }
    walk_node(root, "$", rules.keys, visit);
}

fn walk_node(node: &mut Value, path: &str, keys: &BTreeSet<String>, visit: &mut dyn FnMut(&str, &mut String)) {
    match node {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                let child_path = format!("{}.{}", path, key);
                match child {
                    Value::String(text) if keys.contains(key) => visit(&child_path, text),
                    other => walk_node(other, &child_path, keys, visit),
                }
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter_mut().enumerate() {
                walk_node(child, &format!("{}[{}]", path, i), keys, visit);
            }
        }
        _ => {}
    }
}

/// Translatable strings of `root` as `(path, text)`, skipping empty strings
pub fn collect_strings(root: &mut Value, rules: JsonTextRules<'_>) -> Vec<(String, String)> {
    let mut found = Vec::new();
    walk_strings(root, rules, &mut |path, text| {
        if !text.is_empty() {
            found.push((path.to_string(), text.clone()));
        }
    });
    found
}

/// Parse a JSON-shaped literal, falling back to a lenient reading that
/// accepts `True`/`False`/`None` and single-quoted strings
pub fn parse_json_value(text: &str) -> Result<Value, SeedError> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(strict_error) => literal_to_json(text)
            .and_then(|converted| serde_json::from_str(&converted).ok())
            .ok_or_else(|| SeedError::JsonDecode(strict_error.to_string())),
    }
}

/// Rewrite literal syntax into JSON; `None` for unterminated strings
fn literal_to_json(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                out.push('"');
                loop {
                    let c = chars.next()?;
                    out.push(c);
                    match c {
                        '\\' => out.push(chars.next()?),
                        '"' => break,
                        _ => {}
                    }
                }
            }
            '\'' => {
                out.push('"');
                loop {
                    match chars.next()? {
                        '\\' => match chars.next()? {
                            '\'' => out.push('\''),
                            escaped => {
                                out.push('\\');
                                out.push(escaped);
                            }
                        },
                        '"' => out.push_str("\\\""),
                        '\'' => break,
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !next.is_ascii_alphanumeric() && next != '_' {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                out.push_str(match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" => "null",
                    other => other,
                });
            }
            other => out.push(other),
        }
    }
    Some(out)
}
