/*!
 * Declarative per-locale override rules.
 *
 * A rule scopes itself to a table, a column and optionally a JSON path, and
 * carries one action. Rules never fail: a path or column that is not present
 * simply leaves the value untouched.
 *
 * Supported paths:
 * - `$` the whole value
 * - `$.a.b` members from the root
 * - `$..a.b` a member chain starting at any depth
 *
 * Member names compare by alias, so `currency_code`, `currencyCode` and
 * `currency-code` are the same member.
 */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::address::{AddressSeed, overwrite_address, pick_address};
use crate::sql::literal::strip_identifier_quotes;

/// Table or column scope matching everything
pub const WILDCARD: &str = "*";

fn wildcard() -> String {
    WILDCARD.to_string()
}

/// One override rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRule {
    #[serde(default = "wildcard")]
    pub table: String,

    #[serde(default = "wildcard")]
    pub column: String,

    /// JSON path inside the column value, `None` for plain columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_path: Option<String>,

    #[serde(flatten)]
    pub action: OverrideAction,
}

/// What a rule does to the value it matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideAction {
    /// Remap enumerated strings through a lookup table
    MapValues { map_values: BTreeMap<String, String> },

    /// Replace one array literal with another
    ReplaceArray {
        replace_array_value: Vec<Value>,
        new_array_value: Vec<Value>,
    },

    /// Rewrite an address object from the locale's address pool
    RandomAddress { random_address: bool },

    /// Set a fixed value
    SetValue { value: Value },
}

/// Everything a rule needs to know about the value it is applied to
#[derive(Debug, Clone, Copy)]
pub struct OverrideContext<'a> {
    pub locale: &'a str,
    pub table: &'a str,
    pub row_id: &'a str,
    pub column: &'a str,
    pub address_pool: &'a [Map<String, Value>],
}

/// Member name normalized for alias comparison
pub fn alias_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Enumerated value normalized for lookup (`Un-Shipped` matches `unshipped`)
pub fn normalize_enum(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// A parsed rule path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulePath {
    /// `$..` paths match starting at any depth
    pub deep: bool,
    /// Alias-normalized member names
    pub members: Vec<String>,
}

impl RulePath {
    /// Parse a rule path; `None` for unsupported syntax
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim();
        if path == "$" {
            return Some(Self { deep: false, members: Vec::new() });
        }

        let (deep, rest) = if let Some(rest) = path.strip_prefix("$..") {
            (true, rest)
        } else if let Some(rest) = path.strip_prefix("$.") {
            (false, rest)
        } else {
            return None;
        };

        let members: Vec<String> = rest.split('.').map(alias_key).collect();
        if members.iter().any(String::is_empty) {
            return None;
        }
        Some(Self { deep, members })
    }
}

impl OverrideRule {
    /// Whether the rule targets this table
    pub fn matches_table(&self, table: &str) -> bool {
        if self.table == WILDCARD {
            return true;
        }
        let wanted = strip_identifier_quotes(&self.table).to_lowercase();
        let actual = strip_identifier_quotes(table).to_lowercase();
        wanted == actual || actual.rsplit('.').next() == Some(wanted.as_str())
    }

    /// Whether the rule targets this column. A wildcard pathless rule only
    /// reaches columns that are translatable.
    pub fn matches_column(&self, column: &str, translatable: bool) -> bool {
        if self.column == WILDCARD {
            return self.json_path.is_some() || translatable;
        }
        self.column.eq_ignore_ascii_case(column)
    }

    /// Apply this rule to a parsed JSON value. Returns whether anything changed.
    pub fn apply_to_json(&self, root: &mut Value, ctx: &OverrideContext<'_>) -> bool {
        let path = match self.json_path.as_deref() {
            Some(p) => match RulePath::parse(p) {
                Some(path) => path,
                None => return false,
            },
            None => RulePath { deep: false, members: Vec::new() },
        };

        let mut apply = |node: &mut Value, field_path: &str| self.action.apply(node, ctx, field_path);
        if path.deep {
            visit_deep(root, &path.members, "$", &mut apply)
        } else {
            follow(root, &path.members, "$", &mut apply)
        }
    }

    /// Apply this rule to a plain string column; the whole value is the target.
    pub fn apply_to_scalar(&self, value: &mut Value, ctx: &OverrideContext<'_>) -> bool {
        if self.json_path.as_deref().is_some_and(|p| p.trim() != "$") {
            return false;
        }
        self.action.apply(value, ctx, "$")
    }
}

impl OverrideAction {
    fn apply(&self, node: &mut Value, ctx: &OverrideContext<'_>, field_path: &str) -> bool {
        match self {
            OverrideAction::SetValue { value } => replace_if_different(node, value),
            OverrideAction::MapValues { map_values } => {
                let Value::String(current) = node else {
                    return false;
                };
                let Some(mapped) = lookup_enum(map_values, current) else {
                    return false;
                };
                if mapped == current.as_str() {
                    return false;
                }
                *current = mapped.to_string();
                true
            }
            OverrideAction::ReplaceArray {
                replace_array_value,
                new_array_value,
            } => match node {
                Value::Array(items) if *items == *replace_array_value => {
                    *items = new_array_value.clone();
                    *items != *replace_array_value
                }
                _ => false,
            },
            OverrideAction::RandomAddress { random_address } => {
                if !random_address {
                    return false;
                }
                let Value::Object(target) = node else {
                    return false;
                };
                let scoped_path = format!("{}:{}", ctx.column, field_path);
                let seed = AddressSeed {
                    locale: ctx.locale,
                    table: ctx.table,
                    row_id: ctx.row_id,
                    field_path: &scoped_path,
                };
                match pick_address(ctx.address_pool, &seed) {
                    Some(replacement) => overwrite_address(target, replacement),
                    None => false,
                }
            }
        }
    }
}

fn replace_if_different(node: &mut Value, value: &Value) -> bool {
    if *node == *value {
        return false;
    }
    *node = value.clone();
    true
}

fn lookup_enum<'m>(map: &'m BTreeMap<String, String>, value: &str) -> Option<&'m str> {
    if let Some(exact) = map.get(value) {
        return Some(exact);
    }
    let wanted = normalize_enum(value);
    map.iter()
        .find(|(k, _)| normalize_enum(k) == wanted)
        .map(|(_, v)| v.as_str())
}

type NodeAction<'f> = dyn FnMut(&mut Value, &str) -> bool + 'f;

/// Follow `members` from `node`, applying `action` at the end of the chain
fn follow(node: &mut Value, members: &[String], node_path: &str, action: &mut NodeAction<'_>) -> bool {
    let Some((first, rest)) = members.split_first() else {
        return action(node, node_path);
    };
    let Value::Object(map) = node else {
        return false;
    };

    let mut changed = false;
    for (key, child) in map.iter_mut() {
        if alias_key(key) == *first {
            changed |= follow(child, rest, &format!("{}.{}", node_path, key), action);
        }
    }
    changed
}

/// Try the member chain at `node` and at every descendant
fn visit_deep(node: &mut Value, members: &[String], node_path: &str, action: &mut NodeAction<'_>) -> bool {
    let mut changed = follow(node, members, node_path, action);
    match node {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                changed |= visit_deep(child, members, &format!("{}.{}", node_path, key), action);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter_mut().enumerate() {
                changed |= visit_deep(child, members, &format!("{}[{}]", node_path, i), action);
            }
        }
        _ => {}
    }
    changed
}
