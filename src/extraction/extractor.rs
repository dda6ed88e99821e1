/*!
 * Occurrence extraction.
 *
 * Walks every recognized INSERT, decides per column whether the value is
 * translatable, and emits one `OccurrenceItem` per translatable scalar or
 * JSON-embedded string.
 */

use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use super::json_walk::{JsonTextRules, collect_strings, parse_json_value};
use super::key::{OccurrenceKey, RowIdentity};
use crate::profile::DomainProfile;
use crate::schema_model::SchemaModel;
use crate::sql::literal::{StringLiteral, is_likely_json};
use crate::sql::{InsertParser, ParsedInsert, StatementSplitter};

/// One translatable string found in the seed data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceItem {
    pub key: OccurrenceKey,
    pub row: RowIdentity,
    /// Source text, unescaped
    pub value: String,
}

impl OccurrenceItem {
    pub fn table(&self) -> &str {
        &self.key.table
    }

    pub fn column(&self) -> &str {
        &self.key.column
    }

    pub fn json_path(&self) -> Option<&str> {
        self.key.json_path.as_deref()
    }
}

/// Column layout of a parsed INSERT resolved against the schema and profile
#[derive(Debug, Clone)]
pub struct InsertLayout<'s> {
    /// Table name with identifier quoting removed
    pub table: String,
    /// Column names in value order
    pub columns: Vec<String>,
    translatable: Option<&'s BTreeSet<String>>,
    pk_indices: Option<Vec<usize>>,
}

impl<'s> InsertLayout<'s> {
    /// Resolve the layout; `None` when the statement has no column list and
    /// the schema declares no column order for the table
    pub fn resolve(parsed: &ParsedInsert<'_>, schema: &'s dyn SchemaModel) -> Option<Self> {
        let table = parsed.table_name();
        let columns = match &parsed.columns {
            Some(columns) => columns.clone(),
            None => schema.column_order(&table)?.to_vec(),
        };

        let primary_keys = schema.primary_keys(&table);
        let pk_indices = if primary_keys.is_empty() {
            None
        } else {
            primary_keys
                .iter()
                .map(|pk| columns.iter().position(|c| c.eq_ignore_ascii_case(pk)))
                .collect::<Option<Vec<_>>>()
        };

        Some(Self {
            translatable: schema.translatable_columns(&table),
            table,
            columns,
            pk_indices,
        })
    }

    /// Identity of a row, `ordinal` being its 1-based position in the statement
    pub fn row_identity(&self, row: &[&str], ordinal: usize) -> RowIdentity {
        RowIdentity::for_row(self.pk_indices.as_deref(), row, ordinal)
    }

    /// Whether rows of this statement are identified by position
    pub fn uses_ordinals(&self) -> bool {
        self.pk_indices.is_none()
    }

    /// Whether a column is translatable, by schema or by profile
    pub fn is_translatable(&self, column: &str, profile: &DomainProfile) -> bool {
        self.translatable.is_some_and(|cols| cols.contains(column)) || profile.is_forced(&self.table, column)
    }

    /// Whether the table has any translatable column
    pub fn has_translatable(&self, profile: &DomainProfile) -> bool {
        self.translatable.is_some_and(|cols| !cols.is_empty())
            || profile.force_include_columns.get(&self.table).is_some_and(|cols| !cols.is_empty())
    }
}

/// A column value split into the pieces extraction and reinjection care about
#[derive(Debug, Clone)]
pub enum ColumnValue {
    /// Not a string literal (number, NULL, expression)
    Opaque,
    /// A string literal that is not JSON
    Text(StringLiteral),
    /// A string literal holding a JSON document
    Json(StringLiteral, serde_json::Value),
}

impl ColumnValue {
    /// Classify a raw value token
    pub fn classify(raw: &str) -> Self {
        let Some(literal) = StringLiteral::parse(raw) else {
            return Self::Opaque;
        };
        if is_likely_json(&literal.text) {
            match parse_json_value(literal.text.trim()) {
                Ok(value) => return Self::Json(literal, value),
                Err(e) => debug!("Treating JSON-shaped literal as text: {}", e),
            }
        }
        Self::Text(literal)
    }
}

/// Extracts translatable occurrences from SQL text
pub struct ValueExtractor<'a> {
    schema: &'a dyn SchemaModel,
    profile: &'a DomainProfile,
}

impl<'a> ValueExtractor<'a> {
    pub fn new(schema: &'a dyn SchemaModel, profile: &'a DomainProfile) -> Self {
        Self { schema, profile }
    }

    /// Extract from a whole SQL file
    pub fn extract(&self, sql: &str) -> Vec<OccurrenceItem> {
        StatementSplitter::split(sql)
            .into_iter()
            .flat_map(|statement| self.extract_statement(statement))
            .collect()
    }

    /// Extract from one statement; non-INSERT statements yield nothing
    pub fn extract_statement(&self, statement: &str) -> Vec<OccurrenceItem> {
        let parsed = match InsertParser::parse(statement) {
            Ok(parsed) => parsed,
            Err(e) => {
                if !statement.trim().is_empty() {
                    debug!("Skipping statement: {}", e);
                }
                return Vec::new();
            }
        };

        let Some(layout) = InsertLayout::resolve(&parsed, self.schema) else {
            debug!("Skipping INSERT into '{}': no column list and no declared column order", parsed.table_name());
            return Vec::new();
        };
        if !layout.has_translatable(self.profile) {
            debug!("Skipping INSERT into '{}': no translatable columns", layout.table);
            return Vec::new();
        }
        if layout.uses_ordinals() {
            debug!("Rows of '{}' are identified by position", layout.table);
        }

        let mut items = Vec::new();
        for (index, row) in parsed.rows.iter().enumerate() {
            let row_id = layout.row_identity(row, index + 1);
            for (column, raw) in layout.columns.iter().zip(row.iter()) {
                if !layout.is_translatable(column, self.profile) {
                    continue;
                }
                self.extract_value(&layout, &row_id, column, raw, &mut items);
            }
        }
        items
    }

    fn extract_value(
        &self,
        layout: &InsertLayout<'_>,
        row_id: &RowIdentity,
        column: &str,
        raw: &str,
        items: &mut Vec<OccurrenceItem>,
    ) {
        match ColumnValue::classify(raw) {
            ColumnValue::Opaque => {}
            ColumnValue::Text(literal) => {
                if literal.text.is_empty() {
                    return;
                }
                items.push(OccurrenceItem {
                    key: OccurrenceKey::new(&layout.table, row_id, column, None),
                    row: row_id.clone(),
                    value: literal.text,
                });
            }
            ColumnValue::Json(_, mut document) => {
                let rules = self.json_rules(column);
                for (path, text) in collect_strings(&mut document, rules) {
                    items.push(OccurrenceItem {
                        key: OccurrenceKey::new(&layout.table, row_id, column, Some(&path)),
                        row: row_id.clone(),
                        value: text,
                    });
                }
            }
        }
    }

    /// JSON rules for a column
    pub fn json_rules(&self, column: &str) -> JsonTextRules<'a> {
        JsonTextRules {
            keys: &self.profile.json_string_keys,
            string_array: self.profile.string_array_columns.contains(column),
        }
    }
}
