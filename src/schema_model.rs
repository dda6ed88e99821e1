/*!
 * Table metadata used to decide what gets translated.
 *
 * The engine only needs three facts per table: which columns hold
 * translatable text, which columns form the primary key, and the declared
 * column order (to map column-less INSERTs). `SchemaModel` is the seam;
 * `JsonSchemaModel` reads them from a schema export file.
 */

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::SeedError;
use crate::sql::literal::strip_identifier_quotes;

/// Source of per-table metadata
pub trait SchemaModel: Send + Sync {
    /// Translatable columns of a table, `None` when the table has none
    fn translatable_columns(&self, table: &str) -> Option<&BTreeSet<String>>;

    /// Primary key columns of a table, empty when unknown
    fn primary_keys(&self, table: &str) -> &[String];

    /// Declared column order of a table
    fn column_order(&self, table: &str) -> Option<&[String]>;
}

/// Column-name and type rules for picking translatable columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaHints {
    /// Column names never translated (compared case-insensitively)
    #[serde(default = "default_exact_skip_names")]
    pub exact_skip_names: BTreeSet<String>,

    /// Column-name suffixes never translated
    #[serde(default = "default_suffix_skip_names")]
    pub suffix_skip_names: BTreeSet<String>,

    /// Column types holding text
    #[serde(default = "default_text_types")]
    pub text_types: BTreeSet<String>,
}

impl Default for SchemaHints {
    fn default() -> Self {
        Self {
            exact_skip_names: default_exact_skip_names(),
            suffix_skip_names: default_suffix_skip_names(),
            text_types: default_text_types(),
        }
    }
}

fn string_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_exact_skip_names() -> BTreeSet<String> {
    string_set(&[
        "id", "uuid", "created_at", "updated_at", "deleted_at", "email", "username",
        "user_id", "order_id", "sku", "marketplace_id", "marketplace_ids",
    ])
}

fn default_suffix_skip_names() -> BTreeSet<String> {
    string_set(&["_id", "_ids", "_hash", "_sha", "_md5"])
}

fn default_text_types() -> BTreeSet<String> {
    string_set(&[
        "TEXT", "VARCHAR", "NVARCHAR", "CHAR", "CLOB", "JSON", "JSONB", "CHARACTER VARYING",
    ])
}

impl SchemaHints {
    /// Whether a column with this name and declared type should be translated
    pub fn is_translatable(&self, column: &str, column_type: &str) -> bool {
        let name = column.to_lowercase();
        if self.exact_skip_names.iter().any(|s| s.to_lowercase() == name) {
            return false;
        }
        if self
            .suffix_skip_names
            .iter()
            .any(|suffix| name.ends_with(&suffix.to_lowercase()))
        {
            return false;
        }

        // VARCHAR(255) -> VARCHAR
        let base_type = column_type
            .split('(')
            .next()
            .unwrap_or_default()
            .trim()
            .to_uppercase();
        self.text_types.iter().any(|t| t.to_uppercase() == base_type)
    }
}

/// Metadata for a single table
#[derive(Debug, Clone, Default)]
pub struct TableSchema {
    /// Declared column order
    pub columns: Vec<String>,
    /// Columns holding translatable text
    pub translatable: BTreeSet<String>,
    /// Primary key columns
    pub primary_keys: Vec<String>,
}

/// Schema model loaded from a JSON schema export
///
/// Accepted layout: `{"server_name": ..., "complete_schema": {"tables": {
/// "<table>": {"columns": {"<col>": {"type": "TEXT"}}, "primary_keys": [..]}}}}`.
/// A bare `{"tables": {...}}` document is accepted too.
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaModel {
    /// Server name declared in the export, used for profile detection
    pub server_name: String,
    tables: BTreeMap<String, TableSchema>,
    lowercase_index: HashMap<String, String>,
}

impl JsonSchemaModel {
    /// Load a schema file
    pub fn load<P: AsRef<Path>>(
        path: P,
        hints: &SchemaHints,
        force_include: &BTreeMap<String, BTreeSet<String>>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file: {:?}", path))?;
        let document: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse schema file: {:?}", path))?;
        Ok(Self::from_value(&document, hints, force_include)?)
    }

    /// Build from an already parsed schema document
    pub fn from_value(
        document: &Value,
        hints: &SchemaHints,
        force_include: &BTreeMap<String, BTreeSet<String>>,
    ) -> Result<Self, SeedError> {
        let server_name = document
            .get("server_name")
            .or_else(|| document.get("mcp_server"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let tables_value = document
            .get("complete_schema")
            .and_then(|s| s.get("tables"))
            .or_else(|| document.get("tables"))
            .and_then(Value::as_object)
            .ok_or_else(|| SeedError::Schema("no tables object found".to_string()))?;

        let mut tables = BTreeMap::new();
        for (table_name, table_info) in tables_value {
            let forced = force_include.get(table_name);
            let mut schema = TableSchema::default();

            if let Some(columns) = table_info.get("columns").and_then(Value::as_object) {
                for (column, info) in columns {
                    schema.columns.push(column.clone());
                    let column_type = info.get("type").and_then(Value::as_str).unwrap_or_default();
                    let is_forced = forced.is_some_and(|f| f.contains(column));
                    if is_forced || hints.is_translatable(column, column_type) {
                        schema.translatable.insert(column.clone());
                    }
                }
            }

            if let Some(keys) = table_info.get("primary_keys").and_then(Value::as_array) {
                schema.primary_keys = keys
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect();
            }

            debug!(
                "Schema table '{}': {} columns, {} translatable, pk {:?}",
                table_name,
                schema.columns.len(),
                schema.translatable.len(),
                schema.primary_keys
            );
            tables.insert(table_name.clone(), schema);
        }

        let lowercase_index = tables
            .keys()
            .map(|name| (name.to_lowercase(), name.clone()))
            .collect();

        Ok(Self {
            server_name,
            tables,
            lowercase_index,
        })
    }

    /// Names of all tables in the schema
    pub fn table_names(&self) -> impl Iterator<Item = &str> + Clone {
        self.tables.keys().map(String::as_str)
    }

    /// Number of tables with at least one translatable column
    pub fn translatable_table_count(&self) -> usize {
        self.tables.values().filter(|t| !t.translatable.is_empty()).count()
    }

    /// Resolve a table reference (`items`, `"Items"`, `public.items`) to its schema
    pub fn table(&self, table: &str) -> Option<&TableSchema> {
        let name = strip_identifier_quotes(table);
        if let Some(schema) = self.tables.get(&name) {
            return Some(schema);
        }
        let unqualified = name.rsplit('.').next().unwrap_or(name.as_str());
        self.tables.get(unqualified).or_else(|| {
            self.lowercase_index
                .get(&unqualified.to_lowercase())
                .and_then(|canonical| self.tables.get(canonical))
        })
    }
}

impl SchemaModel for JsonSchemaModel {
    fn translatable_columns(&self, table: &str) -> Option<&BTreeSet<String>> {
        self.table(table)
            .map(|t| &t.translatable)
            .filter(|cols| !cols.is_empty())
    }

    fn primary_keys(&self, table: &str) -> &[String] {
        self.table(table).map(|t| t.primary_keys.as_slice()).unwrap_or(&[])
    }

    fn column_order(&self, table: &str) -> Option<&[String]> {
        self.table(table)
            .map(|t| t.columns.as_slice())
            .filter(|cols| !cols.is_empty())
    }
}
