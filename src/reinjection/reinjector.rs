/*!
 * Writes translations and overrides back into SQL text.
 *
 * Statements are split and parsed again, and every row and column gets the
 * same identity the extractor gave it. A statement is rebuilt only when one
 * of its values actually changed; everything else is copied verbatim.
 */

use std::borrow::Cow;
use std::collections::HashMap;

use log::debug;
use serde_json::{Map, Value};

use super::overrides::{OverrideContext, OverrideRule, WILDCARD};
use crate::extraction::json_walk::walk_strings;
use crate::extraction::{ColumnValue, InsertLayout, OccurrenceKey, RowIdentity, ValueExtractor};
use crate::profile::DomainProfile;
use crate::schema_model::SchemaModel;
use crate::sql::{InsertParser, ParsedInsert, StatementSplitter, StringLiteral};

/// Rendered occurrence key to final (unlocked) text
pub type TranslationMap = HashMap<String, String>;

/// Counters of one reinjection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReinjectionStats {
    pub statements: usize,
    pub statements_rewritten: usize,
    pub values_translated: usize,
    pub overrides_applied: usize,
}

/// Reinjected SQL plus counters
#[derive(Debug, Clone)]
pub struct ReinjectionOutput {
    pub sql: String,
    pub stats: ReinjectionStats,
}

/// Rewrites seed SQL for one locale
pub struct Reinjector<'a> {
    schema: &'a dyn SchemaModel,
    profile: &'a DomainProfile,
    locale: &'a str,
    rules: &'a [OverrideRule],
    address_pool: &'a [Map<String, Value>],
}

/// Where a value sits, for key construction and rule matching
struct Cell<'c> {
    table: &'c str,
    row: &'c RowIdentity,
    row_id: &'c str,
    column: &'c str,
    translatable: bool,
}

impl<'a> Reinjector<'a> {
    /// Reinjector using the profile's rules and address pool for `locale`
    pub fn new(schema: &'a dyn SchemaModel, profile: &'a DomainProfile, locale: &'a str) -> Self {
        Self {
            schema,
            profile,
            locale,
            rules: profile.overrides_for(locale),
            address_pool: profile.address_pool_for(locale),
        }
    }

    /// Use these rules instead of the profile's
    pub fn with_rules(mut self, rules: &'a [OverrideRule]) -> Self {
        self.rules = rules;
        self
    }

    /// Rewrite a whole SQL text
    pub fn reinject(&self, sql: &str, translations: &TranslationMap) -> ReinjectionOutput {
        let mut stats = ReinjectionStats::default();
        let mut out = String::with_capacity(sql.len());
        for statement in StatementSplitter::split(sql) {
            out.push_str(&self.reinject_statement(statement, translations, &mut stats));
        }
        ReinjectionOutput { sql: out, stats }
    }

    /// Rewrite one statement; unchanged statements are returned borrowed
    pub fn reinject_statement<'s>(
        &self,
        statement: &'s str,
        translations: &TranslationMap,
        stats: &mut ReinjectionStats,
    ) -> Cow<'s, str> {
        let parsed = match InsertParser::parse(statement) {
            Ok(parsed) => parsed,
            Err(_) => return Cow::Borrowed(statement),
        };
        stats.statements += 1;

        let Some(layout) = InsertLayout::resolve(&parsed, self.schema) else {
            return Cow::Borrowed(statement);
        };

        let extractor = ValueExtractor::new(self.schema, self.profile);
        let mut changed = false;
        let mut rows: Vec<Vec<Cow<'s, str>>> = Vec::with_capacity(parsed.rows.len());

        for (index, row) in parsed.rows.iter().enumerate() {
            let row_identity = layout.row_identity(row, index + 1);
            let row_id = row_identity.to_string();
            let mut values = Vec::with_capacity(row.len());

            for (position, raw) in row.iter().enumerate() {
                let Some(column) = layout.columns.get(position) else {
                    values.push(Cow::Borrowed(*raw));
                    continue;
                };
                let cell = Cell {
                    table: &layout.table,
                    row: &row_identity,
                    row_id: &row_id,
                    column,
                    translatable: layout.is_translatable(column, self.profile),
                };
                match self.rewrite_value(raw, &cell, &extractor, translations, stats) {
                    Some(new_value) => {
                        changed = true;
                        values.push(Cow::Owned(new_value));
                    }
                    None => values.push(Cow::Borrowed(*raw)),
                }
            }
            rows.push(values);
        }

        if !changed {
            return Cow::Borrowed(statement);
        }
        stats.statements_rewritten += 1;
        Cow::Owned(rebuild(&parsed, &layout.columns, &rows))
    }

    /// New literal for a value, `None` when it stays as is
    fn rewrite_value(
        &self,
        raw: &str,
        cell: &Cell<'_>,
        extractor: &ValueExtractor<'_>,
        translations: &TranslationMap,
        stats: &mut ReinjectionStats,
    ) -> Option<String> {
        match ColumnValue::classify(raw) {
            ColumnValue::Opaque => None,
            ColumnValue::Text(literal) => self.rewrite_text(&literal, cell, translations, stats),
            ColumnValue::Json(literal, mut document) => {
                let mut changed = false;

                if cell.translatable {
                    let rules = extractor.json_rules(cell.column);
                    walk_strings(&mut document, rules, &mut |path, text| {
                        let key = OccurrenceKey::new(cell.table, cell.row, cell.column, Some(path));
                        if let Some(target) = lookup(translations, &key) {
                            if target != text.as_str() {
                                *text = target.to_string();
                                stats.values_translated += 1;
                                changed = true;
                            }
                        }
                    });
                }

                let ctx = self.context(cell);
                for rule in self.matching_rules(cell, true) {
                    if rule.apply_to_json(&mut document, &ctx) {
                        stats.overrides_applied += 1;
                        changed = true;
                    }
                }

                changed.then(|| literal.render_with(&document.to_string()))
            }
        }
    }

    fn rewrite_text(
        &self,
        literal: &StringLiteral,
        cell: &Cell<'_>,
        translations: &TranslationMap,
        stats: &mut ReinjectionStats,
    ) -> Option<String> {
        if cell.translatable {
            let key = OccurrenceKey::new(cell.table, cell.row, cell.column, None);
            // An unchanged translation leaves the value to the override rules
            if let Some(target) = lookup(translations, &key).filter(|t| *t != literal.text) {
                stats.values_translated += 1;
                return Some(literal.render_with(target));
            }
        }

        let ctx = self.context(cell);
        let mut value = Value::String(literal.text.clone());
        let mut applied = false;
        for rule in self.matching_rules(cell, false) {
            if rule.apply_to_scalar(&mut value, &ctx) {
                stats.overrides_applied += 1;
                applied = true;
            }
        }
        if !applied {
            return None;
        }

        match value {
            Value::String(text) if text == literal.text => None,
            Value::String(text) => Some(literal.render_with(&text)),
            Value::Null => Some("NULL".to_string()),
            Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
            other => Some(literal.render_with(&other.to_string())),
        }
    }

    /// Rules for the cell; pathless rules only unless `json` is set
    fn matching_rules(&self, cell: &Cell<'_>, json: bool) -> Vec<&'a OverrideRule> {
        self.rules
            .iter()
            .filter(|rule| rule.matches_table(cell.table) && rule.matches_column(cell.column, cell.translatable))
            .filter(|rule| match json {
                // Pathless wildcard rules stay on plain values
                true => rule.json_path.is_some() || rule.column != WILDCARD,
                false => rule.json_path.as_deref().is_none_or(|p| p.trim() == "$"),
            })
            .collect()
    }

    fn context<'c>(&'c self, cell: &'c Cell<'_>) -> OverrideContext<'c> {
        OverrideContext {
            locale: self.locale,
            table: cell.table,
            row_id: cell.row_id,
            column: cell.column,
            address_pool: self.address_pool,
        }
    }
}

fn lookup<'t>(translations: &'t TranslationMap, key: &OccurrenceKey) -> Option<&'t str> {
    key.variants()
        .iter()
        .find_map(|variant| translations.get(variant))
        .map(String::as_str)
}

/// `INSERT INTO t ("c1", "c2") VALUES (...), (...)` with the original
/// leading trivia, table token and tail
fn rebuild(parsed: &ParsedInsert<'_>, columns: &[String], rows: &[Vec<Cow<'_, str>>]) -> String {
    let columns = columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    let rows = rows
        .iter()
        .map(|values| format!("({})", values.join(", ")))
        .collect::<Vec<_>>()
        .join(", ");

    debug!("Rebuilding INSERT into {}", parsed.table);
    format!(
        "{}INSERT INTO {} ({}) VALUES {}{}{}",
        parsed.leading,
        parsed.table,
        columns,
        rows,
        parsed.tail,
        if parsed.terminated { ";" } else { "" }
    )
}
