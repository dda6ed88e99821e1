/*!
 * Occurrence identity.
 *
 * Every translatable string gets a key built from its table, row, column and
 * JSON path. Extraction and reinjection build keys with the same code, so a
 * key is all that is needed to find a translation again.
 */

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sql::literal::unquote_value;

/// Identity of a row inside an INSERT statement
///
/// `Ordinal` is the 1-based position of the row inside its statement. It is
/// only stable while extraction and reinjection read the same unmodified
/// source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowIdentity {
    PrimaryKey(Vec<String>),
    Ordinal(usize),
}

impl RowIdentity {
    /// Identity of `row`: its primary key values when every key column is
    /// present, its ordinal otherwise
    pub fn for_row(pk_indices: Option<&[usize]>, row: &[&str], ordinal: usize) -> Self {
        let Some(indices) = pk_indices.filter(|i| !i.is_empty()) else {
            return Self::Ordinal(ordinal);
        };
        let values: Option<Vec<String>> = indices
            .iter()
            .map(|&i| row.get(i).map(|raw| unquote_value(raw)))
            .collect();
        match values {
            Some(values) => Self::PrimaryKey(values),
            None => Self::Ordinal(ordinal),
        }
    }

    pub fn is_ordinal(&self) -> bool {
        matches!(self, Self::Ordinal(_))
    }
}

impl fmt::Display for RowIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryKey(values) => write!(f, "{}", values.join("|")),
            Self::Ordinal(n) => write!(f, "row{}", n),
        }
    }
}

/// Composite identity of one translatable string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccurrenceKey {
    pub table: String,
    pub row_id: String,
    pub column: String,
    /// JSON path inside the column value, `None` for plain values
    pub json_path: Option<String>,
}

impl OccurrenceKey {
    pub fn new(table: &str, row: &RowIdentity, column: &str, json_path: Option<&str>) -> Self {
        Self {
            table: table.to_string(),
            row_id: row.to_string(),
            column: column.to_string(),
            json_path: json_path.map(str::to_string),
        }
    }

    /// `table:row:column:path`, the path part empty for plain values
    pub fn render(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.table,
            self.row_id,
            self.column,
            self.json_path.as_deref().unwrap_or_default()
        )
    }

    /// Rendered key followed by spellings with normalized identifier casing,
    /// without duplicates
    pub fn variants(&self) -> Vec<String> {
        let path = self.json_path.as_deref().unwrap_or_default();
        let candidates = [
            self.render(),
            format!("{}:{}:{}:{}", self.table.to_lowercase(), self.row_id, self.column, path),
            format!(
                "{}:{}:{}:{}",
                self.table.to_lowercase(),
                self.row_id,
                self.column.to_lowercase(),
                path
            ),
        ];

        let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }
        variants
    }

    /// Key of the column value this key lives in
    pub fn column_key(&self) -> Self {
        Self {
            json_path: None,
            ..self.clone()
        }
    }
}

impl fmt::Display for OccurrenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
