/*!
 * Finding translatable text in parsed INSERT statements.
 *
 * - `key`: occurrence keys and row identity
 * - `json_walk`: strings inside JSON column values
 * - `extractor`: the per-statement extraction pass
 */

pub mod extractor;
pub mod json_walk;
pub mod key;

pub use extractor::{ColumnValue, InsertLayout, OccurrenceItem, ValueExtractor};
pub use json_walk::{JsonTextRules, parse_json_value};
pub use key::{OccurrenceKey, RowIdentity};
