/*!
 * Advisory checks on translated text.
 *
 * Nothing here changes a translation. Issues are collected per locale and
 * written next to the output so a reviewer can inspect them.
 *
 * - `placeholders`: lock tokens survive translation unchanged
 * - `length`: translated length stays within a ratio of the source
 * - `service`: runs the checks over a run's occurrences
 */

pub mod length;
pub mod placeholders;
pub mod service;

use serde::{Deserialize, Serialize};

pub use length::{LengthIssue, LengthValidator};
pub use placeholders::PlaceholderValidator;
pub use service::{ValidationEntry, ValidationReport, Validator};

/// Kind of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    PlaceholderParity,
    LengthRatio,
}

/// One advisory finding about a translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub detail: String,
    pub source: String,
    pub target: String,
    pub locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<String>,
}
