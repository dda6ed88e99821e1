/*!
 * Validation service running every check per occurrence.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use super::length::LengthValidator;
use super::placeholders::PlaceholderValidator;
use super::{IssueKind, ValidationIssue};
use crate::app_config::ValidationConfig;

/// One translated occurrence to check
#[derive(Debug, Clone)]
pub struct ValidationEntry<'a> {
    /// Rendered occurrence key
    pub occurrence: &'a str,
    pub source_locked: &'a str,
    pub target_locked: &'a str,
    /// Source with placeholders restored
    pub source: &'a str,
    /// Translation with placeholders restored
    pub target: &'a str,
}

/// Issues found for one locale
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub locale: String,
    pub checked: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}

/// Runs placeholder parity and length ratio checks
#[derive(Debug, Clone, Default)]
pub struct Validator {
    length: LengthValidator,
}

impl Validator {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            length: LengthValidator::new(config.length_ratio_min, config.length_ratio_max),
        }
    }

    /// Check one occurrence
    pub fn validate_entry(&self, entry: &ValidationEntry<'_>, locale: &str) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if let Some(detail) = PlaceholderValidator::check(entry.source_locked, entry.target_locked) {
            issues.push(ValidationIssue {
                kind: IssueKind::PlaceholderParity,
                detail,
                source: entry.source_locked.to_string(),
                target: entry.target_locked.to_string(),
                locale: locale.to_string(),
                occurrence: Some(entry.occurrence.to_string()),
            });
        }

        if let Some(issue) = self.length.check(entry.source, entry.target) {
            issues.push(ValidationIssue {
                kind: IssueKind::LengthRatio,
                detail: issue.to_string(),
                source: entry.source.to_string(),
                target: entry.target.to_string(),
                locale: locale.to_string(),
                occurrence: Some(entry.occurrence.to_string()),
            });
        }

        issues
    }

    /// Check every occurrence of a locale
    pub fn validate_all(&self, entries: &[ValidationEntry<'_>], locale: &str) -> ValidationReport {
        let issues: Vec<ValidationIssue> = entries
            .iter()
            .flat_map(|entry| self.validate_entry(entry, locale))
            .collect();

        debug!(
            "Validation for {}: {} entries, {} issues",
            locale,
            entries.len(),
            issues.len()
        );

        ValidationReport {
            locale: locale.to_string(),
            checked: entries.len(),
            issues,
        }
    }
}

/// Whether a translation came back identical to its source, ignoring
/// whitespace runs, zero-width characters, BOMs and case
pub fn is_unchanged(source: &str, target: &str) -> bool {
    let normalize = |s: &str| -> String {
        s.chars()
            .filter(|c| !matches!(c, '\u{200b}'..='\u{200d}' | '\u{2060}' | '\u{feff}'))
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    };
    let source = normalize(source);
    !source.is_empty() && source == normalize(target)
}
