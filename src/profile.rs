/*!
 * Domain profiles.
 *
 * A profile is the data that adapts the engine to one kind of seed data:
 * placeholder patterns, translatable JSON member names, forced columns,
 * per-locale override rules, address pools and prompt rules. Three profiles
 * are built in; any other profile is loaded from a JSON file.
 */

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::SeedError;
use crate::language_utils::{Locale, locales_match};
use crate::reinjection::overrides::OverrideRule;

const GENERIC_PROFILE: &str = include_str!("../profiles/generic.json");
const SLACK_PROFILE: &str = include_str!("../profiles/slack.json");
const AMAZON_PROFILE: &str = include_str!("../profiles/amazon.json");

/// Data that adapts extraction, locking and reinjection to a domain
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainProfile {
    pub id: String,

    /// Substrings of the schema server name that select this profile
    #[serde(default)]
    pub server_name_hints: Vec<String>,

    /// Table name prefixes that select this profile
    #[serde(default)]
    pub table_prefixes: Vec<String>,

    /// Regex patterns locked before translation, in priority order
    #[serde(default)]
    pub placeholder_patterns: Vec<String>,

    /// JSON member names whose string values are translated
    #[serde(default)]
    pub json_string_keys: BTreeSet<String>,

    /// Columns always treated as translatable, by table
    #[serde(default)]
    pub force_include_columns: BTreeMap<String, BTreeSet<String>>,

    /// Columns holding a JSON array of plain strings
    #[serde(default)]
    pub string_array_columns: BTreeSet<String>,

    /// Extra rules appended to the translation prompt
    #[serde(default)]
    pub system_rules: Vec<String>,

    #[serde(default)]
    pub overrides_by_locale: BTreeMap<String, Vec<OverrideRule>>,

    #[serde(default)]
    pub address_pools: BTreeMap<String, Vec<Map<String, Value>>>,
}

impl DomainProfile {
    /// Ids of the built-in profiles
    pub const BUILTIN_IDS: [&'static str; 3] = ["generic", "slack", "amazon"];

    /// Load a built-in profile by id
    pub fn builtin(id: &str) -> Result<Self, SeedError> {
        let source = match id.to_lowercase().as_str() {
            "generic" => GENERIC_PROFILE,
            "slack" => SLACK_PROFILE,
            "amazon" => AMAZON_PROFILE,
            other => return Err(SeedError::Profile(format!("unknown built-in profile '{}'", other))),
        };
        Self::from_json(source)
    }

    /// Parse a profile document
    pub fn from_json(content: &str) -> Result<Self, SeedError> {
        let profile: Self = serde_json::from_str(content).map_err(|e| SeedError::Profile(e.to_string()))?;
        profile.compile_patterns()?;
        Ok(profile)
    }

    /// Load a profile from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile file: {:?}", path))?;
        Self::from_json(&content).with_context(|| format!("Invalid profile file: {:?}", path))
    }

    /// Resolve a `--profile` argument: `auto`, a built-in id, or a file path
    pub fn resolve<'a>(
        choice: &str,
        server_name: &str,
        table_names: impl IntoIterator<Item = &'a str> + Clone,
    ) -> Result<Self> {
        let choice = choice.trim();
        if choice.is_empty() || choice.eq_ignore_ascii_case("auto") {
            let profile = Self::detect(server_name, table_names)?;
            info!("Auto-detected profile '{}'", profile.id);
            return Ok(profile);
        }
        if Self::BUILTIN_IDS.iter().any(|id| id.eq_ignore_ascii_case(choice)) {
            return Ok(Self::builtin(choice)?);
        }
        Self::load(choice)
    }

    /// First built-in profile whose hints match, `generic` otherwise
    pub fn detect<'a>(
        server_name: &str,
        table_names: impl IntoIterator<Item = &'a str> + Clone,
    ) -> Result<Self, SeedError> {
        for id in Self::BUILTIN_IDS {
            let profile = Self::builtin(id)?;
            if profile.matches(server_name, table_names.clone()) {
                return Ok(profile);
            }
        }
        Self::builtin("generic")
    }

    /// Whether the server name or any table name carries one of this profile's hints
    pub fn matches<'a>(&self, server_name: &str, table_names: impl IntoIterator<Item = &'a str>) -> bool {
        let server = server_name.to_lowercase();
        if !server.is_empty()
            && self
                .server_name_hints
                .iter()
                .any(|hint| server.contains(&hint.to_lowercase()))
        {
            return true;
        }
        if self.table_prefixes.is_empty() {
            return false;
        }
        table_names.into_iter().any(|table| {
            let table = table.to_lowercase();
            self.table_prefixes
                .iter()
                .any(|prefix| table.starts_with(&prefix.to_lowercase()))
        })
    }

    /// Compile the placeholder patterns in priority order
    pub fn compile_patterns(&self) -> Result<Vec<Regex>, SeedError> {
        self.placeholder_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .map_err(|e| SeedError::Profile(format!("invalid placeholder pattern '{}': {}", pattern, e)))
            })
            .collect()
    }

    /// Override rules for a locale, empty when none are configured
    pub fn overrides_for(&self, locale: &str) -> &[OverrideRule] {
        lookup_locale(&self.overrides_by_locale, locale)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Address pool for a locale, empty when none is configured
    pub fn address_pool_for(&self, locale: &str) -> &[Map<String, Value>] {
        lookup_locale(&self.address_pools, locale)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether a column of a table is forced translatable
    pub fn is_forced(&self, table: &str, column: &str) -> bool {
        self.force_include_columns
            .get(table)
            .is_some_and(|cols| cols.contains(column))
    }

    /// Prompt rules rendered as a bullet list
    pub fn rules_text(&self) -> Option<String> {
        if self.system_rules.is_empty() {
            return None;
        }
        let lines = self
            .system_rules
            .iter()
            .map(|rule| format!("- {}", rule))
            .collect::<Vec<_>>()
            .join("\n");
        Some(format!("{} RULES\n{}", self.id.to_uppercase(), lines))
    }
}

/// Locale-keyed lookup: exact key, then same locale in another spelling,
/// then a language-only key
fn lookup_locale<'m, T>(map: &'m BTreeMap<String, T>, locale: &str) -> Option<&'m T> {
    if let Some(value) = map.get(locale) {
        return Some(value);
    }
    let wanted = Locale::parse(locale).ok()?;
    let mut language_match = None;
    for (key, value) in map {
        if locales_match(key, locale) {
            return Some(value);
        }
        let Ok(candidate) = Locale::parse(key) else {
            continue;
        };
        if candidate.region.is_none() && candidate.language == wanted.language {
            language_match = Some(value);
        }
    }
    if language_match.is_some() {
        debug!("Using language-level profile entry for '{}'", locale);
    }
    language_match
}
