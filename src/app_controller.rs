/*!
 * Application controller for the seed localization pipeline.
 */

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::app_config::Config;
use crate::database::{DatabaseConnection, Repository};
use crate::extraction::{OccurrenceItem, ValueExtractor};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::placeholder::{LockedText, PlaceholderLocker};
use crate::profile::DomainProfile;
use crate::providers::build_translator;
use crate::reinjection::{Reinjector, TranslationMap};
use crate::schema_model::JsonSchemaModel;
use crate::translation::{
    OrchestratorConfig, TranslateOptions, TranslationCache, TranslationOrchestrator, TranslationOutcome,
    TranslationStore, Translator,
};
use crate::validation::{ValidationEntry, ValidationReport, Validator};

/// Name of the occurrence manifest written once per run
pub const MANIFEST_FILENAME: &str = "translation_manifest.json";

/// Name of the run report
pub const REPORT_FILENAME: &str = "run_report.json";

/// Run history, one line per locale per run
pub const RUN_LOG_FILENAME: &str = "seedloc.log";

/// Inputs of one pipeline run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// JSON schema export
    pub schema_path: PathBuf,
    /// SQL seed file
    pub input_path: PathBuf,
    /// Directory receiving every artifact
    pub output_dir: PathBuf,
    /// `auto`, a built-in profile id, or a profile file path
    pub profile: String,
    /// Identity translations, no translator calls, no SQL written
    pub dry_run: bool,
}

impl RunOptions {
    pub fn new(schema_path: impl Into<PathBuf>, input_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_path: schema_path.into(),
            input_path: input_path.into(),
            output_dir: output_dir.into(),
            profile: "auto".to_string(),
            dry_run: false,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// One manifest line: an occurrence and its locked source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub occurrence: String,
    pub source: String,
    pub locked: String,
    pub column: String,
}

/// One line of the bilingual dump of a locale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BilingualEntry {
    pub occurrence_key: String,
    pub source: String,
    pub target: String,
}

/// Per-locale counters of the run report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocaleSummary {
    pub locale: String,
    pub unique_sources: usize,
    pub from_cache: usize,
    pub requested: usize,
    pub calls: usize,
    /// Locked sources that kept their source text
    pub degraded: Vec<String>,
    /// Sources re-translated by the title enforcement pass
    pub enforced: usize,
    pub validation_issues: usize,
    pub statements_rewritten: usize,
    pub values_translated: usize,
    pub overrides_applied: usize,
    /// Path of the localized SQL, absent on dry runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_sql: Option<PathBuf>,
}

/// Summary written to `run_report.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: String,
    pub profile: String,
    pub dry_run: bool,
    pub total_items: usize,
    pub unique_sources: usize,
    /// Occurrence keys produced by more than one ordinal-identified row
    pub ordinal_collisions: usize,
    pub elapsed_secs: f64,
    pub locales: Vec<LocaleSummary>,
}

impl RunReport {
    pub fn locale(&self, locale: &str) -> Option<&LocaleSummary> {
        self.locales.iter().find(|l| l.locale == locale)
    }
}

/// Occurrence with its locked source
struct LockedOccurrence {
    item: OccurrenceItem,
    locked: LockedText,
}

/// Main application controller for seed localization
pub struct Controller {
    /// App configuration
    config: Config,
    /// Whether progress bars are drawn
    show_progress: bool,
}

impl Controller {
    /// Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            show_progress: true,
        })
    }

    /// Disable progress bars (tests, non-interactive use)
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the pipeline with the configured provider and cache
    pub async fn run(&self, options: &RunOptions) -> Result<RunReport> {
        if !options.dry_run {
            self.config.validate_for_translation()?;
        }
        let translator = build_translator(&self.config);
        let store = self.open_store()?;
        self.run_with(options, translator.as_ref(), store.as_ref()).await
    }

    /// Run the pipeline with an explicit translator and cache
    pub async fn run_with(
        &self,
        options: &RunOptions,
        translator: &dyn Translator,
        store: &dyn TranslationStore,
    ) -> Result<RunReport> {
        let start_time = Instant::now();
        let started_at = chrono::Utc::now().to_rfc3339();

        if !FileManager::file_exists(&options.input_path) {
            return Err(anyhow::anyhow!("Input file does not exist: {:?}", options.input_path));
        }
        FileManager::ensure_dir(&options.output_dir)?;

        let sql = FileManager::read_text(&options.input_path)?;
        let (schema, profile) = self.load_schema_and_profile(&options.schema_path, &options.profile)?;
        info!(
            "Profile '{}', {} tables with translatable columns",
            profile.id,
            schema.translatable_table_count()
        );

        let items = ValueExtractor::new(&schema, &profile).extract(&sql);
        info!("Extracted {} translatable occurrences", items.len());
        let ordinal_collisions = count_ordinal_collisions(&items);
        if ordinal_collisions > 0 {
            warn!(
                "{} occurrence keys repeat across statements with position-identified rows; \
                 their translations may be applied to the wrong rows",
                ordinal_collisions
            );
        }

        let locker = PlaceholderLocker::from_profile(&profile)?;
        let occurrences: Vec<LockedOccurrence> = items
            .into_iter()
            .map(|item| {
                let locked = locker.lock(&item.value);
                LockedOccurrence { item, locked }
            })
            .collect();

        let manifest: Vec<ManifestEntry> = occurrences
            .iter()
            .map(|o| ManifestEntry {
                occurrence: o.item.key.render(),
                source: o.item.value.clone(),
                locked: o.locked.text.clone(),
                column: o.item.column().to_string(),
            })
            .collect();
        FileManager::write_json(options.output_dir.join(MANIFEST_FILENAME), &manifest)?;

        let sources: Vec<String> = occurrences.iter().map(|o| o.locked.text.clone()).collect();
        let unique_sources = crate::translation::orchestrator::dedupe(&sources);
        info!("{} unique locked sources", unique_sources.len());

        let validator = Validator::new(&self.config.validation);
        let mut locales = Vec::with_capacity(self.config.locales.len());

        for locale in &self.config.locales {
            info!("Localizing into {} ({})", locale, language_utils::locale_label(locale));
            let summary = self
                .localize(
                    options,
                    &sql,
                    &schema,
                    &profile,
                    &occurrences,
                    &unique_sources,
                    locale,
                    &validator,
                    translator,
                    store,
                )
                .await
                .with_context(|| format!("Failed to localize into {}", locale))?;
            locales.push(summary);
        }

        let report = RunReport {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at,
            profile: profile.id.clone(),
            dry_run: options.dry_run,
            total_items: occurrences.len(),
            unique_sources: unique_sources.len(),
            ordinal_collisions,
            elapsed_secs: start_time.elapsed().as_secs_f64(),
            locales,
        };
        FileManager::write_json(options.output_dir.join(REPORT_FILENAME), &report)?;
        let log_path = options.output_dir.join(RUN_LOG_FILENAME);
        for summary in &report.locales {
            FileManager::append_to_log_file(
                &log_path,
                &format!(
                    "run {} [{}] {}: {} requested, {} cached, {} degraded, {} validation issues",
                    report.run_id,
                    report.profile,
                    summary.locale,
                    summary.requested,
                    summary.from_cache,
                    summary.degraded.len(),
                    summary.validation_issues
                ),
            )?;
        }
        info!(
            "Run {} finished in {:.1}s",
            report.run_id, report.elapsed_secs
        );

        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    async fn localize(
        &self,
        options: &RunOptions,
        sql: &str,
        schema: &JsonSchemaModel,
        profile: &DomainProfile,
        occurrences: &[LockedOccurrence],
        unique_sources: &[String],
        locale: &str,
        validator: &Validator,
        translator: &dyn Translator,
        store: &dyn TranslationStore,
    ) -> Result<LocaleSummary> {
        let mut summary = LocaleSummary {
            locale: locale.to_string(),
            unique_sources: unique_sources.len(),
            ..Default::default()
        };

        let outcome = if options.dry_run {
            identity_outcome(unique_sources)
        } else {
            let rules = profile.rules_text();
            let mut orchestrator = self.orchestrator(translator, store, unique_sources.len());
            let mut outcome = orchestrator
                .translate_all(
                    unique_sources,
                    locale,
                    TranslateOptions {
                        extra_rules: rules.as_deref(),
                        bypass_cache: false,
                    },
                )
                .await;
            self.finish_progress(&orchestrator);

            summary.enforced = self
                .enforce_titles(occurrences, &mut outcome, locale, rules.as_deref(), translator, store)
                .await;
            outcome
        };

        summary.from_cache = outcome.from_cache;
        summary.requested = outcome.requested;
        summary.calls = outcome.calls;
        summary.degraded = outcome.degraded.clone();
        if !outcome.degraded.is_empty() {
            warn!("{}: {} sources kept their source text", locale, outcome.degraded.len());
        }

        let mut translations = TranslationMap::with_capacity(occurrences.len());
        let mut dump = Vec::with_capacity(occurrences.len());
        let mut unlocked: Vec<(String, String)> = Vec::with_capacity(occurrences.len());
        for occurrence in occurrences {
            let key = occurrence.item.key.render();
            let locked_target = outcome.get(&occurrence.locked.text).unwrap_or(&occurrence.locked.text);
            let target = occurrence.locked.unlock(locked_target);
            translations.insert(key.clone(), target.clone());
            dump.push(BilingualEntry {
                occurrence_key: key.clone(),
                source: occurrence.item.value.clone(),
                target: target.clone(),
            });
            unlocked.push((key, target));
        }
        FileManager::write_json(
            FileManager::locale_output_path(&options.output_dir, "translations", locale, "json"),
            &dump,
        )?;

        let entries: Vec<ValidationEntry<'_>> = occurrences
            .iter()
            .zip(unlocked.iter())
            .map(|(occurrence, (key, target))| ValidationEntry {
                occurrence: key,
                source_locked: &occurrence.locked.text,
                target_locked: outcome.get(&occurrence.locked.text).unwrap_or(&occurrence.locked.text),
                source: &occurrence.item.value,
                target,
            })
            .collect();
        let report: ValidationReport = validator.validate_all(&entries, locale);
        summary.validation_issues = report.issues.len();
        FileManager::write_json(
            FileManager::locale_output_path(&options.output_dir, "validation", locale, "json"),
            &report,
        )?;
        if !report.issues.is_empty() {
            warn!("{}: {} validation issues", locale, report.issues.len());
        }

        if options.dry_run {
            info!("{}: dry run, no SQL written", locale);
            return Ok(summary);
        }

        let output = Reinjector::new(schema, profile, locale).reinject(sql, &translations);
        let sql_path = FileManager::locale_output_path(&options.output_dir, "seed", locale, "sql");
        FileManager::write_to_file(&sql_path, &output.sql)?;
        info!(
            "{}: {} of {} statements rewritten, {} values translated, {} overrides -> {:?}",
            locale,
            output.stats.statements_rewritten,
            output.stats.statements,
            output.stats.values_translated,
            output.stats.overrides_applied,
            sql_path
        );

        summary.statements_rewritten = output.stats.statements_rewritten;
        summary.values_translated = output.stats.values_translated;
        summary.overrides_applied = output.stats.overrides_applied;
        summary.output_sql = Some(sql_path);
        Ok(summary)
    }

    /// Re-translate title-like occurrences that came back unchanged, with a
    /// stricter prompt and without reading the cache. Returns how many
    /// sources changed.
    async fn enforce_titles(
        &self,
        occurrences: &[LockedOccurrence],
        outcome: &mut TranslationOutcome,
        locale: &str,
        base_rules: Option<&str>,
        translator: &dyn Translator,
        store: &dyn TranslationStore,
    ) -> usize {
        let enforcement = &self.config.enforcement;
        if !enforcement.enabled {
            return 0;
        }

        let mut candidates: Vec<String> = Vec::new();
        for occurrence in occurrences {
            let source = &occurrence.locked.text;
            if source.trim().is_empty() || !enforcement_applies(enforcement, &occurrence.item) {
                continue;
            }
            let target = outcome.get(source).unwrap_or(source);
            if crate::validation::service::is_unchanged(source, target) && !candidates.contains(source) {
                candidates.push(source.clone());
            }
        }
        candidates.truncate(enforcement.max_occurrences);
        if candidates.is_empty() {
            info!("Title enforcement: nothing to fix");
            return 0;
        }
        info!("Title enforcement: re-translating {} sources", candidates.len());

        let rules = strict_title_rules(base_rules, locale);
        let mut orchestrator = self.orchestrator(translator, store, candidates.len());
        let enforced = orchestrator
            .translate_all(
                &candidates,
                locale,
                TranslateOptions {
                    extra_rules: Some(&rules),
                    bypass_cache: true,
                },
            )
            .await;
        self.finish_progress(&orchestrator);
        outcome.calls += enforced.calls;

        let mut fixed = 0;
        for source in &candidates {
            if enforced.is_degraded(source) {
                continue;
            }
            if let Some(target) = enforced.get(source) {
                if !crate::validation::service::is_unchanged(source, target) {
                    fixed += 1;
                }
                outcome.translations.insert(source.clone(), target.to_string());
                outcome.degraded.retain(|d| d != source);
            }
        }
        info!("Title enforcement: fixed {} sources", fixed);
        fixed
    }

    fn orchestrator<'a>(
        &self,
        translator: &'a dyn Translator,
        store: &'a dyn TranslationStore,
        total: usize,
    ) -> TranslationOrchestrator<'a> {
        let orchestrator = TranslationOrchestrator::new(
            translator,
            store,
            OrchestratorConfig::from(&self.config.translation.common),
        );
        if !self.show_progress {
            return orchestrator;
        }

        let progress_bar = ProgressBar::new(total as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} strings ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");
        orchestrator.with_progress(progress_bar)
    }

    fn finish_progress(&self, orchestrator: &TranslationOrchestrator<'_>) {
        if let Some(progress_bar) = orchestrator.progress() {
            progress_bar.finish_and_clear();
        }
    }

    /// Load the schema, resolve the profile against it, then reload the
    /// schema with the profile's forced columns
    fn load_schema_and_profile(&self, schema_path: &Path, choice: &str) -> Result<(JsonSchemaModel, DomainProfile)> {
        let content = FileManager::read_text(schema_path)?;
        let document: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse schema file: {:?}", schema_path))?;

        let hints = &self.config.schema_hints;
        let unforced = JsonSchemaModel::from_value(&document, hints, &BTreeMap::new())?;
        let profile = DomainProfile::resolve(choice, &unforced.server_name, unforced.table_names())?;
        debug!("Resolved profile '{}' from '{}'", profile.id, choice);

        let schema = JsonSchemaModel::from_value(&document, hints, &profile.force_include_columns)?;
        Ok((schema, profile))
    }

    fn open_store(&self) -> Result<Box<dyn TranslationStore>> {
        if !self.config.cache.enabled {
            info!("Translation cache disabled, using an in-memory cache for this run");
            return Ok(Box::new(TranslationCache::new()));
        }
        let connection = match &self.config.cache.path {
            Some(path) => DatabaseConnection::new(path)?,
            None => DatabaseConnection::new_default()?,
        };
        Ok(Box::new(Repository::new(connection)))
    }
}

/// Every source mapped to itself
fn identity_outcome(sources: &[String]) -> TranslationOutcome {
    TranslationOutcome {
        translations: sources.iter().map(|s| (s.clone(), s.clone())).collect(),
        ..Default::default()
    }
}

/// Column name, or the last JSON member name, matched against the enforcement filter
fn enforcement_applies(enforcement: &crate::app_config::EnforcementConfig, item: &OccurrenceItem) -> bool {
    if enforcement.applies_to(item.table(), item.column()) {
        return true;
    }
    item.json_path()
        .and_then(|path| path.rsplit('.').next())
        .map(|member| member.split('[').next().unwrap_or(member))
        .is_some_and(|member| !member.is_empty() && member != "$" && enforcement.applies_to(item.table(), member))
}

fn strict_title_rules(base_rules: Option<&str>, locale: &str) -> String {
    let policy = format!(
        "# STRICT TITLE POLICY\n\
         All inputs in this batch are product titles or catalog item names.\n\
         Translate them into {}.\n\
         Do NOT leave them in the source language unless the token is a brand name, model number, SKU, or marketplace ID.\n\
         Preserve placeholder tokens exactly.",
        locale
    );
    match base_rules {
        Some(base) if !base.trim().is_empty() => format!("{}\n\n{}", base, policy),
        _ => policy,
    }
}

/// Number of rendered keys produced more than once by ordinal-identified rows
fn count_ordinal_collisions(items: &[OccurrenceItem]) -> usize {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for item in items.iter().filter(|i| i.row.is_ordinal()) {
        *seen.entry(item.key.render()).or_default() += 1;
    }
    seen.values().filter(|&&count| count > 1).count()
}
