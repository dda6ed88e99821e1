/*!
 * Batched translation with self-healing.
 *
 * Unique locked sources are looked up in the cache, the rest are packed
 * into batches under a character budget and sent to the translator. Items a
 * reply leaves out are recovered in stages:
 *
 * 1. the outstanding items are requested once more
 * 2. what is still missing is split in halves, each half requested on its own
 * 3. an item still missing after being requested alone keeps its source
 *    text and is reported as degraded
 *
 * Failed calls are retried with exponential backoff and jitter; once the
 * retries are exhausted every item of that call is degraded. Calls are
 * throttled to a maximum rate and awaited one at a time.
 */

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use log::{debug, info, warn};
use rand::Rng;

use super::cache::{TranslationStore, truncate_text};
use super::translator::{BatchItem, Translator};
use crate::app_config::TranslationCommonConfig;

/// Tuning of the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Character budget of one request
    pub max_chars_per_request: usize,
    /// Attempts per call before its items are degraded
    pub max_retries: u32,
    /// Base of the exponential backoff in seconds; zero disables backoff
    pub backoff_base: f64,
    /// Maximum calls per second
    pub qps: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_chars_per_request: 8000,
            max_retries: 5,
            backoff_base: 1.5,
            qps: 1.0,
        }
    }
}

impl From<&TranslationCommonConfig> for OrchestratorConfig {
    fn from(config: &TranslationCommonConfig) -> Self {
        Self {
            max_chars_per_request: config.max_chars_per_request,
            max_retries: config.retry_count,
            backoff_base: config.backoff_base,
            qps: config.qps,
        }
    }
}

/// Result of translating a set of sources into one locale
#[derive(Debug, Clone, Default)]
pub struct TranslationOutcome {
    /// Locked source to locked translation, degraded items mapping to themselves
    pub translations: HashMap<String, String>,
    /// Sources that fell back to identity
    pub degraded: Vec<String>,
    /// Sources answered from the cache
    pub from_cache: usize,
    /// Sources sent to the translator
    pub requested: usize,
    /// Translator calls made, retries included
    pub calls: usize,
}

impl TranslationOutcome {
    pub fn get(&self, source: &str) -> Option<&str> {
        self.translations.get(source).map(String::as_str)
    }

    pub fn is_degraded(&self, source: &str) -> bool {
        self.degraded.iter().any(|s| s == source)
    }
}

/// Options of one `translate_all` call
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslateOptions<'r> {
    /// Extra prompt rules for this pass
    pub extra_rules: Option<&'r str>,
    /// Skip cache lookups (results are still written)
    pub bypass_cache: bool,
}

/// Drives a translator over deduplicated, cached, batched sources
pub struct TranslationOrchestrator<'a> {
    translator: &'a dyn Translator,
    store: &'a dyn TranslationStore,
    config: OrchestratorConfig,
    last_call: Option<Instant>,
    progress: Option<ProgressBar>,
}

/// Per-batch bookkeeping
struct BatchState<'b> {
    locale: &'b str,
    extra_rules: Option<&'b str>,
    sources: HashMap<usize, String>,
}

impl<'a> TranslationOrchestrator<'a> {
    pub fn new(translator: &'a dyn Translator, store: &'a dyn TranslationStore, config: OrchestratorConfig) -> Self {
        Self {
            translator,
            store,
            config,
            last_call: None,
            progress: None,
        }
    }

    /// Report resolved items on a progress bar
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn progress(&self) -> Option<&ProgressBar> {
        self.progress.as_ref()
    }

    /// Translate `sources` into `locale`
    pub async fn translate_all(
        &mut self,
        sources: &[String],
        locale: &str,
        options: TranslateOptions<'_>,
    ) -> TranslationOutcome {
        let mut outcome = TranslationOutcome::default();
        let unique = dedupe(sources);

        let mut pending = Vec::new();
        for source in unique {
            if !options.bypass_cache {
                match self.store.get(&source, locale).await {
                    Ok(Some(cached)) => {
                        outcome.translations.insert(source, cached);
                        outcome.from_cache += 1;
                        continue;
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Cache lookup failed for '{}': {}", truncate_text(&source, 30), e),
                }
            }
            pending.push(source);
        }

        outcome.requested = pending.len();
        if let Some(progress) = &self.progress {
            progress.set_length(pending.len() as u64);
        }

        let batches = pack_batches(pending, self.config.max_chars_per_request);
        info!(
            "Translating {} texts into {} ({} cached, {} batches)",
            outcome.requested,
            locale,
            outcome.from_cache,
            batches.len()
        );

        for batch in batches {
            let state = BatchState {
                locale,
                extra_rules: options.extra_rules,
                sources: batch.into_iter().enumerate().collect(),
            };
            self.run_batch(&state, &mut outcome).await;
        }

        if !outcome.degraded.is_empty() {
            warn!(
                "{} texts for {} kept their source text after retries",
                outcome.degraded.len(),
                locale
            );
        }
        outcome
    }

    async fn run_batch(&mut self, state: &BatchState<'_>, outcome: &mut TranslationOutcome) {
        let mut request: Vec<BatchItem> = state
            .sources
            .iter()
            .map(|(&index, text)| BatchItem::new(index, text.clone()))
            .collect();
        request.sort_by_key(|item| item.index);

        let missing = self.request(&request, state, outcome).await;
        if missing.is_empty() {
            return;
        }
        debug!("Retrying {} missing items", missing.len());
        let still_missing = self.request(&missing, state, outcome).await;
        self.settle(still_missing, missing.len(), state, outcome).await;
    }

    /// Recover `missing`, the unresolved part of a request of `request_len` items
    async fn settle(
        &mut self,
        missing: Vec<BatchItem>,
        request_len: usize,
        state: &BatchState<'_>,
        outcome: &mut TranslationOutcome,
    ) {
        match missing.len() {
            0 => {}
            1 if request_len == 1 => {
                for item in missing {
                    self.degrade(&item, state, outcome);
                }
            }
            1 => {
                let again = self.request(&missing, state, outcome).await;
                Box::pin(self.settle(again, 1, state, outcome)).await;
            }
            n => {
                debug!("Bisecting {} missing items", n);
                let (left, right) = missing.split_at(n / 2);
                for half in [left, right] {
                    let half_missing = self.request(half, state, outcome).await;
                    Box::pin(self.settle(half_missing, half.len(), state, outcome)).await;
                }
            }
        }
    }

    /// One call with retries. Returns the items the reply left unresolved;
    /// when every attempt fails the items are degraded and nothing is returned.
    async fn request(
        &mut self,
        items: &[BatchItem],
        state: &BatchState<'_>,
        outcome: &mut TranslationOutcome,
    ) -> Vec<BatchItem> {
        if items.is_empty() {
            return Vec::new();
        }

        let attempts = self.config.max_retries.max(1);
        for attempt in 0..attempts {
            self.throttle().await;
            outcome.calls += 1;

            match self.translator.translate_batch(items, state.locale, state.extra_rules).await {
                Ok(response) => {
                    let mut resolved: HashSet<usize> = HashSet::new();
                    for (index, text) in response.resolve(items) {
                        let Some(source) = state.sources.get(&index) else {
                            continue;
                        };
                        if text.trim().is_empty() && !source.trim().is_empty() {
                            continue;
                        }
                        if resolved.insert(index) {
                            self.accept(source, text, state.locale, outcome).await;
                        }
                    }

                    let missing: Vec<BatchItem> = items
                        .iter()
                        .filter(|item| !resolved.contains(&item.index))
                        .cloned()
                        .collect();
                    if !missing.is_empty() {
                        warn!(
                            "Translator returned {} of {} items for {}",
                            items.len() - missing.len(),
                            items.len(),
                            state.locale
                        );
                    }
                    return missing;
                }
                Err(e) => {
                    if attempt + 1 < attempts {
                        let delay = backoff_delay(self.config.backoff_base, attempt);
                        warn!(
                            "Translation request failed ({}); retrying in {:.1}s",
                            e,
                            delay.as_secs_f64()
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        warn!("Translation request failed after {} attempts: {}", attempts, e);
                    }
                }
            }
        }

        for item in items {
            self.degrade(item, state, outcome);
        }
        Vec::new()
    }

    async fn accept(&mut self, source: &str, translated: String, locale: &str, outcome: &mut TranslationOutcome) {
        if let Err(e) = self.store.put(source, locale, &translated).await {
            warn!("Failed to cache translation of '{}': {}", truncate_text(source, 30), e);
        }
        outcome.translations.insert(source.to_string(), translated);
        if let Some(progress) = &self.progress {
            progress.inc(1);
        }
    }

    fn degrade(&mut self, item: &BatchItem, state: &BatchState<'_>, outcome: &mut TranslationOutcome) {
        let Some(source) = state.sources.get(&item.index) else {
            return;
        };
        if outcome.translations.contains_key(source) {
            return;
        }
        warn!("Keeping source text for '{}'", truncate_text(source, 40));
        outcome.translations.insert(source.clone(), source.clone());
        outcome.degraded.push(source.clone());
        if let Some(progress) = &self.progress {
            progress.inc(1);
        }
    }

    /// Sleep for what remains of the minimum interval since the last call
    async fn throttle(&mut self) {
        let interval = Duration::from_secs_f64(1.0 / self.config.qps.max(0.01));
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}

/// Unique values in first-seen order
pub fn dedupe(sources: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    sources
        .iter()
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}

/// Pack texts into batches whose character total stays within `budget`;
/// a text larger than the budget travels alone
pub fn pack_batches(texts: Vec<String>, budget: usize) -> Vec<Vec<String>> {
    let mut batches = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_chars = 0usize;

    for text in texts {
        let len = text.chars().count();
        if !current.is_empty() && current_chars + len > budget {
            batches.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        current_chars += len;
        current.push(text);
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

/// Upper bound for a single retry wait
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// `base^attempt` seconds plus up to 0.6s of jitter, capped at [`MAX_BACKOFF`]
pub fn backoff_delay(base: f64, attempt: u32) -> Duration {
    if base.is_nan() || base <= 0.0 {
        return Duration::ZERO;
    }
    let jitter: f64 = rand::rng().random_range(0.0..0.6);
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    Duration::try_from_secs_f64(base.powi(exponent) + jitter)
        .map(|delay| delay.min(MAX_BACKOFF))
        .unwrap_or(MAX_BACKOFF)
}
