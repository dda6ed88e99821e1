/*!
 * Translation caching.
 *
 * `TranslationStore` is the get/put contract the orchestrator relies on.
 * `TranslationCache` keeps entries in memory (tests, dry runs); the SQLite
 * store lives in `crate::database`.
 */

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;

/// Persistent mapping of `(locked source, locale)` to locked translation
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// Look up a translation
    async fn get(&self, source: &str, locale: &str) -> Result<Option<String>>;

    /// Insert or replace a translation
    async fn put(&self, source: &str, locale: &str, translated: &str) -> Result<()>;
}

/// Cache key combining source text and target locale
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source_text: String,
    locale: String,
}

impl CacheKey {
    fn new(source_text: &str, locale: &str) -> Self {
        Self {
            source_text: source_text.to_string(),
            locale: locale.to_string(),
        }
    }
}

/// In-memory translation cache
#[derive(Clone, Default)]
pub struct TranslationCache {
    cache: Arc<RwLock<HashMap<CacheKey, String>>>,
    hits: Arc<RwLock<usize>>,
    misses: Arc<RwLock<usize>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a translation from the cache
    pub fn lookup(&self, source_text: &str, locale: &str) -> Option<String> {
        let key = CacheKey::new(source_text, locale);
        match self.cache.read().get(&key) {
            Some(translation) => {
                *self.hits.write() += 1;
                debug!("Cache hit for '{}' ({})", truncate_text(source_text, 30), locale);
                Some(translation.clone())
            }
            None => {
                *self.misses.write() += 1;
                None
            }
        }
    }

    /// Store a translation in the cache
    pub fn store(&self, source_text: &str, locale: &str, translation: &str) {
        self.cache
            .write()
            .insert(CacheKey::new(source_text, locale), translation.to_string());
        debug!("Cached translation for '{}' ({})", truncate_text(source_text, 30), locale);
    }

    /// Hits, misses and hit rate
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;
        let hit_rate = if total > 0 { hits as f64 / total as f64 } else { 0.0 };
        (hits, misses, hit_rate)
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

#[async_trait]
impl TranslationStore for TranslationCache {
    async fn get(&self, source: &str, locale: &str) -> Result<Option<String>> {
        Ok(self.lookup(source, locale))
    }

    async fn put(&self, source: &str, locale: &str, translated: &str) -> Result<()> {
        self.store(source, locale, translated);
        Ok(())
    }
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
