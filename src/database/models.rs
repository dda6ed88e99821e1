/*!
 * Database models for the translation cache.
 */

use serde::{Deserialize, Serialize};

/// Translation cache row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Database ID
    pub id: i64,
    /// SHA256 hash of the locked source text
    pub source_text_hash: String,
    /// Locked source text
    pub source_text: String,
    /// Target locale, e.g. `fr_FR`
    pub locale: String,
    /// Locked translated text
    pub translated_text: String,
    /// Creation timestamp
    pub created_at: String,
    /// Last overwrite timestamp
    pub updated_at: String,
    /// Number of cache hits
    pub hit_count: i64,
}

impl CacheRecord {
    /// Create a new cache record
    pub fn new(source_text: &str, locale: &str, translated_text: &str) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: 0, // Will be assigned by database
            source_text_hash: crate::database::Repository::hash_text(source_text),
            source_text: source_text.to_string(),
            locale: locale.to_string(),
            translated_text: translated_text.to_string(),
            created_at: now.clone(),
            updated_at: now,
            hit_count: 0,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Total number of cache entries
    pub total_entries: i64,
    /// Total number of cache hits
    pub total_hits: i64,
}
