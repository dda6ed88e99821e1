/*!
 * Repository layer for the translation cache.
 *
 * Entries are keyed by `(sha256(locked source), locale)`. A put for an
 * existing key overwrites the stored translation.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};

use super::connection::DatabaseConnection;
use super::models::{CacheRecord, CacheStats};
use crate::translation::cache::TranslationStore;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Compute SHA256 hash of text
    pub fn hash_text(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Get a cached translation
    pub async fn get_cached_translation(&self, source_text: &str, locale: &str) -> Result<Option<String>> {
        let source_text_hash = Self::hash_text(source_text);
        let locale = locale.to_string();

        self.db
            .execute_async(move |conn| {
                let result: Option<(i64, String)> = conn
                    .query_row(
                        r#"
                        SELECT id, translated_text
                        FROM translation_cache
                        WHERE source_text_hash = ?1
                          AND locale = ?2
                        "#,
                        params![source_text_hash, locale],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;

                if let Some((id, translated_text)) = result {
                    conn.execute(
                        "UPDATE translation_cache SET hit_count = hit_count + 1 WHERE id = ?1",
                        [id],
                    )?;
                    debug!("Cache hit for translation ({})", locale);
                    Ok(Some(translated_text))
                } else {
                    Ok(None)
                }
            })
            .await
    }

    /// Store a translation in the cache, replacing any previous value
    pub async fn cache_translation(&self, record: &CacheRecord) -> Result<()> {
        let record = record.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO translation_cache (
                        source_text_hash, source_text, locale, translated_text,
                        created_at, updated_at, hit_count
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ON CONFLICT(source_text_hash, locale)
                    DO UPDATE SET translated_text = excluded.translated_text,
                                  updated_at = excluded.updated_at
                    "#,
                    params![
                        record.source_text_hash,
                        record.source_text,
                        record.locale,
                        record.translated_text,
                        record.created_at,
                        record.updated_at,
                        record.hit_count,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Get cache statistics
    pub async fn get_cache_stats(&self) -> Result<CacheStats> {
        self.db
            .execute_async(|conn| {
                let total_entries: i64 = conn
                    .query_row("SELECT COUNT(*) FROM translation_cache", [], |row| row.get(0))
                    .unwrap_or(0);

                let total_hits: i64 = conn
                    .query_row(
                        "SELECT COALESCE(SUM(hit_count), 0) FROM translation_cache",
                        [],
                        |row| row.get(0),
                    )
                    .unwrap_or(0);

                Ok(CacheStats {
                    total_entries,
                    total_hits,
                })
            })
            .await
    }

    /// Clear the translation cache
    pub async fn clear_cache(&self) -> Result<i64> {
        self.db
            .execute_async(|conn| {
                let deleted = conn.execute("DELETE FROM translation_cache", [])?;
                Ok(deleted as i64)
            })
            .await
    }
}

#[async_trait]
impl TranslationStore for Repository {
    async fn get(&self, source: &str, locale: &str) -> Result<Option<String>> {
        self.get_cached_translation(source, locale).await
    }

    async fn put(&self, source: &str, locale: &str, translated: &str) -> Result<()> {
        self.cache_translation(&CacheRecord::new(source, locale, translated)).await
    }
}
