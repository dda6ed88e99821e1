/*!
 * The translation capability seen by the orchestrator.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

/// One text of a batch request, identified by its index in the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    #[serde(rename = "i")]
    pub index: usize,
    #[serde(rename = "t")]
    pub text: String,
}

impl BatchItem {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// What a translator returned for a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchResponse {
    /// Translated items carrying request indices, possibly a subset and in any order
    Indexed(Vec<BatchItem>),
    /// Plain list of translations; only usable when its length equals the
    /// request size. A `None` slot keeps its position but translates nothing.
    Positional(Vec<Option<String>>),
}

impl BatchResponse {
    /// Translations keyed by request index. A positional list of the wrong
    /// length resolves nothing; empty slots of a well-sized list are skipped.
    pub fn resolve(self, request: &[BatchItem]) -> Vec<(usize, String)> {
        match self {
            BatchResponse::Indexed(items) => items
                .into_iter()
                .filter(|item| request.iter().any(|r| r.index == item.index))
                .map(|item| (item.index, item.text))
                .collect(),
            BatchResponse::Positional(texts) if texts.len() == request.len() => request
                .iter()
                .zip(texts)
                .filter_map(|(item, text)| Some((item.index, text?)))
                .collect(),
            BatchResponse::Positional(_) => Vec::new(),
        }
    }
}

/// Translates batches of locked text
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `items` into `locale`. `extra_rules` are appended to the
    /// instructions for this request only.
    async fn translate_batch(
        &self,
        items: &[BatchItem],
        locale: &str,
        extra_rules: Option<&str>,
    ) -> Result<BatchResponse, ProviderError>;
}
