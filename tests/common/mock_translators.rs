/*!
 * Scripted translator implementations for testing
 *
 * These translators answer from a fixed table instead of calling a
 * provider, and record every request they receive.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use seedloc::errors::ProviderError;
use seedloc::translation::{BatchItem, BatchResponse, Translator};

/// Answers from a lookup table; unknown texts get a `[xx] ` prefix
#[derive(Debug, Clone, Default)]
pub struct ScriptedTranslator {
    answers: HashMap<String, String>,
    /// Texts of every request, in call order
    pub requests: Arc<Mutex<Vec<Vec<String>>>>,
    /// Extra rules of every request, in call order
    pub rules: Arc<Mutex<Vec<Option<String>>>>,
}

impl ScriptedTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `source` with `target`
    pub fn answer(mut self, source: &str, target: &str) -> Self {
        self.answers.insert(source.to_string(), target.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn translate(&self, text: &str, locale: &str) -> String {
        self.answers.get(text).cloned().unwrap_or_else(|| {
            let prefix = locale.split('_').next().unwrap_or(locale);
            format!("[{}] {}", prefix, text)
        })
    }
}

#[async_trait]
impl Translator for ScriptedTranslator {
    async fn translate_batch(
        &self,
        items: &[BatchItem],
        locale: &str,
        extra_rules: Option<&str>,
    ) -> Result<BatchResponse, ProviderError> {
        self.requests
            .lock()
            .unwrap()
            .push(items.iter().map(|item| item.text.clone()).collect());
        self.rules.lock().unwrap().push(extra_rules.map(str::to_string));

        Ok(BatchResponse::Indexed(
            items
                .iter()
                .map(|item| BatchItem::new(item.index, self.translate(&item.text, locale)))
                .collect(),
        ))
    }
}

/// Never answers one particular text
#[derive(Debug, Clone)]
pub struct OmittingTranslator {
    pub omitted: String,
    pub calls: Arc<Mutex<usize>>,
}

impl OmittingTranslator {
    pub fn new(omitted: &str) -> Self {
        Self {
            omitted: omitted.to_string(),
            calls: Arc::new(Mutex::new(0)),
        }
    }
}

#[async_trait]
impl Translator for OmittingTranslator {
    async fn translate_batch(
        &self,
        items: &[BatchItem],
        _locale: &str,
        _extra_rules: Option<&str>,
    ) -> Result<BatchResponse, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        Ok(BatchResponse::Indexed(
            items
                .iter()
                .filter(|item| item.text != self.omitted)
                .map(|item| BatchItem::new(item.index, format!("<{}>", item.text)))
                .collect(),
        ))
    }
}

/// Echoes every text back unless the request carries the strict title
/// policy, in which case it appends ` (fr)`
#[derive(Debug, Clone, Default)]
pub struct StubbornTranslator {
    pub calls: Arc<Mutex<usize>>,
}

impl StubbornTranslator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Translator for StubbornTranslator {
    async fn translate_batch(
        &self,
        items: &[BatchItem],
        _locale: &str,
        extra_rules: Option<&str>,
    ) -> Result<BatchResponse, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        let strict = extra_rules.is_some_and(|rules| rules.contains("STRICT TITLE POLICY"));
        Ok(BatchResponse::Indexed(
            items
                .iter()
                .map(|item| {
                    let text = if strict {
                        format!("{} (fr)", item.text)
                    } else {
                        item.text.clone()
                    };
                    BatchItem::new(item.index, text)
                })
                .collect(),
        ))
    }
}
