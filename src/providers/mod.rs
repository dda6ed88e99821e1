/*!
 * Provider implementations for LLM services.
 *
 * This module contains client implementations for the supported services:
 * - Gemini: Google Generative Language API
 * - Anthropic: Anthropic Messages API
 * - Mock: scripted provider for tests
 *
 * `LlmTranslator` turns any provider into a batch `Translator` by building
 * the localization prompt and parsing the reply.
 */

use async_trait::async_trait;
use log::debug;
use std::fmt::Debug;

use crate::app_config::{Config, TranslationProvider};
use crate::errors::ProviderError;
use crate::translation::prompts::{TranslationPromptBuilder, parse_batch_response};
use crate::translation::translator::{BatchItem, BatchResponse, Translator};

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably behind `LlmTranslator`.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Build a request from a system prompt and a user prompt
    fn build_request(&self, system: &str, user: &str) -> Self::Request;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// Batch translator backed by an LLM provider
#[derive(Debug)]
pub struct LlmTranslator<P: Provider> {
    provider: P,
}

impl<P: Provider> LlmTranslator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: Provider> Translator for LlmTranslator<P> {
    async fn translate_batch(
        &self,
        items: &[BatchItem],
        locale: &str,
        extra_rules: Option<&str>,
    ) -> Result<BatchResponse, ProviderError> {
        let builder = TranslationPromptBuilder::new(locale).with_rules(extra_rules);
        let request = self
            .provider
            .build_request(&builder.build_system_prompt(), &builder.build_user_prompt(items));

        let response = self.provider.complete(request).await?;
        let text = P::extract_text(&response);
        if text.trim().is_empty() {
            return Err(ProviderError::ParseError("Empty response body".to_string()));
        }
        debug!("Received {} chars for {} items", text.len(), items.len());

        parse_batch_response(&text)
    }
}

/// Build the translator configured as active provider
pub fn build_translator(config: &Config) -> Box<dyn Translator> {
    let translation = &config.translation;
    let model = translation.get_model();
    let api_key = translation.get_api_key();
    let endpoint = translation.get_endpoint();
    let timeout_secs = translation.get_timeout_secs();
    let temperature = translation.common.temperature;

    match translation.provider {
        TranslationProvider::Gemini => Box::new(LlmTranslator::new(
            gemini::Gemini::new(api_key, endpoint, model, timeout_secs).with_temperature(temperature),
        )),
        TranslationProvider::Anthropic => Box::new(LlmTranslator::new(
            anthropic::Anthropic::new(api_key, endpoint, model, timeout_secs).with_temperature(temperature),
        )),
    }
}

pub mod anthropic;
pub mod gemini;
pub mod mock;
