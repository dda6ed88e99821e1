use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::language_utils;
use crate::schema_model::SchemaHints;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Locales to produce, e.g. `fr_FR`
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,

    /// Language of the seed text (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Validation thresholds
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Persistent cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Title enforcement pass
    #[serde(default)]
    pub enforcement: EnforcementConfig,

    /// Column-name and type rules for picking translatable columns
    #[serde(default)]
    pub schema_hints: SchemaHints,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: Anthropic
    Anthropic,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }

    // @returns: Environment variable holding the API key
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::Gemini => Self {
                provider_type: "gemini".to_string(),
                model: default_gemini_model(),
                api_key: String::new(),
                endpoint: default_gemini_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            TranslationProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                timeout_secs: default_anthropic_timeout_secs(),
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Maximum translator calls per second
    #[serde(default = "default_qps")]
    pub qps: f64,

    /// Character budget of one batch request
    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,

    /// Attempts per request before its items keep their source text
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base of the exponential backoff in seconds
    #[serde(default = "default_backoff_base")]
    pub backoff_base: f64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            qps: default_qps(),
            max_chars_per_request: default_max_chars_per_request(),
            retry_count: default_retry_count(),
            backoff_base: default_backoff_base(),
            temperature: default_temperature(),
        }
    }
}

/// Length ratio bounds of the validator
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ValidationConfig {
    #[serde(default = "default_length_ratio_min")]
    pub length_ratio_min: f64,

    #[serde(default = "default_length_ratio_max")]
    pub length_ratio_max: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            length_ratio_min: default_length_ratio_min(),
            length_ratio_max: default_length_ratio_max(),
        }
    }
}

/// Persistent translation cache settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Use the SQLite cache; when off an in-memory cache is used
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Database file, defaults to the user data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

/// Re-translation of title-like values that came back unchanged
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EnforcementConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Column names the pass looks at
    #[serde(default = "default_enforcement_columns")]
    pub columns: Vec<String>,

    /// Restrict to these tables; empty means all
    #[serde(default)]
    pub tables: Vec<String>,

    /// Upper bound of occurrences re-translated per locale
    #[serde(default = "default_enforcement_max")]
    pub max_occurrences: usize,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            columns: default_enforcement_columns(),
            tables: Vec::new(),
            max_occurrences: default_enforcement_max(),
        }
    }
}

impl EnforcementConfig {
    /// Whether an occurrence in `table.column` is subject to enforcement
    pub fn applies_to(&self, table: &str, column: &str) -> bool {
        let column_ok = self.columns.iter().any(|c| c.eq_ignore_ascii_case(column));
        let table_ok = self.tables.is_empty() || self.tables.iter().any(|t| t.eq_ignore_ascii_case(table));
        column_ok && table_ok
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_locales() -> Vec<String> {
    vec!["fr_FR".to_string()]
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_qps() -> f64 {
    1.0
}

fn default_max_chars_per_request() -> usize {
    8000
}

fn default_timeout_secs() -> u64 {
    90
}

fn default_anthropic_timeout_secs() -> u64 {
    120
}

/// Largest accepted `backoff_base`; waits are also capped per attempt
pub const MAX_BACKOFF_BASE: f64 = 10.0;

/// Largest accepted `retry_count`
pub const MAX_RETRY_COUNT: u32 = 20;

fn default_retry_count() -> u32 {
    5
}

fn default_backoff_base() -> f64 {
    1.5
}

fn default_temperature() -> f32 {
    0.0
}

fn default_length_ratio_min() -> f64 {
    crate::validation::length::DEFAULT_MIN_LENGTH_RATIO
}

fn default_length_ratio_max() -> f64 {
    crate::validation::length::DEFAULT_MAX_LENGTH_RATIO
}

fn default_enforcement_columns() -> Vec<String> {
    vec!["title".to_string(), "item_name".to_string()]
}

fn default_enforcement_max() -> usize {
    500
}

fn default_true() -> bool {
    true
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku".to_string()
}

impl Config {
    /// Load a config file, writing the default one if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))
        } else {
            log::warn!("Config file not found at {:?}, creating default config.", path);
            let config = Config::default();
            let config_json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize default config to JSON")?;
            std::fs::write(path, config_json)
                .with_context(|| format!("Failed to write default config to file: {:?}", path))?;
            Ok(config)
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        language_utils::validate_locale(&self.source_language)
            .with_context(|| format!("Invalid source language: {}", self.source_language))?;

        if self.locales.is_empty() {
            return Err(anyhow!("At least one target locale is required"));
        }
        for locale in &self.locales {
            language_utils::validate_locale(locale)
                .with_context(|| format!("Invalid locale in configuration: {}", locale))?;
        }

        let validation = &self.validation;
        if validation.length_ratio_min <= 0.0 || validation.length_ratio_min >= validation.length_ratio_max {
            return Err(anyhow!(
                "Invalid length ratio bounds: [{}, {}]",
                validation.length_ratio_min,
                validation.length_ratio_max
            ));
        }

        let common = &self.translation.common;
        if common.qps <= 0.0 {
            return Err(anyhow!("qps must be positive, got {}", common.qps));
        }
        if common.max_chars_per_request == 0 {
            return Err(anyhow!("max_chars_per_request must be positive"));
        }
        if !common.backoff_base.is_finite() || !(0.0..=MAX_BACKOFF_BASE).contains(&common.backoff_base) {
            return Err(anyhow!(
                "backoff_base must be between 0 and {}, got {}",
                MAX_BACKOFF_BASE,
                common.backoff_base
            ));
        }
        if common.retry_count > MAX_RETRY_COUNT {
            return Err(anyhow!(
                "retry_count must be at most {}, got {}",
                MAX_RETRY_COUNT,
                common.retry_count
            ));
        }

        Ok(())
    }

    /// Validation plus the API key check, needed only when a translator is called
    pub fn validate_for_translation(&self) -> Result<()> {
        self.validate()?;
        if self.translation.get_api_key().is_empty() {
            return Err(anyhow!(
                "Translation API key is required for {} provider (set it in the config or {})",
                self.translation.provider.display_name(),
                self.translation.provider.api_key_env_var()
            ));
        }
        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            locales: default_locales(),
            source_language: default_source_language(),
            translation: TranslationConfig::default(),
            validation: ValidationConfig::default(),
            cache: CacheConfig::default(),
            enforcement: EnforcementConfig::default(),
            schema_hints: SchemaHints::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::Gemini => default_gemini_model(),
            TranslationProvider::Anthropic => default_anthropic_model(),
        }
    }

    /// Set the model of the active provider, adding its entry if missing
    pub fn set_model(&mut self, model: &str) {
        let provider = self.provider;
        let provider_str = provider.to_lowercase_string();
        match self
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            Some(provider_config) => provider_config.model = model.to_string(),
            None => {
                let mut provider_config = ProviderConfig::new(provider);
                provider_config.model = model.to_string();
                self.available_providers.push(provider_config);
            }
        }
    }

    /// Get the API key for the active provider, falling back to its environment variable
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        std::env::var(self.provider.api_key_env_var()).unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::Gemini => default_gemini_endpoint(),
            TranslationProvider::Anthropic => default_anthropic_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        match self.get_active_provider_config() {
            Some(provider_config) if provider_config.timeout_secs > 0 => provider_config.timeout_secs,
            _ => match self.provider {
                TranslationProvider::Gemini => default_timeout_secs(),
                TranslationProvider::Anthropic => default_anthropic_timeout_secs(),
            },
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Gemini),
                ProviderConfig::new(TranslationProvider::Anthropic),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
