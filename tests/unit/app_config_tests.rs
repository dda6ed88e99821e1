/*!
 * Tests for application configuration
 */

use anyhow::Result;
use std::str::FromStr;

use seedloc::app_config::{Config, TranslationProvider};

use crate::common;

#[test]
fn test_default_config_shouldValidate() {
    let config = Config::default();

    assert_eq!(config.locales, vec!["fr_FR".to_string()]);
    assert_eq!(config.source_language, "en");
    assert_eq!(config.translation.provider, TranslationProvider::Gemini);
    assert!(config.cache.enabled);
    assert!(!config.enforcement.enabled);
    assert!(config.validate().is_ok());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.locales, config.locales);
    assert_eq!(reloaded.translation.common.max_chars_per_request, 8000);
    Ok(())
}

#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{"locales": ["de_DE", "ja_JP"], "translation": {"provider": "anthropic"}}"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.locales, vec!["de_DE".to_string(), "ja_JP".to_string()]);
    assert_eq!(config.translation.provider, TranslationProvider::Anthropic);
    assert_eq!(config.translation.common.retry_count, 5);
    assert_eq!(config.translation.get_endpoint(), "https://api.anthropic.com");
    Ok(())
}

#[test]
fn test_loadOrCreate_withSchemaHints_shouldReplaceOnlyGivenRules() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{"schema_hints": {"exact_skip_names": ["title"], "text_types": ["TEXT"]}}"#,
    )?;

    let config = Config::load_or_create(&path)?;
    let hints = &config.schema_hints;

    assert!(!hints.is_translatable("title", "TEXT"));
    assert!(hints.is_translatable("id", "TEXT"));
    assert!(!hints.is_translatable("body", "VARCHAR(64)"));
    assert!(!hints.is_translatable("owner_id", "TEXT"));
    Ok(())
}

#[test]
fn test_loadOrCreate_withMalformedFile_shouldFail() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

#[test]
fn test_providerFromStr_shouldAcceptAnyCase() {
    assert_eq!(TranslationProvider::from_str("Gemini").unwrap(), TranslationProvider::Gemini);
    assert_eq!(TranslationProvider::from_str("ANTHROPIC").unwrap(), TranslationProvider::Anthropic);
    assert!(TranslationProvider::from_str("openai").is_err());
}

#[test]
fn test_validate_withNoLocales_shouldFail() {
    let mut config = Config::default();
    config.locales.clear();

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withInvertedRatios_shouldFail() {
    let mut config = Config::default();
    config.validation.length_ratio_min = 3.0;

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withZeroQps_shouldFail() {
    let mut config = Config::default();
    config.translation.common.qps = 0.0;

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withUnboundedBackoff_shouldFail() {
    let mut config = Config::default();
    config.translation.common.backoff_base = 100.0;
    assert!(config.validate().is_err());

    config.translation.common.backoff_base = f64::INFINITY;
    assert!(config.validate().is_err());

    config.translation.common.backoff_base = -1.0;
    assert!(config.validate().is_err());

    config.translation.common.backoff_base = 2.0;
    config.translation.common.retry_count = 1000;
    assert!(config.validate().is_err());

    config.translation.common.retry_count = 3;
    assert!(config.validate().is_ok());
}

#[test]
fn test_setModel_shouldUpdateActiveProvider() {
    let mut config = Config::default();
    config.translation.set_model("gemini-2.5-pro");

    assert_eq!(config.translation.get_model(), "gemini-2.5-pro");
}

#[test]
fn test_enforcement_appliesTo_shouldMatchColumnsCaseInsensitively() {
    let config = Config::default();

    assert!(config.enforcement.applies_to("catalog_items", "Item_Name"));
    assert!(!config.enforcement.applies_to("catalog_items", "description"));
}
