/*!
 * End-to-end runs of the localization pipeline through the controller
 */

use anyhow::Result;
use std::fs;

use seedloc::app_controller::{MANIFEST_FILENAME, REPORT_FILENAME, RUN_LOG_FILENAME};
use seedloc::providers::LlmTranslator;
use seedloc::providers::mock::MockProvider;
use seedloc::translation::TranslationCache;
use seedloc::{Controller, RunOptions};

use crate::common::mock_translators::StubbornTranslator;
use crate::common::{self, DEMO_SEED};

fn seed_output(dir: &std::path::Path) -> Result<String> {
    Ok(fs::read_to_string(dir.join("seed_fr_FR.sql"))?)
}

#[tokio::test]
async fn test_run_withWorkingProvider_shouldWriteLocalizedSeed() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let (schema, seed) = common::write_demo_inputs(temp_dir.path())?;
    let out_dir = temp_dir.path().join("out");

    let controller = Controller::with_config(common::test_config(&["fr_FR"]))?.quiet();
    let translator = LlmTranslator::new(MockProvider::working());
    let cache = TranslationCache::new();
    let report = controller
        .run_with(&RunOptions::new(&schema, &seed, &out_dir), &translator, &cache)
        .await?;

    let sql = seed_output(&out_dir)?;
    assert!(sql.starts_with("-- demo seed\n"));
    assert!(sql.contains("'[fr] Red Shoes'"));
    assert!(sql.contains("'[fr] Blue Hat'"));
    assert!(sql.contains(r#"{"description":"[fr] Comfortable shoes","size":42}"#));
    assert!(sql.contains("'[fr] Visit https://example.com; today'"));
    assert!(sql.contains("'SKU-0001'"));
    assert!(sql.contains("SELECT 1;"));

    assert_eq!(report.profile, "generic");
    assert_eq!(report.total_items, 4);
    assert_eq!(report.unique_sources, 4);
    let summary = report.locale("fr_FR").unwrap();
    assert_eq!(summary.requested, 4);
    assert_eq!(summary.calls, 1);
    assert!(summary.degraded.is_empty());
    assert_eq!(summary.statements_rewritten, 2);
    assert_eq!(summary.values_translated, 4);
    assert_eq!(summary.output_sql.as_deref(), Some(out_dir.join("seed_fr_FR.sql").as_path()));
    Ok(())
}

#[tokio::test]
async fn test_run_shouldWriteManifestTranslationsAndReport() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (schema, seed) = common::write_demo_inputs(temp_dir.path())?;
    let out_dir = temp_dir.path().join("out");

    let controller = Controller::with_config(common::test_config(&["fr_FR"]))?.quiet();
    let translator = LlmTranslator::new(MockProvider::working());
    controller
        .run_with(&RunOptions::new(&schema, &seed, &out_dir), &translator, &TranslationCache::new())
        .await?;

    let manifest: serde_json::Value = serde_json::from_str(&fs::read_to_string(out_dir.join(MANIFEST_FILENAME))?)?;
    let entries = manifest.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["occurrence"], "items:1:title:");
    assert_eq!(entries[1]["occurrence"], "items:1:meta:$.description");
    assert_eq!(entries[3]["occurrence"], "notes:row1:body:");
    assert_eq!(entries[3]["source"], "Visit https://example.com; today");
    assert!(entries[3]["locked"].as_str().unwrap().contains("__PH0__"));

    let dump: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("translations_fr_FR.json"))?)?;
    assert_eq!(dump[0]["target"], "[fr] Red Shoes");

    assert!(out_dir.join("validation_fr_FR.json").exists());
    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(out_dir.join(REPORT_FILENAME))?)?;
    assert_eq!(report["locales"][0]["locale"], "fr_FR");

    let run_log = fs::read_to_string(out_dir.join(RUN_LOG_FILENAME))?;
    assert_eq!(run_log.lines().count(), 1);
    assert!(run_log.contains("fr_FR: 4 requested, 0 cached, 0 degraded"));
    Ok(())
}

#[tokio::test]
async fn test_run_withWarmCache_shouldMakeNoCallsAndMatchFirstOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (schema, seed) = common::write_demo_inputs(temp_dir.path())?;
    let first_dir = temp_dir.path().join("first");
    let second_dir = temp_dir.path().join("second");

    let controller = Controller::with_config(common::test_config(&["fr_FR"]))?.quiet();
    let provider = MockProvider::working();
    let translator = LlmTranslator::new(provider.clone());
    let cache = TranslationCache::new();

    controller
        .run_with(&RunOptions::new(&schema, &seed, &first_dir), &translator, &cache)
        .await?;
    let report = controller
        .run_with(&RunOptions::new(&schema, &seed, &second_dir), &translator, &cache)
        .await?;

    let summary = report.locale("fr_FR").unwrap();
    assert_eq!(summary.calls, 0);
    assert_eq!(summary.from_cache, 4);
    assert_eq!(provider.request_count(), 1);
    assert_eq!(seed_output(&first_dir)?, seed_output(&second_dir)?);
    Ok(())
}

#[tokio::test]
async fn test_run_withDroppedItems_shouldHealWithoutDegrading() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (schema, seed) = common::write_demo_inputs(temp_dir.path())?;
    let out_dir = temp_dir.path().join("out");

    let controller = Controller::with_config(common::test_config(&["fr_FR"]))?.quiet();
    let translator = LlmTranslator::new(MockProvider::drop_once(vec![0, 3]));
    let report = controller
        .run_with(&RunOptions::new(&schema, &seed, &out_dir), &translator, &TranslationCache::new())
        .await?;

    let summary = report.locale("fr_FR").unwrap();
    assert_eq!(summary.calls, 2);
    assert!(summary.degraded.is_empty());
    let sql = seed_output(&out_dir)?;
    assert!(sql.contains("'[fr] Red Shoes'"));
    assert!(sql.contains("'[fr] Visit https://example.com; today'"));
    Ok(())
}

#[tokio::test]
async fn test_run_withFailingProvider_shouldKeepSeedUnchanged() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (schema, seed) = common::write_demo_inputs(temp_dir.path())?;
    let out_dir = temp_dir.path().join("out");

    let controller = Controller::with_config(common::test_config(&["fr_FR"]))?.quiet();
    let translator = LlmTranslator::new(MockProvider::failing());
    let report = controller
        .run_with(&RunOptions::new(&schema, &seed, &out_dir), &translator, &TranslationCache::new())
        .await?;

    let summary = report.locale("fr_FR").unwrap();
    assert_eq!(summary.degraded.len(), 4);
    assert_eq!(summary.calls, 2);
    assert_eq!(summary.statements_rewritten, 0);
    assert_eq!(seed_output(&out_dir)?, DEMO_SEED);
    Ok(())
}

#[tokio::test]
async fn test_run_withDryRun_shouldSkipTranslatorAndSql() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (schema, seed) = common::write_demo_inputs(temp_dir.path())?;
    let out_dir = temp_dir.path().join("out");

    let controller = Controller::with_config(common::test_config(&["fr_FR", "de_DE"]))?.quiet();
    let provider = MockProvider::working();
    let translator = LlmTranslator::new(provider.clone());
    let report = controller
        .run_with(
            &RunOptions::new(&schema, &seed, &out_dir).with_dry_run(true),
            &translator,
            &TranslationCache::new(),
        )
        .await?;

    assert!(report.dry_run);
    assert_eq!(report.locales.len(), 2);
    assert_eq!(provider.request_count(), 0);
    assert!(out_dir.join(MANIFEST_FILENAME).exists());
    assert!(out_dir.join("translations_de_DE.json").exists());
    assert!(!out_dir.join("seed_fr_FR.sql").exists());
    assert!(report.locale("de_DE").unwrap().output_sql.is_none());
    Ok(())
}

#[tokio::test]
async fn test_run_withBomInput_shouldStripIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (schema, _) = common::write_demo_inputs(temp_dir.path())?;
    let seed = common::create_test_file(temp_dir.path(), "bom.sql", &format!("\u{feff}{}", DEMO_SEED))?;
    let out_dir = temp_dir.path().join("out");

    let controller = Controller::with_config(common::test_config(&["fr_FR"]))?.quiet();
    let translator = LlmTranslator::new(MockProvider::working());
    let report = controller
        .run_with(&RunOptions::new(&schema, &seed, &out_dir), &translator, &TranslationCache::new())
        .await?;

    assert_eq!(report.total_items, 4);
    let sql = seed_output(&out_dir)?;
    assert!(!sql.starts_with('\u{feff}'));
    assert!(sql.contains("'[fr] Red Shoes'"));
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (schema, _) = common::write_demo_inputs(temp_dir.path())?;

    let controller = Controller::with_config(common::test_config(&["fr_FR"]))?.quiet();
    let translator = LlmTranslator::new(MockProvider::working());
    let result = controller
        .run_with(
            &RunOptions::new(&schema, temp_dir.path().join("missing.sql"), temp_dir.path().join("out")),
            &translator,
            &TranslationCache::new(),
        )
        .await;

    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_run_withUnknownProfile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (schema, seed) = common::write_demo_inputs(temp_dir.path())?;

    let controller = Controller::with_config(common::test_config(&["fr_FR"]))?.quiet();
    let translator = LlmTranslator::new(MockProvider::working());
    let result = controller
        .run_with(
            &RunOptions::new(&schema, &seed, temp_dir.path().join("out")).with_profile("no-such-profile"),
            &translator,
            &TranslationCache::new(),
        )
        .await;

    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_run_withTitleEnforcement_shouldRetranslateUnchangedTitles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (schema, seed) = common::write_demo_inputs(temp_dir.path())?;
    let out_dir = temp_dir.path().join("out");

    let mut config = common::test_config(&["fr_FR"]);
    config.enforcement.enabled = true;
    let controller = Controller::with_config(config)?.quiet();
    let translator = StubbornTranslator::new();
    let report = controller
        .run_with(&RunOptions::new(&schema, &seed, &out_dir), &translator, &TranslationCache::new())
        .await?;

    let summary = report.locale("fr_FR").unwrap();
    assert_eq!(summary.enforced, 2);
    assert_eq!(*translator.calls.lock().unwrap(), 2);
    let sql = seed_output(&out_dir)?;
    assert!(sql.contains("'Red Shoes (fr)'"));
    assert!(sql.contains("'Blue Hat (fr)'"));
    // Only titles go through the strict pass
    assert!(sql.contains(r#"'{"description": "Comfortable shoes", "size": 42}'"#));
    Ok(())
}

#[tokio::test]
async fn test_run_withConfiguredSchemaHints_shouldSkipNamedColumns() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (schema, seed) = common::write_demo_inputs(temp_dir.path())?;
    let out_dir = temp_dir.path().join("out");

    let mut config = common::test_config(&["fr_FR"]);
    config.schema_hints.exact_skip_names.insert("title".to_string());
    let controller = Controller::with_config(config)?.quiet();
    let translator = LlmTranslator::new(MockProvider::working());
    let report = controller
        .run_with(&RunOptions::new(&schema, &seed, &out_dir), &translator, &TranslationCache::new())
        .await?;

    assert_eq!(report.total_items, 2);
    let sql = seed_output(&out_dir)?;
    assert!(sql.contains("'Red Shoes'"));
    assert!(sql.contains("'Blue Hat'"));
    assert!(sql.contains("[fr] Comfortable shoes"));
    Ok(())
}
