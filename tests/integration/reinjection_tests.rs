/*!
 * Reinjection with per-locale override rules, address pools and
 * warm-cache reruns
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use seedloc::providers::LlmTranslator;
use seedloc::providers::mock::MockProvider;
use seedloc::translation::TranslationCache;
use seedloc::{Controller, RunOptions};

use crate::common;

const AMAZON_SCHEMA: &str = r#"{
  "server_name": "amazon-sp-api",
  "complete_schema": {
    "tables": {
      "orders": {
        "columns": {
          "amazon_order_id": {"type": "VARCHAR(32)"},
          "order_status": {"type": "VARCHAR(32)"},
          "payload": {"type": "JSONB"}
        },
        "primary_keys": ["amazon_order_id"]
      },
      "catalog_items": {
        "columns": {
          "asin": {"type": "VARCHAR(10)"},
          "item_name": {"type": "TEXT"}
        },
        "primary_keys": ["asin"]
      }
    }
  }
}"#;

const AMAZON_SEED: &str = "INSERT INTO orders (amazon_order_id, order_status, payload) VALUES \
('111-0000001-0000001', 'Shipped', '{\"order_total\":{\"currency_code\":\"USD\",\"amount\":\"19.99\"},\
\"marketplace_ids\":[\"ATVPDKIKX0DER\"],\
\"shipping_address\":{\"addressLine1\":\"1 Main St\",\"city\":\"Seattle\",\"postalCode\":\"98101\",\"countryCode\":\"US\"}}');\n\
INSERT INTO catalog_items (asin, item_name) VALUES ('B000TEST01', 'Wireless Mouse');\n";

/// Translates the product name only; everything else comes back unchanged
fn catalog_provider() -> MockProvider {
    MockProvider::working().with_translation(|text| match text {
        "Wireless Mouse" => "Souris sans fil".to_string(),
        other => other.to_string(),
    })
}

fn write_amazon_inputs(dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let schema = common::create_test_file(dir, "schema.json", AMAZON_SCHEMA)?;
    let seed = common::create_test_file(dir, "seed.sql", AMAZON_SEED)?;
    Ok((schema, seed))
}

#[tokio::test]
async fn test_run_withAmazonSchema_shouldApplyLocaleOverrides() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let (schema, seed) = write_amazon_inputs(temp_dir.path())?;
    let out_dir = temp_dir.path().join("out");

    let controller = Controller::with_config(common::test_config(&["fr_FR"]))?.quiet();
    let translator = LlmTranslator::new(catalog_provider());
    let report = controller
        .run_with(&RunOptions::new(&schema, &seed, &out_dir), &translator, &TranslationCache::new())
        .await?;

    assert_eq!(report.profile, "amazon");
    let sql = fs::read_to_string(out_dir.join("seed_fr_FR.sql"))?;
    assert!(sql.contains("'Expédié'"));
    assert!(sql.contains(r#""currency_code":"EUR""#));
    assert!(sql.contains(r#""amount":"19.99""#));
    assert!(sql.contains(r#"["A13V1IB3VIYZZH"]"#));
    assert!(!sql.contains("ATVPDKIKX0DER"));
    assert!(sql.contains(r#""countryCode":"FR""#));
    assert!(!sql.contains("Seattle"));
    assert!(sql.contains("'111-0000001-0000001'"));
    assert!(sql.contains("'Souris sans fil'"));
    assert!(sql.contains("'B000TEST01'"));

    let summary = report.locale("fr_FR").unwrap();
    assert!(summary.overrides_applied >= 4);
    assert_eq!(summary.values_translated, 1);
    Ok(())
}

#[tokio::test]
async fn test_run_withSecondLocale_shouldUseThatLocalesRules() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (schema, seed) = write_amazon_inputs(temp_dir.path())?;
    let out_dir = temp_dir.path().join("out");

    let controller = Controller::with_config(common::test_config(&["fr_FR", "pt_BR"]))?.quiet();
    let translator = LlmTranslator::new(catalog_provider());
    controller
        .run_with(&RunOptions::new(&schema, &seed, &out_dir), &translator, &TranslationCache::new())
        .await?;

    let sql = fs::read_to_string(out_dir.join("seed_pt_BR.sql"))?;
    assert!(sql.contains("'Enviado'"));
    assert!(sql.contains(r#""currency_code":"BRL""#));
    assert!(sql.contains(r#"["A2Q3Y263D00KWC"]"#));
    assert!(sql.contains(r#""countryCode":"BR""#));
    Ok(())
}

#[tokio::test]
async fn test_run_withWarmCache_shouldReproduceOverridesExactly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (schema, seed) = write_amazon_inputs(temp_dir.path())?;
    let first_dir = temp_dir.path().join("first");
    let second_dir = temp_dir.path().join("second");

    let controller = Controller::with_config(common::test_config(&["fr_FR"]))?.quiet();
    let provider = catalog_provider();
    let translator = LlmTranslator::new(provider.clone());
    let cache = TranslationCache::new();

    controller
        .run_with(&RunOptions::new(&schema, &seed, &first_dir), &translator, &cache)
        .await?;
    let calls_after_first = provider.request_count();
    let report = controller
        .run_with(&RunOptions::new(&schema, &seed, &second_dir), &translator, &cache)
        .await?;

    assert_eq!(report.locale("fr_FR").unwrap().calls, 0);
    assert_eq!(provider.request_count(), calls_after_first);
    assert_eq!(
        fs::read_to_string(first_dir.join("seed_fr_FR.sql"))?,
        fs::read_to_string(second_dir.join("seed_fr_FR.sql"))?
    );
    Ok(())
}

#[tokio::test]
async fn test_run_withProfileFile_shouldApplyItsRules() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (schema, seed) = common::write_demo_inputs(temp_dir.path())?;
    let profile = common::create_test_file(
        temp_dir.path(),
        "shop_profile.json",
        r#"{
          "id": "shop",
          "json_string_keys": ["description"],
          "overrides_by_locale": {
            "de_DE": [
              {"table": "items", "column": "title", "map_values": {"Blue Hat": "Blauer Hut"}},
              {"table": "items", "column": "sku", "value": "SKU-DE"}
            ]
          }
        }"#,
    )?;
    let out_dir = temp_dir.path().join("out");

    let controller = Controller::with_config(common::test_config(&["de_DE"]))?.quiet();
    let translator = LlmTranslator::new(MockProvider::working().with_translation(|text| text.to_string()));
    let report = controller
        .run_with(
            &RunOptions::new(&schema, &seed, &out_dir).with_profile(profile.to_string_lossy()),
            &translator,
            &TranslationCache::new(),
        )
        .await?;

    assert_eq!(report.profile, "shop");
    let sql = fs::read_to_string(out_dir.join("seed_de_DE.sql"))?;
    assert!(sql.contains("'Blauer Hut'"));
    assert!(sql.contains("'Red Shoes'"));
    assert_eq!(sql.matches("'SKU-DE'").count(), 2);
    assert_eq!(report.locale("de_DE").unwrap().overrides_applied, 3);
    Ok(())
}
