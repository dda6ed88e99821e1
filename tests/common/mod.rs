/*!
 * Common test utilities for the seedloc test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use seedloc::app_config::Config;

// Scripted translators
pub mod mock_translators;

/// Initialise test logging once; later calls are no-ops
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Config tuned for tests: no throttling, no backoff, a single locale
pub fn test_config(locales: &[&str]) -> Config {
    let mut config = Config::default();
    config.locales = locales.iter().map(|l| l.to_string()).collect();
    config.translation.common.qps = 1000.0;
    config.translation.common.backoff_base = 0.0;
    config.translation.common.retry_count = 2;
    config.cache.enabled = false;
    config
}

/// Schema export with a keyed table, a JSON column and a table without primary key
pub const DEMO_SCHEMA: &str = r#"{
  "server_name": "demo-shop",
  "complete_schema": {
    "tables": {
      "items": {
        "columns": {
          "id": {"type": "INTEGER"},
          "title": {"type": "TEXT"},
          "meta": {"type": "JSONB"},
          "sku": {"type": "TEXT"}
        },
        "primary_keys": ["id"]
      },
      "notes": {
        "columns": {
          "body": {"type": "TEXT"}
        }
      }
    }
  }
}"#;

/// Seed file matching `DEMO_SCHEMA`
pub const DEMO_SEED: &str = "-- demo seed\n\
INSERT INTO items (id, title, meta, sku) VALUES\n  \
(1, 'Red Shoes', '{\"description\": \"Comfortable shoes\", \"size\": 42}', 'SKU-0001'),\n  \
(2, 'Blue Hat', NULL, 'SKU-0002');\n\
INSERT INTO notes (body) VALUES ('Visit https://example.com; today');\n\
SELECT 1;\n";

/// Write the demo schema and seed into `dir`, returning their paths
pub fn write_demo_inputs(dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let schema = create_test_file(dir, "schema.json", DEMO_SCHEMA)?;
    let seed = create_test_file(dir, "seed.sql", DEMO_SEED)?;
    Ok((schema, seed))
}
