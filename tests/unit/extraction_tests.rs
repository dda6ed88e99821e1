/*!
 * Tests for occurrence extraction over a schema export
 */

use std::collections::BTreeMap;

use seedloc::extraction::ValueExtractor;
use seedloc::profile::DomainProfile;
use seedloc::schema_model::{JsonSchemaModel, SchemaHints};

use crate::common::{DEMO_SCHEMA, DEMO_SEED};

fn demo_schema() -> JsonSchemaModel {
    let document: serde_json::Value = serde_json::from_str(DEMO_SCHEMA).unwrap();
    JsonSchemaModel::from_value(&document, &SchemaHints::default(), &BTreeMap::new()).unwrap()
}

#[test]
fn test_extract_withDemoSeed_shouldFindScalarAndJsonText() {
    let schema = demo_schema();
    let profile = DomainProfile::builtin("generic").unwrap();
    let items = ValueExtractor::new(&schema, &profile).extract(DEMO_SEED);

    let keys: Vec<String> = items.iter().map(|i| i.key.render()).collect();
    assert_eq!(
        keys,
        vec![
            "items:1:title:",
            "items:1:meta:$.description",
            "items:2:title:",
            "notes:row1:body:",
        ]
    );
    assert_eq!(items[1].value, "Comfortable shoes");
    assert_eq!(items[3].value, "Visit https://example.com; today");
}

#[test]
fn test_extract_withSkippedColumns_shouldIgnoreIdentifiers() {
    let schema = demo_schema();
    let profile = DomainProfile::builtin("generic").unwrap();
    let items = ValueExtractor::new(&schema, &profile).extract(DEMO_SEED);

    assert!(items.iter().all(|i| i.column() != "sku" && i.column() != "id"));
}

#[test]
fn test_extract_withUnknownTable_shouldYieldNothing() {
    let schema = demo_schema();
    let profile = DomainProfile::builtin("generic").unwrap();
    let items = ValueExtractor::new(&schema, &profile).extract("INSERT INTO other (title) VALUES ('x');");

    assert!(items.is_empty());
}

#[test]
fn test_extract_withEscapedQuote_shouldUnescapeValue() {
    let schema = demo_schema();
    let profile = DomainProfile::builtin("generic").unwrap();
    let items = ValueExtractor::new(&schema, &profile)
        .extract("INSERT INTO items (id, title) VALUES (5, 'Kid''s Hat');");

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].value, "Kid's Hat");
    assert_eq!(items[0].key.render(), "items:5:title:");
}
