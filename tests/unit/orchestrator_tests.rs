/*!
 * Tests for the translation orchestrator through the public API
 */

use seedloc::providers::LlmTranslator;
use seedloc::providers::mock::MockProvider;
use seedloc::translation::{
    MAX_BACKOFF, OrchestratorConfig, TranslateOptions, TranslationCache, TranslationOrchestrator,
    TranslationStore, backoff_delay,
};
use std::time::Duration;

use crate::common::mock_translators::{OmittingTranslator, ScriptedTranslator};

fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        max_chars_per_request: 8000,
        max_retries: 2,
        backoff_base: 0.0,
        qps: 1000.0,
    }
}

fn sources(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn test_translateAll_withDuplicates_shouldRequestEachSourceOnce() {
    let translator = ScriptedTranslator::new().answer("Hello", "Bonjour");
    let cache = TranslationCache::new();
    let mut orchestrator = TranslationOrchestrator::new(&translator, &cache, fast_config());

    let outcome = orchestrator
        .translate_all(&sources(&["Hello", "World", "Hello"]), "fr_FR", TranslateOptions::default())
        .await;

    assert_eq!(outcome.get("Hello"), Some("Bonjour"));
    assert_eq!(outcome.get("World"), Some("[fr] World"));
    assert_eq!(outcome.requested, 2);
    assert_eq!(translator.call_count(), 1);
    assert_eq!(translator.requests.lock().unwrap()[0], vec!["Hello", "World"]);
}

#[tokio::test]
async fn test_translateAll_withWarmCache_shouldSkipTranslator() {
    let translator = ScriptedTranslator::new();
    let cache = TranslationCache::new();
    cache.put("Hello", "de_DE", "Hallo").await.unwrap();
    let mut orchestrator = TranslationOrchestrator::new(&translator, &cache, fast_config());

    let outcome = orchestrator
        .translate_all(&sources(&["Hello"]), "de_DE", TranslateOptions::default())
        .await;

    assert_eq!(outcome.get("Hello"), Some("Hallo"));
    assert_eq!(outcome.from_cache, 1);
    assert_eq!(outcome.calls, 0);
    assert_eq!(translator.call_count(), 0);
}

#[tokio::test]
async fn test_translateAll_withBypassCache_shouldOverwriteCachedValue() {
    let translator = ScriptedTranslator::new().answer("Title", "Titre");
    let cache = TranslationCache::new();
    cache.put("Title", "fr_FR", "Title").await.unwrap();
    let mut orchestrator = TranslationOrchestrator::new(&translator, &cache, fast_config());

    let outcome = orchestrator
        .translate_all(
            &sources(&["Title"]),
            "fr_FR",
            TranslateOptions {
                extra_rules: Some("STRICT"),
                bypass_cache: true,
            },
        )
        .await;

    assert_eq!(outcome.get("Title"), Some("Titre"));
    assert_eq!(cache.get("Title", "fr_FR").await.unwrap().as_deref(), Some("Titre"));
    assert_eq!(translator.rules.lock().unwrap()[0].as_deref(), Some("STRICT"));
}

#[tokio::test]
async fn test_translateAll_withDroppedIndices_shouldRecoverThemOnRetry() {
    let translator = LlmTranslator::new(MockProvider::drop_once(vec![2, 5]));
    let cache = TranslationCache::new();
    let mut orchestrator = TranslationOrchestrator::new(&translator, &cache, fast_config());
    let texts = sources(&["a", "b", "c", "d", "e", "f"]);

    let outcome = orchestrator.translate_all(&texts, "fr_FR", TranslateOptions::default()).await;

    assert!(outcome.degraded.is_empty());
    assert_eq!(outcome.calls, 2);
    assert_eq!(translator.provider().request_count(), 2);
    for text in &texts {
        assert_eq!(outcome.get(text), Some(format!("[fr] {}", text).as_str()));
    }
}

#[tokio::test]
async fn test_translateAll_withPermanentlyOmittedItem_shouldDegradeOnlyThatItem() {
    let translator = OmittingTranslator::new("stuck");
    let cache = TranslationCache::new();
    let mut orchestrator = TranslationOrchestrator::new(&translator, &cache, fast_config());

    let outcome = orchestrator
        .translate_all(&sources(&["one", "stuck", "two"]), "fr_FR", TranslateOptions::default())
        .await;

    assert_eq!(outcome.degraded, vec!["stuck".to_string()]);
    assert_eq!(outcome.get("stuck"), Some("stuck"));
    assert_eq!(outcome.get("one"), Some("<one>"));
    // Degraded items are not cached, so the next run asks again
    assert!(cache.get("stuck", "fr_FR").await.unwrap().is_none());
    // The retry already asked for the item alone
    assert_eq!(*translator.calls.lock().unwrap(), 2);
}

#[tokio::test]
async fn test_translateAll_withFailingProvider_shouldDegradeEverything() {
    let translator = LlmTranslator::new(MockProvider::failing());
    let cache = TranslationCache::new();
    let mut orchestrator = TranslationOrchestrator::new(&translator, &cache, fast_config());

    let outcome = orchestrator
        .translate_all(&sources(&["x", "y"]), "fr_FR", TranslateOptions::default())
        .await;

    assert_eq!(outcome.degraded.len(), 2);
    assert_eq!(outcome.calls, 2);
    assert_eq!(outcome.get("x"), Some("x"));
}

#[tokio::test]
async fn test_translateAll_withSmallBudget_shouldSplitIntoBatches() {
    let translator = ScriptedTranslator::new();
    let cache = TranslationCache::new();
    let config = OrchestratorConfig {
        max_chars_per_request: 10,
        ..fast_config()
    };
    let mut orchestrator = TranslationOrchestrator::new(&translator, &cache, config);

    let outcome = orchestrator
        .translate_all(&sources(&["aaaaaa", "bbbbbb", "cccccc"]), "fr_FR", TranslateOptions::default())
        .await;

    assert_eq!(outcome.translations.len(), 3);
    assert_eq!(translator.call_count(), 3);
}

#[test]
fn test_backoffDelay_withHugeBaseAndAttempt_shouldClampToMaximum() {
    assert_eq!(backoff_delay(100.0, 10), MAX_BACKOFF);
    assert_eq!(backoff_delay(f64::INFINITY, 1), MAX_BACKOFF);
    assert_eq!(backoff_delay(2.0, u32::MAX), MAX_BACKOFF);
}

#[test]
fn test_backoffDelay_withSmallBase_shouldGrowWithAttempt() {
    let first = backoff_delay(1.5, 0);
    assert!(first >= Duration::from_secs(1) && first < Duration::from_millis(1600));

    let third = backoff_delay(1.5, 2);
    assert!(third >= Duration::from_millis(2250) && third < Duration::from_millis(2850));
}
