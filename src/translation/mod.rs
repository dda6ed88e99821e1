/*!
 * Translation of locked texts through a batch translator.
 *
 * - `translator`: the batch contract providers implement
 * - `prompts`: instructions sent to LLM services and reply parsing
 * - `cache`: the translation store contract and an in-memory store
 * - `orchestrator`: dedupe, cache, batching and self-healing retries
 */

pub mod cache;
pub mod orchestrator;
pub mod prompts;
pub mod translator;

pub use self::cache::{TranslationCache, TranslationStore};
pub use self::orchestrator::{MAX_BACKOFF, OrchestratorConfig, TranslateOptions, TranslationOrchestrator, TranslationOutcome, backoff_delay};
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder, parse_batch_response};
pub use self::translator::{BatchItem, BatchResponse, Translator};
