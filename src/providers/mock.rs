/*!
 * Mock provider implementations for testing.
 *
 * The mock reads the `{"i","t"}` payload out of the user prompt and answers
 * with a translation of each item, shaped according to its behavior:
 * - `MockProvider::working()` - indexed JSON array of every item
 * - `MockProvider::positional()` - plain array of strings
 * - `MockProvider::fenced()` - indexed array wrapped in a markdown code fence
 * - `MockProvider::drop_once(..)` - leaves out some indices on the first call only
 * - `MockProvider::garbage()` - prose without any JSON
 * - `MockProvider::failing()` - always errors
 * - `MockProvider::empty()` - empty body
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation::prompts::extract_payload;
use crate::translation::translator::BatchItem;

/// Mock request for testing
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub system: String,
    pub user: String,
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub text: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Answers every item as an indexed JSON array
    Working,
    /// Answers a plain list of strings
    Positional,
    /// Wraps the indexed answer in a code fence with chatter around it
    Fenced,
    /// Leaves out these indices on the first call, answers fully afterwards
    DropOnce(Vec<usize>),
    /// Replies with prose only
    Garbage,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns an empty body
    Empty,
}

type TranslateFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Mock provider for testing translation behavior
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
    /// Per-item translation
    translate: TranslateFn,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("behavior", &self.behavior)
            .field("request_count", &self.request_count.load(Ordering::SeqCst))
            .finish()
    }
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            translate: Arc::new(|text: &str| format!("[fr] {}", text)),
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn positional() -> Self {
        Self::new(MockBehavior::Positional)
    }

    pub fn fenced() -> Self {
        Self::new(MockBehavior::Fenced)
    }

    pub fn drop_once(indices: Vec<usize>) -> Self {
        Self::new(MockBehavior::DropOnce(indices))
    }

    pub fn garbage() -> Self {
        Self::new(MockBehavior::Garbage)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Set the per-item translation function
    pub fn with_translation(mut self, translate: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.translate = Arc::new(translate);
        self
    }

    /// Number of requests completed or failed so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn indexed_json(&self, items: &[BatchItem]) -> String {
        let translated: Vec<BatchItem> = items
            .iter()
            .map(|item| BatchItem::new(item.index, (self.translate)(&item.text)))
            .collect();
        serde_json::to_string(&translated).unwrap_or_default()
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            request_count: Arc::clone(&self.request_count),
            translate: Arc::clone(&self.translate),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    fn build_request(&self, system: &str, user: &str) -> MockRequest {
        MockRequest {
            system: system.to_string(),
            user: user.to_string(),
        }
    }

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let items = extract_payload(&request.user).unwrap_or_default();

        let text = match &self.behavior {
            MockBehavior::Working => self.indexed_json(&items),
            MockBehavior::Positional => {
                let texts: Vec<String> = items.iter().map(|item| (self.translate)(&item.text)).collect();
                serde_json::to_string(&texts).unwrap_or_default()
            }
            MockBehavior::Fenced => format!("Here you go:\n```json\n{}\n```\n", self.indexed_json(&items)),
            MockBehavior::DropOnce(indices) => {
                if count == 0 {
                    let kept: Vec<BatchItem> = items
                        .iter()
                        .filter(|item| !indices.contains(&item.index))
                        .cloned()
                        .collect();
                    self.indexed_json(&kept)
                } else {
                    self.indexed_json(&items)
                }
            }
            MockBehavior::Garbage => "I am sorry, I cannot help with that.".to_string(),
            MockBehavior::Intermittent { fail_every } => {
                if *fail_every > 0 && count % fail_every == fail_every - 1 {
                    return Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    });
                }
                self.indexed_json(&items)
            }
            MockBehavior::Failing => {
                return Err(ProviderError::ApiError {
                    message: "Simulated provider failure".to_string(),
                    status_code: 500,
                });
            }
            MockBehavior::Empty => String::new(),
        };

        Ok(MockResponse { text })
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}
