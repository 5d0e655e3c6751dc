/*!
 * Mock provider implementation for testing.
 *
 * The mock never touches the network. Its default behavior answers every
 * request with a JSON array of tagged "translations"; a script of outcomes
 * can be queued to simulate rate limiting and other failures call by call.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::app_config::ApiKey;
use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation::prompts::TranslationPrompt;

/// Mock request for testing
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// Source texts of the batch
    pub source_texts: Vec<String>,
    /// Target language display name
    pub target_language: String,
    /// System instruction that would have been sent
    pub system_instruction: String,
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Raw reply text
    pub text: String,
}

/// Behavior used when no scripted outcome is queued
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Replies with a JSON array of tagged translations
    Working,
    /// Like `Working`, wrapped in a markdown code fence
    Fenced,
    /// Like `Working`, with the last translation missing
    Short,
    /// Always fails with a rate-limit error
    RateLimited,
    /// Always fails with a server error
    Failing,
    /// Replies after a delay
    Slow { delay_ms: u64 },
}

/// One scripted reaction to a single call
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    /// Reply with this exact text
    Reply(String),
    /// Reply with tagged translations of the request
    Translate,
    /// HTTP 429
    RateLimited,
    /// Rejected credential
    AuthFailure,
    /// HTTP 500
    ServerError,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Fallback behavior
    behavior: MockBehavior,
    /// Outcomes consumed one per call before falling back to `behavior`
    script: Arc<Mutex<VecDeque<MockOutcome>>>,
    /// Number of calls made, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            script: Arc::new(Mutex::new(VecDeque::new())),
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that wraps replies in code fences
    pub fn fenced() -> Self {
        Self::new(MockBehavior::Fenced)
    }

    /// Create a mock that drops the last translation of each batch
    pub fn short() -> Self {
        Self::new(MockBehavior::Short)
    }

    /// Create a mock that is always rate limited
    pub fn rate_limited() -> Self {
        Self::new(MockBehavior::RateLimited)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Working mock that is rate limited for the first `times` calls
    pub fn rate_limited_then_working(times: usize) -> Self {
        Self::working().with_script(std::iter::repeat_n(MockOutcome::RateLimited, times))
    }

    /// Queue outcomes for the next calls
    pub fn with_script(self, outcomes: impl IntoIterator<Item = MockOutcome>) -> Self {
        self.script.lock().extend(outcomes);
        self
    }

    /// Number of `complete` calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// The tagged translation the mock produces for `text`
    pub fn tag(target_language: &str, text: &str) -> String {
        format!("[{}] {}", target_language, text)
    }

    fn translations_json(request: &MockRequest) -> String {
        let translated: Vec<String> = request.source_texts.iter()
            .map(|t| Self::tag(&request.target_language, t))
            .collect();
        serde_json::to_string(&translated).unwrap_or_else(|_| "[]".to_string())
    }

    fn apply(&self, outcome: MockOutcome, request: &MockRequest, count: usize) -> Result<MockResponse, ProviderError> {
        match outcome {
            MockOutcome::Reply(text) => Ok(MockResponse { text }),
            MockOutcome::Translate => Ok(MockResponse { text: Self::translations_json(request) }),
            MockOutcome::RateLimited => Err(ProviderError::RateLimitExceeded(
                format!("Simulated rate limit (request #{})", count),
            )),
            MockOutcome::AuthFailure => Err(ProviderError::AuthenticationError(
                "API key not valid".to_string(),
            )),
            MockOutcome::ServerError => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    fn build_request(&self, prompt: &TranslationPrompt) -> MockRequest {
        MockRequest {
            source_texts: prompt.source_texts.clone(),
            target_language: prompt.target_language.clone(),
            system_instruction: prompt.system_instruction.clone(),
        }
    }

    async fn complete(&self, request: MockRequest, _api_key: &ApiKey) -> Result<MockResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().push(request.clone());

        let scripted = self.script.lock().pop_front();
        if let Some(outcome) = scripted {
            return self.apply(outcome, &request, count);
        }

        match self.behavior {
            MockBehavior::Working => self.apply(MockOutcome::Translate, &request, count),
            MockBehavior::Fenced => Ok(MockResponse {
                text: format!("```json\n{}\n```", Self::translations_json(&request)),
            }),
            MockBehavior::Short => {
                let mut shortened = request.clone();
                shortened.source_texts.pop();
                Ok(MockResponse { text: Self::translations_json(&shortened) })
            }
            MockBehavior::RateLimited => self.apply(MockOutcome::RateLimited, &request, count),
            MockBehavior::Failing => self.apply(MockOutcome::ServerError, &request, count),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                self.apply(MockOutcome::Translate, &request, count)
            }
        }
    }

    fn extract_text(response: &MockResponse) -> String {
        response.text.clone()
    }
}
