/*!
 * Mock translator for tests and benchmarks.
 *
 * - `MockTranslator::working()` - prefixes the text with the target locale
 * - `MockTranslator::failing()` - always fails with an error
 * - `MockTranslator::empty()` - returns an empty string
 * - `fail_when(...)` - fails only for matching requests
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::Translator;
use crate::errors::ProviderError;

/// A request received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source locale
    pub source_locale: String,
    /// Target locale
    pub target_locale: String,
}

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with `[<target>]<text>`
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns an empty translation
    Empty,
}

/// Predicate selecting requests that should fail
pub type FailureRule = fn(&MockRequest) -> bool;

/// Mock translator recording every request it receives
#[derive(Debug)]
pub struct MockTranslator {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Requests that fail regardless of behavior
    failure_rule: Option<FailureRule>,
    /// Error returned on failure
    failure: fn() -> ProviderError,
    /// Every request, in call order
    requests: Mutex<Vec<MockRequest>>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            failure_rule: None,
            failure: || ProviderError::ApiError {
                status_code: 400,
                message: "Mock translation failure".to_string(),
            },
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a working mock translator
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock translator
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock translator
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty translations
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Fail every request matching the rule
    pub fn fail_when(mut self, rule: FailureRule) -> Self {
        self.failure_rule = Some(rule);
        self
    }

    /// Use a different error for failures
    pub fn with_failure(mut self, failure: fn() -> ProviderError) -> Self {
        self.failure = failure;
        self
    }

    /// The deterministic translation the working mock produces
    pub fn expected_translation(text: &str, target_locale: &str) -> String {
        format!("[{}]{}", target_locale, text)
    }

    /// Get the number of requests made
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        let request = MockRequest {
            text: text.to_string(),
            source_locale: source_locale.to_string(),
            target_locale: target_locale.to_string(),
        };
        self.requests.lock().push(request.clone());

        if self.failure_rule.is_some_and(|rule| rule(&request)) {
            return Err((self.failure)());
        }

        match self.behavior {
            MockBehavior::Working => Ok(Self::expected_translation(text, target_locale)),
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == 0 {
                    Err((self.failure)())
                } else {
                    Ok(Self::expected_translation(text, target_locale))
                }
            }
            MockBehavior::Failing => Err((self.failure)()),
            MockBehavior::Empty => Ok(String::new()),
        }
    }
}
