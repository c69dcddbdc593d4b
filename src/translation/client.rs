/*!
 * Field-level translation client.
 *
 * Wraps a `Translator` with the rules every field goes through: absent or
 * blank source text is never sent, retryable failures get a bounded number
 * of retries with exponential backoff, and empty results are rejected.
 */

use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::TranslationConfig;
use crate::catalog::models::{AttributeKind, Product};
use crate::errors::{ProviderError, TranslationError};
use crate::providers::Translator;

/// Retry settings for translation requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub retry_count: u32,
    /// Backoff before the first retry, doubled for each following one
    pub backoff: Duration,
}

impl RetryPolicy {
    /// No retries at all
    pub fn none() -> Self {
        Self {
            retry_count: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_count: 2,
            backoff: Duration::from_millis(1000),
        }
    }
}

impl From<&TranslationConfig> for RetryPolicy {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            retry_count: config.retry_count,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

/// Translates single product fields
#[derive(Debug, Clone)]
pub struct TranslationClient {
    translator: Arc<dyn Translator>,
    retry: RetryPolicy,
}

impl TranslationClient {
    /// Create a client around a translator
    pub fn new(translator: Arc<dyn Translator>, retry: RetryPolicy) -> Self {
        Self { translator, retry }
    }

    /// Name of the underlying translator
    pub fn translator_name(&self) -> &str {
        self.translator.name()
    }

    /// Translate one field of a product into the target locale
    pub async fn translate_field(
        &self,
        product: &Product,
        field: AttributeKind,
        source_locale: &str,
        target_locale: &str,
    ) -> Result<String, TranslationError> {
        let text = match product.field(field) {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                return Err(TranslationError::MissingSource {
                    field: field.column(),
                });
            }
        };

        self.translate_text(text, source_locale, target_locale).await
    }

    /// Translate a non-empty text, retrying retryable failures
    pub async fn translate_text(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> Result<String, TranslationError> {
        let mut attempt = 0;

        loop {
            let result = self
                .translator
                .translate(text, source_locale, target_locale)
                .await
                .map_err(TranslationError::from)
                .and_then(|translated| {
                    if translated.trim().is_empty() {
                        Err(TranslationError::EmptyResult)
                    } else {
                        Ok(translated)
                    }
                });

            match result {
                Ok(translated) => return Ok(translated),
                Err(e) if e.is_retryable() && attempt < self.retry.retry_count => {
                    attempt += 1;
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "Translation {} -> {} failed ({}), retry {}/{} in {:?}",
                        source_locale, target_locale, e, attempt, self.retry.retry_count, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(TranslationError::Provider(ProviderError::EmptyResponse)) => {
                    debug!("Translation service returned no translations for {}", target_locale);
                    return Err(TranslationError::EmptyResult);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
