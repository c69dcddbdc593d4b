/*!
 * Translation service clients.
 *
 * This module contains client implementations for translation services:
 * - Google: Cloud Translation v3 REST API
 * - Mock: deterministic in-process translator for tests and benchmarks
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation services
///
/// A translator is a black box: given source text and a source/target
/// locale it returns the translated text or fails.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Name used in log lines
    fn name(&self) -> &str;

    /// Translate `text` from `source_locale` into `target_locale`
    ///
    /// # Arguments
    /// * `text` - Non-empty source text
    /// * `source_locale` - Catalog locale of the text
    /// * `target_locale` - Catalog locale to translate into
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> Result<String, ProviderError>;
}

pub mod google;
pub mod mock;
