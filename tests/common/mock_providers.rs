/*!
 * Translators for pipeline tests, built on the library mock
 */

use std::sync::Arc;

use catalog_translator::errors::ProviderError;
use catalog_translator::providers::mock::{MockRequest, MockTranslator};

/// Translator that applies `[loc]text` to everything
pub fn identity_translator() -> Arc<MockTranslator> {
    Arc::new(MockTranslator::working())
}

/// Translator that fails only on the short description for German
pub fn failing_short_description_for_de() -> Arc<MockTranslator> {
    fn rule(request: &MockRequest) -> bool {
        request.target_locale == "de" && request.text == "Stoel."
    }
    Arc::new(MockTranslator::working().fail_when(rule))
}

/// Translator that fails every request to the given locale with a permanent error
pub fn failing_for_fr() -> Arc<MockTranslator> {
    Arc::new(
        MockTranslator::working()
            .fail_when(|request| request.target_locale == "fr")
            .with_failure(|| ProviderError::AuthenticationError("quota project denied".to_string())),
    )
}
