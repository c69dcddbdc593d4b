use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Translator;
use crate::app_config::{MimeType, TranslationConfig};
use crate::errors::ProviderError;
use crate::locale_utils;

/// Client for the Google Cloud Translation v3 REST API
pub struct GoogleTranslate {
    /// HTTP client for API requests
    client: Client,
    /// API endpoint URL
    endpoint: String,
    /// Cloud project id
    project_id: String,
    /// Cloud location
    location: String,
    /// OAuth access token
    access_token: String,
    /// Content type of the texts
    mime_type: MimeType,
}

impl std::fmt::Debug for GoogleTranslate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslate")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("location", &self.location)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

/// translateText request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateTextRequest {
    /// Texts to translate
    pub contents: Vec<String>,
    /// BCP 47 source code
    pub source_language_code: String,
    /// BCP 47 target code
    pub target_language_code: String,
    /// `text/plain` or `text/html`
    pub mime_type: String,
}

/// translateText response body
#[derive(Debug, Deserialize)]
pub struct TranslateTextResponse {
    /// One entry per requested content
    #[serde(default)]
    pub translations: Vec<Translation>,
}

/// A single translation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    /// Translated text
    #[serde(default)]
    pub translated_text: String,
}

/// Error envelope returned by Google APIs
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl GoogleTranslate {
    /// Create a new client
    pub fn new(
        endpoint: impl Into<String>,
        project_id: impl Into<String>,
        location: impl Into<String>,
        access_token: impl Into<String>,
        mime_type: MimeType,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            project_id: project_id.into(),
            location: location.into(),
            access_token: access_token.into(),
            mime_type,
        })
    }

    /// Create a client from the translation config
    pub fn from_config(config: &TranslationConfig) -> Result<Self, ProviderError> {
        Self::new(
            &config.endpoint,
            &config.project_id,
            &config.location,
            &config.access_token,
            config.mime_type,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// URL of the translateText method
    pub fn api_url(&self) -> String {
        format!(
            "{}/v3/projects/{}/locations/{}:translateText",
            self.endpoint.trim_end_matches('/'),
            self.project_id,
            self.location
        )
    }

    /// Build the request body, mapping catalog locales to BCP 47 codes
    pub fn build_request(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> Result<TranslateTextRequest, ProviderError> {
        let source = locale_utils::to_service_code(source_locale)
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        let target = locale_utils::to_service_code(target_locale)
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        Ok(TranslateTextRequest {
            contents: vec![text.to_string()],
            source_language_code: source,
            target_language_code: target,
            mime_type: self.mime_type.as_str().to_string(),
        })
    }

    /// Extract the translated text from a response
    pub fn extract_text(response: TranslateTextResponse) -> Result<String, ProviderError> {
        let mut translations = response.translations.into_iter();
        match translations.next() {
            Some(first) => Ok(first.translated_text),
            None => Err(ProviderError::EmptyResponse),
        }
    }

    /// Map an unsuccessful HTTP status onto a provider error
    pub fn map_status_error(status: StatusCode, body: &str) -> ProviderError {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| body.to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(message),
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(message),
            _ => ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslate {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> Result<String, ProviderError> {
        let request = self.build_request(text, source_locale, target_locale)?;
        debug!(
            "Google translateText {} -> {} ({} chars)",
            request.source_language_code,
            request.target_language_code,
            text.chars().count()
        );

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(&self.access_token)
            .header("x-goog-user-project", &self.project_id)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google Translate API error ({}): {}", status, error_text);
            if status == StatusCode::UNAUTHORIZED {
                warn!("Access token was rejected; it may have expired. Set a fresh GOOGLE_ACCESS_TOKEN and rerun");
            }
            return Err(Self::map_status_error(status, &error_text));
        }

        let body = response
            .json::<TranslateTextResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Self::extract_text(body)
    }
}
