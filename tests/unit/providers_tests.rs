/*!
 * Tests for translation provider implementations
 */

use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

use catalog_translator::app_config::{MimeType, TranslationConfig};
use catalog_translator::errors::{ProviderError, TranslationError};
use catalog_translator::providers::Translator;
use catalog_translator::providers::google::GoogleTranslate;

const TRANSLATE_PATH: &str = "/v3/projects/shop-project/locations/global:translateText";

fn google(endpoint: &str) -> GoogleTranslate {
    GoogleTranslate::new(endpoint, "shop-project", "global", "secret-token", MimeType::Plain, Duration::from_secs(5))
        .unwrap()
}

#[tokio::test]
async fn test_google_translate_withSuccess_shouldReturnFirstTranslation() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(TRANSLATE_PATH)
                .header("Authorization", "Bearer secret-token")
                .header("x-goog-user-project", "shop-project")
                .json_body(json!({
                    "contents": ["Een stoel."],
                    "sourceLanguageCode": "nl",
                    "targetLanguageCode": "en-GB",
                    "mimeType": "text/plain"
                }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "translations": [{"translatedText": "A chair.", "detectedLanguageCode": "nl"}]
                }));
        })
        .await;

    let result = google(&server.base_url()).translate("Een stoel.", "nl", "en_GB").await.unwrap();

    assert_eq!(result, "A chair.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_google_translate_withEmptyTranslations_shouldReturnEmptyResponse() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(TRANSLATE_PATH);
            then.status(200).json_body(json!({"translations": []}));
        })
        .await;

    let result = google(&server.base_url()).translate("Een stoel.", "nl", "fr").await;

    assert!(matches!(result, Err(ProviderError::EmptyResponse)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_google_translate_withForbidden_shouldBeAuthenticationError() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(TRANSLATE_PATH);
            then.status(403).json_body(json!({
                "error": {
                    "code": 403,
                    "message": "Cloud Translation API has not been used",
                    "status": "PERMISSION_DENIED"
                }
            }));
        })
        .await;

    let error = google(&server.base_url()).translate("Een stoel.", "nl", "fr").await.unwrap_err();

    match &error {
        ProviderError::AuthenticationError(message) => assert!(message.contains("has not been used")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!TranslationError::from(error).is_retryable());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_google_translate_withExpiredToken_shouldNotRetry() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(TRANSLATE_PATH);
            then.status(401).json_body(json!({
                "error": {
                    "code": 401,
                    "message": "Request had invalid authentication credentials.",
                    "status": "UNAUTHENTICATED"
                }
            }));
        })
        .await;

    let error = google(&server.base_url()).translate("Een stoel.", "nl", "fr").await.unwrap_err();

    assert!(matches!(&error, ProviderError::AuthenticationError(message) if message.contains("invalid authentication")));
    assert!(!TranslationError::from(error).is_retryable());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_google_translate_withRateLimit_shouldBeRetryable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(TRANSLATE_PATH);
            then.status(429).body("quota exceeded");
        })
        .await;

    let error = google(&server.base_url()).translate("Een stoel.", "nl", "fr").await.unwrap_err();

    assert!(matches!(error, ProviderError::RateLimitExceeded(_)));
    assert!(TranslationError::from(error).is_retryable());
}

#[tokio::test]
async fn test_google_translate_withServerError_shouldBeRetryable() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(TRANSLATE_PATH);
            then.status(503).json_body(json!({"error": {"message": "backend"}}));
        })
        .await;

    let error = google(&server.base_url()).translate("Een stoel.", "nl", "fr").await.unwrap_err();

    assert!(matches!(error, ProviderError::ApiError { status_code: 503, .. }));
    assert!(TranslationError::from(error).is_retryable());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_google_translate_withUnreachableEndpoint_shouldBeConnectionError() {
    // Bind and drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let error = google(&endpoint).translate("Een stoel.", "nl", "fr").await.unwrap_err();
    assert!(matches!(error, ProviderError::ConnectionError(_)));
}

#[test]
fn test_google_fromConfig_shouldUseConfiguredProject() {
    let config = TranslationConfig {
        project_id: "p-123".to_string(),
        location: "europe-west1".to_string(),
        ..TranslationConfig::default()
    };
    let client = GoogleTranslate::from_config(&config).unwrap();

    assert_eq!(
        client.api_url(),
        "https://translation.googleapis.com/v3/projects/p-123/locations/europe-west1:translateText"
    );
    assert_eq!(client.name(), "google");
    // Token never appears in debug output
    assert!(!format!("{:?}", client).contains("token"));
}
