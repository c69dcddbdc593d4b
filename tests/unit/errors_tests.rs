/*!
 * Tests for error types and conversions
 */

use catalog_translator::errors::{AppError, DataAccessError, FetchError, ProviderError, TranslationError};
use std::error::Error;

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 400,
        message: "Target language is invalid".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("400"));
    assert!(display.contains("Target language is invalid"));
}

#[test]
fn test_translationError_missingSource_shouldNameField() {
    let error = TranslationError::MissingSource { field: "short_description" };
    assert!(error.to_string().contains("short_description"));
}

#[test]
fn test_translationError_isRetryable_shouldClassifyProviderErrors() {
    let retryable = [
        ProviderError::RequestFailed("reset".to_string()),
        ProviderError::ConnectionError("timeout".to_string()),
        ProviderError::RateLimitExceeded("quota".to_string()),
        ProviderError::ApiError { status_code: 500, message: "internal".to_string() },
    ];
    for error in retryable {
        assert!(TranslationError::from(error).is_retryable());
    }

    let permanent = [
        ProviderError::ApiError { status_code: 400, message: "bad".to_string() },
        ProviderError::AuthenticationError("denied".to_string()),
        ProviderError::ParseError("eof".to_string()),
        ProviderError::EmptyResponse,
    ];
    for error in permanent {
        assert!(!TranslationError::from(error).is_retryable());
    }

    assert!(!TranslationError::EmptyResult.is_retryable());
    assert!(!TranslationError::MissingSource { field: "description" }.is_retryable());
}

#[test]
fn test_dataAccessError_fromRusqlite_shouldBeQueryError() {
    let error: DataAccessError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(error, DataAccessError::Query { .. }));
}

#[test]
fn test_fetchError_shouldKeepLocaleAndSource() {
    let error = FetchError {
        locale: "nl".to_string(),
        source: DataAccessError::Connection("refused".to_string()),
    };

    assert!(error.to_string().contains("'nl'"));
    assert!(error.source().is_some());

    let app_error = AppError::from(error);
    assert!(matches!(app_error, AppError::Fetch(_)));
}

#[test]
fn test_appError_fromIo_shouldBeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "conf.json");
    assert!(matches!(AppError::from(io_error), AppError::File(_)));
}
