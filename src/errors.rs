/*!
 * Error types for the catalog-translator application.
 *
 * The taxonomy follows the batch's failure policy:
 * - `FetchError` is fatal and aborts the run
 * - `TranslationError` skips the current (product, locale) pair
 * - `DataAccessError` on a write skips only that write
 */

use thiserror::Error;

/// Errors that can occur when working with the translation service API
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting or quota
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The service answered but returned no translations
    #[error("API returned no translations")]
    EmptyResponse,
}

/// Errors that can occur while translating one source field
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The source field is absent or blank and was not sent to the service
    #[error("Source field '{field}' is missing")]
    MissingSource {
        /// Name of the missing field
        field: &'static str,
    },

    /// The service returned an empty translation
    #[error("Translation result is empty")]
    EmptyResult,

    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl TranslationError {
    /// Whether another attempt at the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::Provider(provider_error) => match provider_error {
                ProviderError::RequestFailed(_)
                | ProviderError::ConnectionError(_)
                | ProviderError::RateLimitExceeded(_) => true,
                ProviderError::ApiError { status_code, .. } => *status_code >= 500,
                ProviderError::ParseError(_)
                | ProviderError::AuthenticationError(_)
                | ProviderError::EmptyResponse => false,
            },
            TranslationError::MissingSource { .. } | TranslationError::EmptyResult => false,
        }
    }
}

/// Errors raised by the product store
#[derive(Error, Debug)]
pub enum DataAccessError {
    /// Could not open or reach the database
    #[error("Database connection error: {0}")]
    Connection(String),

    /// A statement failed to execute
    #[error("Query '{operation}' failed: {message}")]
    Query {
        /// Logical operation being performed
        operation: &'static str,
        /// Driver error message
        message: String,
    },

    /// A row could not be mapped onto the expected shape
    #[error("Failed to decode row: {0}")]
    Decode(String),
}

impl DataAccessError {
    /// Wrap a driver error for the given operation
    pub fn query(operation: &'static str, error: impl std::fmt::Display) -> Self {
        DataAccessError::Query {
            operation,
            message: error.to_string(),
        }
    }
}

impl From<sqlx::Error> for DataAccessError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Io(e) => Self::Connection(e.to_string()),
            sqlx::Error::Tls(e) => Self::Connection(e.to_string()),
            sqlx::Error::PoolTimedOut => Self::Connection("connection pool timed out".to_string()),
            sqlx::Error::PoolClosed => Self::Connection("connection pool closed".to_string()),
            sqlx::Error::ColumnDecode { index, source } => {
                Self::Decode(format!("column {}: {}", index, source))
            }
            sqlx::Error::ColumnNotFound(column) => Self::Decode(format!("column not found: {}", column)),
            other => Self::Query {
                operation: "sql",
                message: other.to_string(),
            },
        }
    }
}

impl From<rusqlite::Error> for DataAccessError {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::FromSqlConversionFailure(index, _, source) => {
                Self::Decode(format!("column {}: {}", index, source))
            }
            rusqlite::Error::InvalidColumnType(index, name, _) => {
                Self::Decode(format!("column {} ({}) has an unexpected type", index, name))
            }
            other => Self::Query {
                operation: "sql",
                message: other.to_string(),
            },
        }
    }
}

/// Fatal error while loading the source snapshot
#[derive(Error, Debug)]
#[error("Failed to fetch source products for locale '{locale}': {source}")]
pub struct FetchError {
    /// Source locale that was queried
    pub locale: String,
    /// Underlying data access failure
    #[source]
    pub source: DataAccessError,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Fetching the source snapshot failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Error from the data layer outside of the fetch
    #[error("Data access error: {0}")]
    DataAccess(#[from] DataAccessError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
