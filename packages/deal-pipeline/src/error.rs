//! Typed errors for the deal pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that end a pipeline run.
///
/// Everything else (bad records, single failed queries, failed staging of one
/// deal) is reported in the run summary instead.
#[derive(Debug, Error)]
pub enum DealError {
    /// A caller-supplied parameter is out of contract.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// No keyword was given and every seed source failed.
    #[error("query seed source unavailable: {reason}")]
    SeedSourceUnavailable { reason: String },

    /// Not a single query reached the provider successfully.
    #[error("search provider unavailable after {attempted} queries: {last_error}")]
    ProviderUnavailable { attempted: usize, last_error: String },
}

impl DealError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Errors from a search provider for one query specification.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure
    #[error("request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Provider answered with an error
    #[error("provider error: {message}")]
    Api { status: Option<u16>, message: String },

    /// No searches left on the account
    #[error("quota exhausted: {0}")]
    QuotaExhausted(String),

    /// Credentials rejected
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl ProviderError {
    /// Fatal errors halt the rest of the query plan.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::QuotaExhausted(_) | Self::Unauthorized(_))
    }
}

impl From<serpapi_client::SerpApiError> for ProviderError {
    fn from(err: serpapi_client::SerpApiError) -> Self {
        use serpapi_client::SerpApiError;

        match err {
            SerpApiError::Http(e) => Self::Request(Box::new(e)),
            SerpApiError::QuotaExhausted(message) => Self::QuotaExhausted(message),
            SerpApiError::Unauthorized(message) => Self::Unauthorized(message),
            SerpApiError::Api { status, message } => Self::Api {
                status: Some(status),
                message,
            },
        }
    }
}

/// Errors from the approval store and the seed sources.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The deal has no link to stage it under
    #[error("deal has no link: {title}")]
    MissingLink { title: String },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Store rejected the request
    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Store response could not be interpreted
    #[error("unexpected store response: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(Box::new(err))
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, DealError>;

/// Result type alias for provider operations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
