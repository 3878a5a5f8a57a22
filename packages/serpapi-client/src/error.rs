use thiserror::Error;

/// Errors returned by the SerpAPI client.
#[derive(Debug, Error)]
pub enum SerpApiError {
    /// Transport or body decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The account has no searches left (or is throttled).
    #[error("search quota exhausted: {0}")]
    QuotaExhausted(String),

    /// The API key was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success answer from the API.
    #[error("SerpAPI error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl SerpApiError {
    /// Whether retrying another query in the same run is pointless.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::QuotaExhausted(_) | Self::Unauthorized(_))
    }
}

pub type Result<T> = std::result::Result<T, SerpApiError>;

/// Map an error status and message to a typed error.
///
/// SerpAPI reports quota exhaustion either with HTTP 429 or with an error
/// message on another status, so both are checked.
pub fn classify_error(status: u16, message: String) -> SerpApiError {
    let lower = message.to_lowercase();

    if status == 401 || status == 403 || lower.contains("invalid api key") {
        return SerpApiError::Unauthorized(message);
    }

    let quota_markers = [
        "run out of searches",
        "searches per",
        "search limit",
        "quota",
        "credits",
    ];
    if status == 429 || quota_markers.iter().any(|m| lower.contains(m)) {
        return SerpApiError::QuotaExhausted(message);
    }

    SerpApiError::Api { status, message }
}
