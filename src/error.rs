//! Error types for prompt and video generation.

use std::time::Duration;

/// Maximum length of a remote error message kept in an error value.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while building prompts and videos.
#[derive(Debug, thiserror::Error)]
pub enum AdGeniusError {
    /// Required input is missing; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// The selected credential is no longer valid and must be re-selected.
    #[error("API key session expired: {0}")]
    AuthExpired(String),

    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized error message.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay requested by the server, if any.
        retry_after: Option<Duration>,
    },

    /// Video polling exceeded the configured timeout.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The service answered without the expected content.
    #[error("empty response: {0}")]
    EmptyResponse(String),

    /// A finished video operation carried no download URI.
    #[error("video URI not found")]
    VideoNotFound,

    /// The remote video operation reported a failure.
    #[error("video generation failed: {0}")]
    VideoGeneration(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error (e.g., saving a video or the history file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The three ways a failed attempt is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing input, blocking notification, no remote call made.
    Validation,
    /// Any remote or local failure; the attempt is aborted.
    Service,
    /// Credential invalid; the user must select one again.
    AuthExpired,
}

impl AdGeniusError {
    /// Classifies this error for presentation.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::AuthExpired(_) => ErrorKind::AuthExpired,
            _ => ErrorKind::Service,
        }
    }

    /// Returns true if the credential has to be selected again.
    pub fn is_auth_expired(&self) -> bool {
        self.kind() == ErrorKind::AuthExpired
    }

    /// What the user should do next, for errors that need a specific action.
    pub fn hint(&self) -> Option<&'static str> {
        match self.kind() {
            ErrorKind::AuthExpired => Some(
                "The API key session expired. Select a key from a billing-enabled \
                 project again (GOOGLE_API_KEY) and retry.",
            ),
            _ => None,
        }
    }
}

/// Result type alias for AdGenius operations.
pub type Result<T> = std::result::Result<T, AdGeniusError>;

/// Parses a `Retry-After` header given in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Redacts credentials from an error body and bounds its length.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let mut out = String::with_capacity(text.len().min(MAX_ERROR_MESSAGE_LEN));
    for (i, segment) in text.split("key=").enumerate() {
        if i == 0 {
            out.push_str(segment);
            continue;
        }
        out.push_str("key=[REDACTED]");
        let rest = segment
            .find(|c: char| c == '&' || c == '"' || c.is_whitespace())
            .map(|pos| &segment[pos..])
            .unwrap_or("");
        out.push_str(rest);
    }

    let trimmed = out.trim();
    if trimmed.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let cut: String = trimmed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    }
}
