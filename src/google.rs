//! Shared plumbing for the Google Generative Language API.

use crate::error::{parse_retry_after, sanitize_error_message, AdGeniusError};
use serde::Deserialize;

/// Default REST endpoint for Gemini and Veo.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key.
pub(crate) const API_KEY_HEADER: &str = "x-goog-api-key";

/// Message the API returns when the selected key's project is gone.
const ENTITY_NOT_FOUND: &str = "Requested entity was not found";

/// `google.rpc.Code.NOT_FOUND`, as used in long-running operation errors.
pub(crate) const RPC_NOT_FOUND: i32 = 5;

/// Resolves the API key: explicit value, then `GOOGLE_API_KEY`, then `API_KEY`.
pub(crate) fn resolve_api_key(explicit: Option<String>) -> Option<String> {
    explicit
        .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
        .or_else(|| std::env::var("API_KEY").ok())
        .filter(|k| !k.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Returns true when a status/message pair means the credential expired.
///
/// The provider exposes no dedicated code for this, so the NOT_FOUND status
/// is paired with its fixed message.
pub(crate) fn is_expired_credential(status: Option<&str>, message: &str) -> bool {
    status.is_none_or(|s| s == "NOT_FOUND") && message.starts_with(ENTITY_NOT_FOUND)
}

/// Maps an error reported inside a long-running operation.
pub(crate) fn operation_error(code: Option<i32>, message: Option<String>) -> AdGeniusError {
    let message = message.unwrap_or_else(|| "Unknown error".into());
    if code.is_none_or(|c| c == RPC_NOT_FOUND) && is_expired_credential(None, &message) {
        return AdGeniusError::AuthExpired(message);
    }
    AdGeniusError::VideoGeneration(sanitize_error_message(&message))
}

/// Maps a non-success HTTP response to an error.
pub(crate) fn parse_error(
    status: u16,
    text: &str,
    headers: &reqwest::header::HeaderMap,
) -> AdGeniusError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(text).ok();
    let message = envelope
        .as_ref()
        .and_then(|e| e.error.message.clone())
        .unwrap_or_else(|| text.to_string());
    let message = sanitize_error_message(&message);

    if status == 404 {
        let rpc_status = envelope.as_ref().and_then(|e| e.error.status.as_deref());
        if is_expired_credential(rpc_status, &message) {
            return AdGeniusError::AuthExpired(message);
        }
        return AdGeniusError::Api { status, message };
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
        return AdGeniusError::RateLimited { retry_after };
    }
    if status == 401 || status == 403 {
        return AdGeniusError::Auth(message);
    }
    let lower = message.to_lowercase();
    if lower.contains("safety")
        || lower.contains("blocked")
        || lower.contains("content_policy")
        || lower.contains("prohibited")
    {
        return AdGeniusError::ContentBlocked(message);
    }
    AdGeniusError::Api { status, message }
}
