//! Completion client error types.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when exchanging a transcript with the completion
/// service.
///
/// None of these are fatal to a session: the caller surfaces the failure and
/// the session remains usable.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// HTTP transport failed before a response arrived.
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The service rejected the supplied credential (401/403).
    #[error("credential rejected by completion service (status {status}): {message}")]
    CredentialRejected { status: u16, message: String },

    /// Rate limited (429).
    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    /// The account has no remaining quota.
    #[error("quota exceeded: {message}")]
    QuotaExceeded { message: String },

    /// Any other non-success response.
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered successfully but returned no candidates.
    #[error("malformed response: completion contained no choices")]
    MalformedResponse,
}

// Error body shape used by OpenAI-compatible services.
#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
}

/// Map a non-success response to the error taxonomy.
///
/// Quota exhaustion arrives as a 429 whose error code is `insufficient_quota`,
/// so it is distinguished from ordinary rate limiting by the body, not the
/// status line.
pub(super) fn classify_error(status: u16, retry_after: Option<u64>, body: String) -> CompletionError {
    let detail = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|b| b.error);
    let code = detail
        .as_ref()
        .and_then(|d| d.code.clone().or_else(|| d.kind.clone()))
        .unwrap_or_default();
    let message = detail.and_then(|d| d.message).unwrap_or(body);

    match status {
        401 | 403 => CompletionError::CredentialRejected { status, message },
        402 => CompletionError::QuotaExceeded { message },
        429 if code == "insufficient_quota" => CompletionError::QuotaExceeded { message },
        429 => CompletionError::RateLimited { retry_after },
        _ => CompletionError::Api { status, message },
    }
}
