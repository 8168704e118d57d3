//! Remote API response mapping
//!
//! Isolates the remote service's numeric error codes from the rest of the engine.
//! Error responses carry a body of the form
//! `{"errors": [{"code": 144, "message": "No status found with that ID."}]}`.
//!
//! # Error code table
//!
//! | Code | Meaning | Outcome |
//! |------|---------|---------|
//! | 34 | Page does not exist | `Confirmed` |
//! | 144 | No status found with that id | `Confirmed` |
//! | 63 | User has been suspended | `PermanentlyBlocked` |
//! | 64 | Account is suspended | `PermanentlyBlocked` |
//! | 179 | Not authorized to see this status | `PermanentlyBlocked` |
//! | 32 | Could not authenticate you | `Unauthenticated` |
//! | 89 | Invalid or expired token | `Unauthenticated` |
//! | 135 | Timestamp out of bounds | `Unauthenticated` |
//! | 215 | Bad authentication data | `Unauthenticated` |
//! | 88 | Rate limit exceeded | `TransientFailure` |
//! | 130 | Over capacity | `TransientFailure` |
//! | 131 | Internal error | `TransientFailure` |
//!
//! When no listed code is present the HTTP status decides: success is
//! `Confirmed`, 401 is `Unauthenticated`, anything else (a bare 404 included)
//! is `TransientFailure`. Only a listed code can mark a post as already gone.

use molt_domain::RemoteOutcome;
use reqwest::StatusCode;
use serde::Deserialize;

/// Error body returned by the remote API
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    /// Reported errors, most significant first
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

/// One entry of an error body
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEntry {
    /// Numeric API error code
    pub code: i64,

    /// Human-readable message
    #[serde(default)]
    pub message: String,
}

/// Outcome category of a known API error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeClass {
    Gone,
    Blocked,
    Unauthenticated,
    Transient,
}

fn class_of(code: i64) -> Option<CodeClass> {
    match code {
        34 | 144 => Some(CodeClass::Gone),
        63 | 64 | 179 => Some(CodeClass::Blocked),
        32 | 89 | 135 | 215 => Some(CodeClass::Unauthenticated),
        88 | 130 | 131 => Some(CodeClass::Transient),
        _ => None,
    }
}

/// Map an HTTP response to a remote outcome
///
/// # Examples
///
/// ```
/// use molt_domain::RemoteOutcome;
/// use molt_remote::api::outcome_for;
/// use reqwest::StatusCode;
///
/// let body = r#"{"errors":[{"code":144,"message":"No status found with that ID."}]}"#;
/// assert_eq!(outcome_for(StatusCode::NOT_FOUND, body), RemoteOutcome::Confirmed);
/// ```
pub fn outcome_for(status: StatusCode, body: &str) -> RemoteOutcome {
    if status.is_success() {
        return RemoteOutcome::Confirmed;
    }

    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let known = parsed
        .errors
        .iter()
        .find_map(|entry| class_of(entry.code).map(|class| (class, entry)));

    if let Some((class, entry)) = known {
        let detail = format!("API error {}: {}", entry.code, entry.message);
        return match class {
            CodeClass::Gone => RemoteOutcome::Confirmed,
            CodeClass::Blocked => RemoteOutcome::PermanentlyBlocked(detail),
            CodeClass::Unauthenticated => RemoteOutcome::Unauthenticated(detail),
            CodeClass::Transient => RemoteOutcome::TransientFailure(detail),
        };
    }

    let detail = match parsed.errors.first() {
        Some(entry) => format!("HTTP {} (API error {}: {})", status, entry.code, entry.message),
        None if body.trim().is_empty() => format!("HTTP {}", status),
        None => format!("HTTP {}: {}", status, truncate(body, 200)),
    };

    match status {
        StatusCode::UNAUTHORIZED => RemoteOutcome::Unauthenticated(detail),
        _ => RemoteOutcome::TransientFailure(detail),
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
