//! Mapping of `octocrab` failures onto [`ForgeError`].
//!
//! The mapping is mechanical: GitHub's status selects the variant and its own
//! error text becomes the message.

use pipeline::ForgeError;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Entries of GitHub's `errors` array: usually objects, occasionally bare strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Text(String),
    Object {
        message: Option<String>,
        code: Option<String>,
        field: Option<String>,
    },
}

impl ErrorDetail {
    fn describe(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Object { message: Some(message), .. } => Some(message.clone()),
            Self::Object { field: Some(field), code: Some(code), .. } => {
                Some(format!("{field} {code}"))
            }
            Self::Object { code: Some(code), .. } => Some(code.clone()),
            Self::Object { .. } => None,
        }
    }
}

/// Joins GitHub's top-level message with the details of its `errors` array.
fn error_message(message: &str, errors: &[Value]) -> String {
    let details: Vec<String> = errors
        .iter()
        .filter_map(|e| ErrorDetail::deserialize(e).ok())
        .filter_map(|d| d.describe())
        .collect();
    let message = message.trim();
    match (message.is_empty(), details.is_empty()) {
        (_, true) => message.to_owned(),
        (true, false) => details.join("; "),
        (false, false) => format!("{message}: {}", details.join("; ")),
    }
}

/// Builds the [`ForgeError`] for a GitHub error response.
pub(crate) fn classify(status: u16, message: &str, errors: &[Value]) -> ForgeError {
    let message = error_message(message, errors);
    let rate_limited = message.to_ascii_lowercase().contains("rate limit");

    match status {
        429 => ForgeError::RateLimited { message, retry_after: None },
        403 if rate_limited => ForgeError::RateLimited { message, retry_after: None },
        401 => ForgeError::Unauthorized { message },
        403 => ForgeError::Forbidden { message },
        404 => ForgeError::NotFound { message },
        422 => ForgeError::Validation { message },
        other => ForgeError::Api { status: other, message },
    }
}

/// Converts a failed `octocrab` call.
///
/// GitHub error responses keep their status; unreadable bodies become
/// [`ForgeError::Decode`]; everything else happened before a response
/// arrived and becomes [`ForgeError::Transport`].
pub(crate) fn from_octocrab(err: octocrab::Error) -> ForgeError {
    debug!(error = %err, "GitHub request failed");
    match &err {
        octocrab::Error::GitHub { source, .. } => classify(
            source.status_code.as_u16(),
            &source.message,
            source.errors.as_deref().unwrap_or_default(),
        ),
        octocrab::Error::Serde { .. } | octocrab::Error::Json { .. } => {
            ForgeError::Decode { message: err.to_string() }
        }
        _ => ForgeError::Transport { message: err.to_string() },
    }
}
