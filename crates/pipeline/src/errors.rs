//! Error and retry-policy types for the Forgeflow component domain.
//!
//! [`ForgeError`] covers failures reported by (or on the way to) the remote
//! forge. It carries the remote status and message as received; components
//! never translate or suppress it.
//!
//! [`PipelineError`] covers everything a component can fail with, wrapping
//! [`ForgeError`] alongside the local port-contract violations.
//!
//! [`RetryPolicy`] is a classification for whoever drives the workflow.
//! Nothing in this workspace retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{NodeId, PortType};

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// - `Retryable` errors: transport failures, rate limits, server errors.
/// - `NonRetryable` errors: not found, permission problems, validation
///   rejections, malformed responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt, when the forge stated one
        /// (`Retry-After`). `None` means apply the caller's own schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried without a change of input.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Forge errors
// ---------------------------------------------------------------------------

/// A failure reported by the forge or its transport.
///
/// `message` is the forge's own error text when it supplied one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForgeError {
    /// HTTP 404: the repository, issue or pull request does not exist or is
    /// not visible with the current credentials.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// HTTP 401: missing or invalid token.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// HTTP 403 without rate-limit exhaustion.
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// HTTP 429, or 403 with the primary rate limit exhausted.
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// HTTP 422: the forge rejected the request payload (e.g. a pull request
    /// whose head equals its base).
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Any other non-success status.
    #[error("Forge API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced an HTTP response.
    #[error("Transport failure: {message}")]
    Transport { message: String },

    /// The response body did not have the expected shape.
    #[error("Could not decode forge response: {message}")]
    Decode { message: String },
}

impl ForgeError {
    /// Classifies this error for an orchestrator deciding whether to re-run.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::RateLimited { retry_after, .. } => RetryPolicy::Retryable {
                after: *retry_after,
            },
            Self::Transport { .. } => RetryPolicy::Retryable { after: None },
            Self::Api { status, .. } if *status >= 500 => RetryPolicy::Retryable { after: None },
            _ => RetryPolicy::NonRetryable,
        }
    }
}

// ---------------------------------------------------------------------------
// Component errors
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::Component`] methods.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required input port had no value when the component executed.
    #[error("Component '{node}' is missing required input '{port}'")]
    MissingInput { node: NodeId, port: &'static str },

    /// An input value was well-typed but outside the accepted domain
    /// (empty repository name, negative issue number).
    #[error("Component '{node}' received an invalid value on '{port}': {reason}")]
    InvalidInput {
        node: NodeId,
        port: &'static str,
        reason: String,
    },

    /// The component has no port with this name.
    #[error("Component '{node}' has no port named '{port}'")]
    UnknownPort { node: NodeId, port: String },

    /// A value of the wrong type was offered to a port.
    #[error("Port '{port}' expects {expected}, got {actual}")]
    PortTypeMismatch {
        port: String,
        expected: PortType,
        actual: PortType,
    },

    /// No client was wired to the component and none was found in the
    /// execution context. The Authorize component must run first.
    #[error("Component '{node}' has no authenticated client; run Authorize first")]
    MissingClient { node: NodeId },

    /// A workflow referenced a component id or kind that does not exist.
    #[error("Unknown component '{name}'")]
    UnknownComponent { name: String },

    /// Two components in one workflow share an id.
    #[error("Duplicate component id '{node}'")]
    DuplicateComponent { node: NodeId },

    /// A port link cannot be honoured (e.g. it points backwards in execution order).
    #[error("Invalid link {from}.{from_port} -> {to}.{to_port}: {reason}")]
    InvalidLink {
        from: NodeId,
        from_port: String,
        to: NodeId,
        to_port: String,
        reason: String,
    },

    /// The remote call failed.
    #[error(transparent)]
    Forge(#[from] ForgeError),
}
