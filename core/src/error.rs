//! Error types for the Calendly API client.
//!
//! # Design
//! Every failure a client operation can produce is one `ApiError`. Each
//! variant records where the failure came from; `kind()`, `code()` and the
//! `Display` text give callers a uniform message-plus-code view regardless
//! of origin. `delete_webhook` is the only operation that recovers from an
//! error locally, and it does so by matching on `is_not_found()`.

use thiserror::Error;

/// Fixed code attached to response decode failures.
pub const INVALID_JSON_CODE: u16 = 500;

/// Where an `ApiError` originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally; nothing was sent.
    Validation,
    /// The API answered with a 4xx status.
    Upstream,
    /// No usable response: network failure or a 5xx status.
    Transport,
    /// A JSON response (or request body) could not be encoded or decoded.
    Decode,
}

/// Errors returned by `CalendlyClient` operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// `create_webhook` was asked for events outside the supported set.
    #[error("The specified event types do not exist")]
    InvalidEventTypes { unknown: Vec<String> },

    /// A subscription id that cannot be used as a single path segment.
    #[error("invalid webhook subscription id: {0:?}")]
    InvalidSubscriptionId(String),

    /// The API returned a 4xx status. The display text is the raw response
    /// body; `message` holds the `message` field of a JSON error body.
    #[error("{body}")]
    Upstream {
        status: u16,
        body: String,
        message: Option<String>,
    },

    /// The request never produced a usable response.
    #[error("Failed to get Calendly data: {message}")]
    Transport { message: String, code: Option<u16> },

    /// A response advertised JSON but its body did not decode.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidEventTypes { .. } | ApiError::InvalidSubscriptionId(_) => {
                ErrorKind::Validation
            }
            ApiError::Upstream { .. } => ErrorKind::Upstream,
            ApiError::Transport { .. } => ErrorKind::Transport,
            ApiError::InvalidJson(_) | ApiError::Serialization(_) => ErrorKind::Decode,
        }
    }

    /// HTTP-derived code, if the failure has one.
    pub fn code(&self) -> Option<u16> {
        match self {
            ApiError::Upstream { status, .. } => Some(*status),
            ApiError::Transport { code, .. } => *code,
            ApiError::InvalidJson(_) => Some(INVALID_JSON_CODE),
            ApiError::InvalidEventTypes { .. }
            | ApiError::InvalidSubscriptionId(_)
            | ApiError::Serialization(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(404)
    }
}
