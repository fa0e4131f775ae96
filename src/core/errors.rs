//! Error taxonomy for catalog API calls
//!
//! Every expected failure a store can surface is a `FetchError`. The store
//! methods themselves never return `Err` for these; callers observe them
//! through `status`/`last_error` on the store snapshot. Stale completions
//! are not errors at all, they are silently discarded at apply time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the HTTP transport layer.
///
/// Variants carry plain messages rather than source errors so the type
/// stays `Clone` and can live inside store snapshots and events.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FetchError {
    /// Transport-level failure: DNS, connect, timeout, interrupted body.
    #[error("network error: {message}")]
    Network { message: String },

    /// Server answered with a non-success HTTP status.
    #[error("server returned status {code}")]
    Status { code: u16, message: Option<String> },

    /// Server answered 2xx but the body did not decode.
    #[error("response decode error: {message}")]
    Decode { message: String },
}

impl FetchError {
    pub fn status(code: u16, message: Option<String>) -> Self {
        Self::Status { code, message }
    }

    /// Whether re-issuing the same request could plausibly succeed.
    ///
    /// The client performs no automatic retries; this is a hint for the
    /// caller's retry affordance.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Status { code, .. } => matches!(code, 408 | 429) || *code >= 500,
            Self::Decode { .. } => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::Status {
                code: status.as_u16(),
                message: None,
            }
        } else {
            Self::Network {
                message: err.to_string(),
            }
        }
    }
}

/// Result type alias for transport operations.
pub type FetchResult<T> = Result<T, FetchError>;
