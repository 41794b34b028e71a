//! Unified error handling for the client.
//!
//! One variant per failure category: transport (no response), authentication
//! (401-class, normally absorbed by the refresh coordinator), business/
//! validation (4xx/5xx with a server-supplied message), and decode failures.
//! Nothing here is fatal to the process; every path resolves to a value.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced by the API layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network/transport failure - the request never got a response.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Authentication failure that survived the refresh coordinator.
    /// By the time this surfaces, the session has been force-logged-out.
    #[error("Unauthorized")]
    Unauthorized,

    /// The backend rejected the request. `message` carries the
    /// server-supplied wording, absent when the body had none; display
    /// falls back to the canonical status reason.
    #[error("{}", .message.as_deref().unwrap_or(.status.canonical_reason().unwrap_or("Request failed")))]
    Api {
        status: StatusCode,
        message: Option<String>,
    },

    /// A 2xx body that failed to deserialize.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// The server-supplied message for business failures, if any.
    ///
    /// Used by stores that prefer the backend's wording over a fixed
    /// fallback (e.g. registration). `None` means the server said nothing,
    /// which is distinct from a canonical status reason.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }

    /// Whether this is a 401-class authentication failure.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
