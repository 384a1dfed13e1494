//! Unified error type for profile-gateway.

use thiserror::Error;

/// Message returned to callers for every server-side failure.
pub const GENERIC_FAILURE: &str = "An unexpected error occurred";

/// Errors that can occur while handling a profile operation.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The inbound request was missing a field or carried an invalid value.
    #[error("{0}")]
    Validation(String),

    /// The requested profile or model does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A profile already exists for the requested key.
    #[error("{0}")]
    Conflict(String),

    /// An external service call failed.
    #[error("{service} error: {message}")]
    Upstream {
        /// Name of the external service (e.g. `"bedrock"`).
        service: String,
        /// Error detail reported by the client.
        message: String,
    },

    /// An external service call did not finish within its deadline.
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        /// Name of the bounded operation.
        operation: String,
        /// Configured deadline in seconds.
        seconds: u64,
    },

    /// The model reply did not have the expected shape.
    #[error("Malformed model reply: {0}")]
    MalformedReply(String),

    /// Configuration is missing or malformed.
    #[error("Config error: {0}")]
    Config(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Build an [`GatewayError::Upstream`] for the named service.
    pub fn upstream(service: &str, message: impl Into<String>) -> Self {
        Self::Upstream { service: service.to_string(), message: message.into() }
    }

    /// HTTP status code this error maps to.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Upstream { .. }
            | Self::Timeout { .. }
            | Self::MalformedReply(_)
            | Self::Config(_)
            | Self::Io(_) => 500,
        }
    }

    /// Message safe to hand back to a caller.
    ///
    /// Client errors carry their own reason; anything server-side collapses
    /// to [`GENERIC_FAILURE`].
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            GENERIC_FAILURE.to_string()
        }
    }

    /// Whether the failure was caused by the caller.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
