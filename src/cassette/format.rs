//! On-disk cassette layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// A recorded session of port interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Session name.
    pub name: String,
    /// When the session was written.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Interactions in call order.
    pub interactions: Vec<Interaction>,
}

/// One call through a port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the session.
    pub seq: u64,
    /// Port name, e.g. `"profile_store"`.
    pub port: String,
    /// Method name, e.g. `"put_if_absent"`.
    pub method: String,
    /// Serialized arguments. Not consulted on replay.
    #[serde(default)]
    pub input: serde_json::Value,
    /// `{"Ok": value}`, `{"Err": RecordedError}` or `{"Err": message}`.
    pub output: serde_json::Value,
}

/// A port error as written to a cassette, keeping its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordedError {
    /// Rejected input.
    Validation {
        /// Error detail.
        message: String,
    },
    /// Missing resource.
    NotFound {
        /// Error detail.
        message: String,
    },
    /// Resource already exists.
    Conflict {
        /// Error detail.
        message: String,
    },
    /// External service failure.
    Upstream {
        /// Service name.
        service: String,
        /// Error detail.
        message: String,
    },
    /// Deadline expired.
    Timeout {
        /// Bounded operation.
        operation: String,
        /// Deadline in seconds.
        seconds: u64,
    },
    /// Reply with an unexpected shape.
    MalformedReply {
        /// Error detail.
        message: String,
    },
    /// Local failure (config or I/O), replayed as an upstream error.
    Other {
        /// Rendered error.
        message: String,
    },
}

impl From<&GatewayError> for RecordedError {
    fn from(err: &GatewayError) -> Self {
        match err {
            GatewayError::Validation(m) => Self::Validation { message: m.clone() },
            GatewayError::NotFound(m) => Self::NotFound { message: m.clone() },
            GatewayError::Conflict(m) => Self::Conflict { message: m.clone() },
            GatewayError::Upstream { service, message } => {
                Self::Upstream { service: service.clone(), message: message.clone() }
            }
            GatewayError::Timeout { operation, seconds } => {
                Self::Timeout { operation: operation.clone(), seconds: *seconds }
            }
            GatewayError::MalformedReply(m) => Self::MalformedReply { message: m.clone() },
            GatewayError::Config(_) | GatewayError::Io(_) => {
                Self::Other { message: err.to_string() }
            }
        }
    }
}

impl From<RecordedError> for GatewayError {
    fn from(err: RecordedError) -> Self {
        match err {
            RecordedError::Validation { message } => Self::Validation(message),
            RecordedError::NotFound { message } => Self::NotFound(message),
            RecordedError::Conflict { message } => Self::Conflict(message),
            RecordedError::Upstream { service, message } => Self::Upstream { service, message },
            RecordedError::Timeout { operation, seconds } => Self::Timeout { operation, seconds },
            RecordedError::MalformedReply { message } => Self::MalformedReply(message),
            RecordedError::Other { message } => Self::upstream("replay", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_survives_yaml() {
        let err = GatewayError::Timeout { operation: "converse".into(), seconds: 120 };
        let yaml = serde_yaml::to_string(&RecordedError::from(&err)).unwrap();
        assert!(yaml.contains("kind: timeout"));

        let back: RecordedError = serde_yaml::from_str(&yaml).unwrap();
        let replayed = GatewayError::from(back);
        assert!(matches!(
            replayed,
            GatewayError::Timeout { ref operation, seconds: 120 } if operation == "converse"
        ));
    }

    #[test]
    fn local_failures_record_their_message() {
        let err = GatewayError::Config("bad table".into());
        assert_eq!(
            RecordedError::from(&err),
            RecordedError::Other { message: "Config error: bad table".into() }
        );
    }
}
