//! Replaying adapters that serve recorded interactions from cassettes.
//!
//! Recorded errors come back as the variant they were recorded with. A bare
//! error string, as in hand-written cassettes, comes back as
//! [`GatewayError::Upstream`]. Running past the end of a cassette is an
//! error, not a panic, so a replaying server keeps answering.

pub mod identity;
pub mod model_invoker;
pub mod profile_store;
pub mod provisioner;

use std::sync::{Arc, Mutex};

use serde::Deserialize;

use crate::cassette::format::RecordedError;
use crate::cassette::replayer::CassetteReplayer;
use crate::error::GatewayError;

pub use identity::ReplayingIdentity;
pub use model_invoker::ReplayingModelInvoker;
pub use profile_store::ReplayingProfileStore;
pub use provisioner::ReplayingProvisioner;

/// Shared handle to a cassette being replayed.
pub type SharedReplayer = Arc<Mutex<CassetteReplayer>>;

/// Retrieve the next recorded output for a given port and method.
///
/// # Errors
///
/// Returns [`GatewayError::Upstream`] if the cassette has no more
/// interactions for the pair.
pub(crate) fn next_output(
    replayer: &SharedReplayer,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, GatewayError> {
    let mut guard = replayer.lock().expect("replayer lock poisoned");
    guard
        .next_interaction(port, method)
        .map(|interaction| interaction.output.clone())
        .map_err(|message| GatewayError::upstream("cassette", message))
}

/// Deserialize a replayed output as `Result<T, GatewayError>`.
///
/// # Errors
///
/// Returns the recorded error, or [`GatewayError::MalformedReply`] if the
/// recorded value does not fit `T`.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, GatewayError> {
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        if let Some(msg) = err_val.as_str() {
            return Err(GatewayError::upstream("replay", msg));
        }
        return Err(match RecordedError::deserialize(err_val) {
            Ok(recorded) => recorded.into(),
            Err(e) => GatewayError::MalformedReply(format!("cassette error does not fit: {e}")),
        });
    }
    let value = match output.get("Ok").or_else(|| output.get("ok")) {
        Some(ok_val) => ok_val.clone(),
        None => output,
    };
    serde_json::from_value(value)
        .map_err(|e| GatewayError::MalformedReply(format!("cassette value does not fit: {e}")))
}

/// Replay the next interaction for `port`/`method` as a `T`.
pub(crate) fn replay<T: serde::de::DeserializeOwned>(
    replayer: &SharedReplayer,
    port: &str,
    method: &str,
) -> Result<T, GatewayError> {
    replay_result(next_output(replayer, port, method)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PutOutcome;
    use serde_json::json;

    #[test]
    fn ok_value_is_decoded() {
        let value: PutOutcome = replay_result(json!({"Ok": "Inserted"})).unwrap();
        assert_eq!(value, PutOutcome::Inserted);

        let missing: Option<String> = replay_result(json!({"Ok": null})).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn err_string_is_upstream() {
        let err =
            replay_result::<String>(json!({"Err": "dynamodb error: throttled"})).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Upstream { ref message, .. } if message == "dynamodb error: throttled"
        ));
    }

    #[test]
    fn recorded_error_kind_is_restored() {
        let err = replay_result::<String>(json!({
            "Err": {"kind": "conflict", "message": "profile teama_claude_3_5 already exists"}
        }))
        .unwrap_err();
        assert!(matches!(err, GatewayError::Conflict(_)));
        assert_eq!(err.status_code(), 409);

        let err = replay_result::<String>(json!({
            "Err": {"kind": "timeout", "operation": "converse", "seconds": 120}
        }))
        .unwrap_err();
        assert!(matches!(err, GatewayError::Timeout { seconds: 120, .. }));

        let err = replay_result::<String>(json!({
            "Err": {"kind": "malformed_reply", "message": "no text"}
        }))
        .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedReply(ref m) if m == "no text"));
    }

    #[test]
    fn unknown_error_kind_is_malformed() {
        let err = replay_result::<String>(json!({"Err": {"kind": "meltdown"}})).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedReply(_)));
    }

    #[test]
    fn mismatched_value_is_malformed() {
        let err = replay_result::<PutOutcome>(json!({"Ok": 12})).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedReply(_)));
    }
}
