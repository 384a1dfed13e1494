//! Recording adapters that capture interactions to cassettes.
//!
//! Each adapter delegates to an inner port and records the call's input and
//! result before handing the result back unchanged.

pub mod identity;
pub mod model_invoker;
pub mod profile_store;
pub mod provisioner;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::format::RecordedError;
use crate::cassette::recorder::CassetteRecorder;
use crate::error::GatewayError;

pub use identity::RecordingIdentity;
pub use model_invoker::RecordingModelInvoker;
pub use profile_store::RecordingProfileStore;
pub use provisioner::RecordingProvisioner;

/// Record a port result using the Ok/Err JSON convention. Errors keep their
/// kind so replay hands back the same variant.
pub(crate) fn record_result<T, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, GatewayError>,
) where
    T: Serialize,
    I: Serialize + ?Sized,
{
    let input_json = serde_json::to_value(input).expect("failed to serialize recording input");

    let output_json = match result {
        Ok(v) => {
            let inner = serde_json::to_value(v).expect("failed to serialize Ok value");
            serde_json::json!({ "Ok": inner })
        }
        Err(e) => {
            let inner = serde_json::to_value(RecordedError::from(e))
                .expect("failed to serialize Err value");
            serde_json::json!({ "Err": inner })
        }
    };

    let mut guard = recorder.lock().expect("recorder lock poisoned");
    guard.record(port, method, input_json, output_json);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryProfileStore, StaticIdentity};
    use crate::ports::{IdentityProvider, ProfileKey, ProfileStore};

    fn recorder() -> Arc<Mutex<CassetteRecorder>> {
        let path = std::env::temp_dir().join("profile_gateway_recording_unused.yaml");
        Arc::new(Mutex::new(CassetteRecorder::new(path, "test", "abc")))
    }

    #[test]
    fn ok_and_err_conventions() {
        let recorder = recorder();
        record_result(&recorder, "identity", "account_id", &(), &Ok("1"));
        record_result::<String, _>(
            &recorder,
            "provisioner",
            "create_profile",
            &(),
            &Err(GatewayError::Conflict("profile teama_claude_3_5 already exists".into())),
        );

        let guard = recorder.lock().unwrap();
        assert_eq!(guard.len(), 2);
        let outputs = guard.outputs();
        assert_eq!(outputs[0], serde_json::json!({"Ok": "1"}));
        assert_eq!(
            outputs[1],
            serde_json::json!({
                "Err": {"kind": "conflict", "message": "profile teama_claude_3_5 already exists"}
            })
        );
    }

    #[tokio::test]
    async fn adapters_pass_results_through() {
        let recorder = recorder();
        let identity = RecordingIdentity::new(
            Arc::new(StaticIdentity::new("111122223333")),
            Arc::clone(&recorder),
        );
        assert_eq!(identity.account_id().await.unwrap(), "111122223333");

        let store = Arc::new(MemoryProfileStore::new());
        store.fail("get");
        let recording = RecordingProfileStore::new(store, Arc::clone(&recorder));
        let key = ProfileKey::new("teama", "claude", "3.5");
        assert!(recording.get(&key).await.is_err());

        assert_eq!(recorder.lock().unwrap().len(), 2);
    }
}
