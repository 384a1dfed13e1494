//! Recording adapter for the `IdentityProvider` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{IdentityProvider, PortFuture};

/// Records account lookups while delegating to an inner implementation.
pub struct RecordingIdentity {
    inner: Arc<dyn IdentityProvider>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingIdentity {
    /// Wrap `inner`, writing interactions to `recorder`.
    pub fn new(inner: Arc<dyn IdentityProvider>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl IdentityProvider for RecordingIdentity {
    fn account_id(&self) -> PortFuture<'_, String> {
        Box::pin(async move {
            let result = self.inner.account_id().await;
            record_result(&self.recorder, "identity", "account_id", &(), &result);
            result
        })
    }
}
