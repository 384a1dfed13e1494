//! Recording adapter for the `ResourceProvisioner` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{
    FoundationModel, PortFuture, ProvisionRequest, ProvisionedProfile, ResourceProvisioner,
};

const PORT: &str = "provisioner";

/// Records provisioning calls while delegating to an inner implementation.
pub struct RecordingProvisioner {
    inner: Arc<dyn ResourceProvisioner>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingProvisioner {
    /// Wrap `inner`, writing interactions to `recorder`.
    pub fn new(
        inner: Arc<dyn ResourceProvisioner>,
        recorder: Arc<Mutex<CassetteRecorder>>,
    ) -> Self {
        Self { inner, recorder }
    }
}

impl ResourceProvisioner for RecordingProvisioner {
    fn create_profile(&self, request: &ProvisionRequest) -> PortFuture<'_, String> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.create_profile(&request).await;
            record_result(&self.recorder, PORT, "create_profile", &request, &result);
            result
        })
    }

    fn delete_profile(&self, profile_arn: &str) -> PortFuture<'_, ()> {
        let profile_arn = profile_arn.to_string();
        Box::pin(async move {
            let result = self.inner.delete_profile(&profile_arn).await;
            record_result(&self.recorder, PORT, "delete_profile", &profile_arn, &result);
            result
        })
    }

    fn list_profiles(&self) -> PortFuture<'_, Vec<ProvisionedProfile>> {
        Box::pin(async move {
            let result = self.inner.list_profiles().await;
            record_result(&self.recorder, PORT, "list_profiles", &(), &result);
            result
        })
    }

    fn list_foundation_models(&self) -> PortFuture<'_, Vec<FoundationModel>> {
        Box::pin(async move {
            let result = self.inner.list_foundation_models().await;
            record_result(&self.recorder, PORT, "list_foundation_models", &(), &result);
            result
        })
    }
}
