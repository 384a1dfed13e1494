//! Replaying adapter for the `ResourceProvisioner` port.

use super::{replay, SharedReplayer};
use crate::ports::{
    FoundationModel, PortFuture, ProvisionRequest, ProvisionedProfile, ResourceProvisioner,
};

const PORT: &str = "provisioner";

/// Serves recorded provisioning results from a cassette.
pub struct ReplayingProvisioner {
    replayer: SharedReplayer,
}

impl ReplayingProvisioner {
    /// Create a provisioner backed by the given replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl ResourceProvisioner for ReplayingProvisioner {
    fn create_profile(&self, _request: &ProvisionRequest) -> PortFuture<'_, String> {
        let result = replay::<String>(&self.replayer, PORT, "create_profile");
        Box::pin(async move { result })
    }

    fn delete_profile(&self, _profile_arn: &str) -> PortFuture<'_, ()> {
        let result = replay::<()>(&self.replayer, PORT, "delete_profile");
        Box::pin(async move { result })
    }

    fn list_profiles(&self) -> PortFuture<'_, Vec<ProvisionedProfile>> {
        let result = replay::<Vec<ProvisionedProfile>>(&self.replayer, PORT, "list_profiles");
        Box::pin(async move { result })
    }

    fn list_foundation_models(&self) -> PortFuture<'_, Vec<FoundationModel>> {
        let result = replay::<Vec<FoundationModel>>(&self.replayer, PORT, "list_foundation_models");
        Box::pin(async move { result })
    }
}
