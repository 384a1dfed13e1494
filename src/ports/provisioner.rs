//! Resource provisioner port for Bedrock application inference profiles.

use serde::{Deserialize, Serialize};

use super::PortFuture;

/// A key/value tag attached to a provisioned profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileTag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

impl ProfileTag {
    /// Build a tag.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// A request to provision a named inference profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionRequest {
    /// Resource-safe profile name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// ARN of the model to copy from.
    pub source_arn: String,
    /// Tags applied to the profile.
    pub tags: Vec<ProfileTag>,
}

/// Summary of an application inference profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionedProfile {
    /// Profile name.
    pub name: String,
    /// Profile ARN.
    pub arn: String,
    /// Lifecycle status reported by the provider.
    pub status: String,
    /// Description, if set.
    #[serde(default)]
    pub description: Option<String>,
}

/// A foundation model offered by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoundationModel {
    /// Provider model id.
    #[serde(rename = "modelId")]
    pub model_id: String,
    /// Vendor name.
    pub provider: String,
    /// Display name, `"N/A"` when absent.
    pub name: String,
    /// Lifecycle status, `"N/A"` when absent.
    pub status: String,
}

/// Creates and removes inference profiles on the hosting provider.
pub trait ResourceProvisioner: Send + Sync {
    /// Provision a profile and return its ARN.
    fn create_profile(&self, request: &ProvisionRequest) -> PortFuture<'_, String>;

    /// Remove the profile identified by `profile_arn`.
    fn delete_profile(&self, profile_arn: &str) -> PortFuture<'_, ()>;

    /// List application inference profiles.
    fn list_profiles(&self) -> PortFuture<'_, Vec<ProvisionedProfile>>;

    /// List foundation models available in the region.
    fn list_foundation_models(&self) -> PortFuture<'_, Vec<FoundationModel>>;
}
