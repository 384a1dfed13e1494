//! Application inference profiles on the Bedrock control plane.

use aws_config::SdkConfig;
use aws_sdk_bedrock::types::{InferenceProfileModelSource, InferenceProfileType, Tag};
use tracing::debug;

use super::sdk_failure;
use crate::error::GatewayError;
use crate::ports::{
    FoundationModel, PortFuture, ProvisionRequest, ProvisionedProfile, ResourceProvisioner,
};

const SERVICE: &str = "bedrock";

/// Creates, deletes and lists application inference profiles.
#[derive(Debug, Clone)]
pub struct BedrockProvisioner {
    client: aws_sdk_bedrock::Client,
}

impl BedrockProvisioner {
    /// Create a client from shared SDK configuration.
    #[must_use]
    pub fn new(sdk: &SdkConfig) -> Self {
        Self { client: aws_sdk_bedrock::Client::new(sdk) }
    }
}

impl ResourceProvisioner for BedrockProvisioner {
    fn create_profile(&self, request: &ProvisionRequest) -> PortFuture<'_, String> {
        let request = request.clone();
        Box::pin(async move {
            let tags = request
                .tags
                .iter()
                .map(|t| Tag::builder().key(&t.key).value(&t.value).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| GatewayError::upstream(SERVICE, format!("invalid tag: {e}")))?;

            let output = self
                .client
                .create_inference_profile()
                .inference_profile_name(&request.name)
                .description(&request.description)
                .model_source(InferenceProfileModelSource::CopyFrom(request.source_arn.clone()))
                .set_tags(Some(tags))
                .send()
                .await
                .map_err(|e| {
                    if e.as_service_error().is_some_and(|s| s.is_conflict_exception()) {
                        GatewayError::Conflict(format!("profile {} already exists", request.name))
                    } else {
                        sdk_failure(SERVICE, "CreateInferenceProfile", e)
                    }
                })?;

            let arn = output.inference_profile_arn().to_string();
            debug!(name = %request.name, %arn, "created inference profile");
            Ok(arn)
        })
    }

    fn delete_profile(&self, profile_arn: &str) -> PortFuture<'_, ()> {
        let profile_arn = profile_arn.to_string();
        Box::pin(async move {
            self.client
                .delete_inference_profile()
                .inference_profile_identifier(&profile_arn)
                .send()
                .await
                .map_err(|e| sdk_failure(SERVICE, "DeleteInferenceProfile", e))?;
            Ok(())
        })
    }

    fn list_profiles(&self) -> PortFuture<'_, Vec<ProvisionedProfile>> {
        Box::pin(async move {
            let output = self
                .client
                .list_inference_profiles()
                .type_equals(InferenceProfileType::Application)
                .send()
                .await
                .map_err(|e| sdk_failure(SERVICE, "ListInferenceProfiles", e))?;

            Ok(output
                .inference_profile_summaries()
                .iter()
                .map(|p| ProvisionedProfile {
                    name: p.inference_profile_name().to_string(),
                    arn: p.inference_profile_arn().to_string(),
                    status: p.status().as_str().to_string(),
                    description: p.description().map(str::to_string),
                })
                .collect())
        })
    }

    fn list_foundation_models(&self) -> PortFuture<'_, Vec<FoundationModel>> {
        Box::pin(async move {
            let output = self
                .client
                .list_foundation_models()
                .send()
                .await
                .map_err(|e| sdk_failure(SERVICE, "ListFoundationModels", e))?;

            Ok(output
                .model_summaries()
                .iter()
                .map(|m| FoundationModel {
                    model_id: m.model_id().to_string(),
                    provider: m.provider_name().unwrap_or("N/A").to_string(),
                    name: m.model_name().unwrap_or("N/A").to_string(),
                    status: m
                        .model_lifecycle()
                        .map_or("N/A", |l| l.status().as_str())
                        .to_string(),
                })
                .collect())
        })
    }
}
