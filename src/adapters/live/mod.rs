//! Live adapters backed by the AWS SDK.

pub mod bedrock;
pub mod dynamodb;
pub mod runtime;
pub mod sts;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sts::error::DisplayErrorContext;

use crate::error::GatewayError;

pub use bedrock::BedrockProvisioner;
pub use dynamodb::DynamoProfileStore;
pub use runtime::BedrockInvoker;
pub use sts::StsIdentity;

/// Load shared SDK configuration for `region` from the default credential chain.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// Convert an SDK failure into an upstream error naming the failed operation.
pub(crate) fn sdk_failure<E: std::error::Error>(
    service: &str,
    operation: &str,
    err: E,
) -> GatewayError {
    GatewayError::upstream(service, format!("{operation} failed: {}", DisplayErrorContext(&err)))
}
