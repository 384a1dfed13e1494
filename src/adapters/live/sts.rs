//! Account lookup through STS `GetCallerIdentity`.

use aws_config::SdkConfig;

use super::sdk_failure;
use crate::error::GatewayError;
use crate::ports::{IdentityProvider, PortFuture};

/// Resolves the account id of the ambient credentials.
#[derive(Debug, Clone)]
pub struct StsIdentity {
    client: aws_sdk_sts::Client,
}

impl StsIdentity {
    /// Create a client from shared SDK configuration.
    #[must_use]
    pub fn new(sdk: &SdkConfig) -> Self {
        Self { client: aws_sdk_sts::Client::new(sdk) }
    }
}

impl IdentityProvider for StsIdentity {
    fn account_id(&self) -> PortFuture<'_, String> {
        Box::pin(async move {
            let output = self
                .client
                .get_caller_identity()
                .send()
                .await
                .map_err(|e| sdk_failure("sts", "GetCallerIdentity", e))?;
            output
                .account()
                .map(str::to_string)
                .ok_or_else(|| {
                    GatewayError::upstream("sts", "GetCallerIdentity returned no account")
                })
        })
    }
}
