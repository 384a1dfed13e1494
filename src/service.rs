//! Request dispatch shared by the HTTP surface and the command line.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::context::ServiceContext;
use crate::conversation::ConversationProxy;
use crate::error::GatewayError;
use crate::model::Resolver;
use crate::params::{validate_request, Action, ProfileRequest, ValidatedRequest};
use crate::ports::{bounded, ResourceProvisioner};
use crate::registry::{not_found, ProfileRegistry};

/// Response body shared by every endpoint.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope {
    /// The operation succeeded.
    Success {
        /// Action-specific payload.
        data: Value,
        /// Seconds spent handling the request, rounded to milliseconds.
        processing_time: f64,
    },
    /// The operation failed.
    Error {
        /// Caller-safe description.
        message: String,
    },
}

impl Envelope {
    /// Wrap a successful payload.
    #[must_use]
    pub fn success(data: Value, elapsed: Duration) -> Self {
        let processing_time = (elapsed.as_secs_f64() * 1000.0).round() / 1000.0;
        Self::Success { data, processing_time }
    }

    /// Wrap a failure message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }
}

/// Validates requests and routes them to the registry.
pub struct ProfileService {
    config: Arc<Config>,
    registry: ProfileRegistry,
    provisioner: Arc<dyn ResourceProvisioner>,
}

impl ProfileService {
    /// Build the service from configuration and wired ports.
    #[must_use]
    pub fn new(config: Arc<Config>, ctx: &ServiceContext) -> Self {
        let resolver = Resolver::new(Arc::clone(&config), Arc::clone(&ctx.identity));
        let proxy = ConversationProxy::new(Arc::clone(&ctx.invoker), &config);
        let registry = ProfileRegistry::new(
            Arc::clone(&config),
            resolver,
            Arc::clone(&ctx.provisioner),
            Arc::clone(&ctx.store),
            proxy,
        );
        Self { config, registry, provisioner: Arc::clone(&ctx.provisioner) }
    }

    /// Validate a raw JSON body and run it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] for bad input, otherwise whatever
    /// the requested operation fails with.
    pub async fn handle(&self, body: Value) -> Result<Value, GatewayError> {
        let request = ProfileRequest::from_json(body)?;
        self.handle_request(request).await
    }

    /// Validate an already-decoded request and run it.
    ///
    /// # Errors
    ///
    /// See [`ProfileService::handle`].
    pub async fn handle_request(&self, request: ProfileRequest) -> Result<Value, GatewayError> {
        let request = validate_request(request, &self.config.validation)?;
        debug!(
            team = %request.team,
            action = %request.action,
            model_type = %request.model_type,
            version = %request.version,
            "dispatching profile request"
        );
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: ValidatedRequest) -> Result<Value, GatewayError> {
        let ValidatedRequest { team, action, model_type, version, user_message, system_prompt } =
            request;

        match action {
            Action::Create => to_value(self.registry.create(&team, &model_type, &version).await?),
            Action::Get => {
                let record = self
                    .registry
                    .get(&team, &model_type, &version)
                    .await?
                    .ok_or_else(|| not_found(&team, &model_type))?;
                to_value(record)
            }
            Action::Delete => to_value(self.registry.delete(&team, &model_type, &version).await?),
            Action::Use => {
                let message = user_message.ok_or_else(|| {
                    GatewayError::Validation("user_message is required for 'use' action".into())
                })?;
                let conversation = self
                    .registry
                    .use_profile(&team, &model_type, &version, &message, system_prompt.as_deref())
                    .await?;
                to_value(conversation)
            }
        }
    }

    /// Report provider reachability, available models and the configured registry.
    ///
    /// # Errors
    ///
    /// Returns upstream or timeout errors from the provider.
    pub async fn provider_health(&self) -> Result<Value, GatewayError> {
        let models = bounded(
            "list_foundation_models",
            self.config.timeouts.provisioning,
            self.provisioner.list_foundation_models(),
        )
        .await?;
        let profiles = self.registry.list_provisioned().await?;

        let claude_models: Vec<_> =
            models.iter().filter(|m| m.model_id.to_lowercase().contains("claude")).collect();

        Ok(json!({
            "message": "Bedrock service is healthy",
            "region": self.config.aws.region,
            "total_models": models.len(),
            "claude_models": claude_models,
            "configured_models": self.config.registry_by_name(),
            "application_profiles": profiles,
        }))
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value, GatewayError> {
    serde_json::to_value(value)
        .map_err(|e| GatewayError::MalformedReply(format!("failed to encode response: {e}")))
}
