//! Model resolution: `(model_type, version, team?)` to a provider model.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::config::Config;
use crate::error::GatewayError;
use crate::ports::{bounded, IdentityProvider};

/// Registry key: a model family paired with a version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelKey {
    /// Model family, e.g. `"claude"`.
    pub model_type: String,
    /// Version within the family, e.g. `"3.5"`.
    pub version: String,
}

impl ModelKey {
    /// Build a key.
    pub fn new(model_type: impl Into<String>, version: impl Into<String>) -> Self {
        Self { model_type: model_type.into(), version: version.into() }
    }

    /// Parse a configuration key of the form `"{model_type}_{version}"`.
    ///
    /// Splits on the first `_`, so versions may contain underscores.
    #[must_use]
    pub fn from_registry_key(raw: &str) -> Option<Self> {
        let (model_type, version) = raw.split_once('_')?;
        if model_type.is_empty() || version.is_empty() {
            return None;
        }
        Some(Self::new(model_type, version))
    }

    /// Render as a configuration key.
    #[must_use]
    pub fn registry_key(&self) -> String {
        format!("{}_{}", self.model_type, self.version)
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.model_type, self.version)
    }
}

/// A model resolved for provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    /// Provider model id from the registry.
    pub model_id: String,
    /// Fully-qualified ARN built from region, account and model id.
    pub model_arn: String,
}

/// Build the ARN of a system inference profile.
#[must_use]
pub fn model_arn(region: &str, account_id: &str, model_id: &str) -> String {
    format!("arn:aws:bedrock:{region}:{account_id}:inference-profile/{model_id}")
}

/// Resolves registry entries, falling back to team defaults.
#[derive(Clone)]
pub struct Resolver {
    config: Arc<Config>,
    identity: Arc<dyn IdentityProvider>,
}

impl Resolver {
    /// Create a resolver over the given configuration and identity port.
    #[must_use]
    pub fn new(config: Arc<Config>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { config, identity }
    }

    /// Find the provider model id without touching any external service.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] when neither the requested key nor
    /// the team's default is in the registry.
    pub fn lookup(
        &self,
        model_type: &str,
        version: &str,
        team: Option<&str>,
    ) -> Result<&str, GatewayError> {
        let key = ModelKey::new(model_type, version);
        if let Some(model_id) = self.config.model_registry.get(&key) {
            return Ok(model_id.as_str());
        }

        let fallback = team.and_then(|t| self.config.team_defaults.get(t).map(|d| (t, d)));
        if let Some((team, default_key)) = fallback {
            if let Some(model_id) = self.config.model_registry.get(default_key) {
                warn!(
                    team,
                    requested = %key,
                    default = %default_key,
                    "model not found, using team default"
                );
                return Ok(model_id.as_str());
            }
        }

        Err(GatewayError::NotFound(format!(
            "Model ARN not found for model_type: {model_type}, version: {version}"
        )))
    }

    /// Resolve to a model id and ARN.
    ///
    /// The account id is looked up on every call.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] for unknown models, or the identity
    /// port's error if the account lookup fails.
    pub async fn resolve(
        &self,
        model_type: &str,
        version: &str,
        team: Option<&str>,
    ) -> Result<ResolvedModel, GatewayError> {
        let model_id = self.lookup(model_type, version, team)?.to_string();
        let account_id = bounded(
            "get_caller_identity",
            self.config.timeouts.identity,
            self.identity.account_id(),
        )
        .await?;
        let model_arn = model_arn(&self.config.aws.region, &account_id, &model_id);
        Ok(ResolvedModel { model_id, model_arn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::StaticIdentity;

    fn resolver() -> Resolver {
        Resolver::new(Arc::new(Config::sample()), Arc::new(StaticIdentity::new("111122223333")))
    }

    #[test]
    fn registry_key_round_trip() {
        let key = ModelKey::from_registry_key("claude_3.5").unwrap();
        assert_eq!(key, ModelKey::new("claude", "3.5"));
        assert_eq!(key.registry_key(), "claude_3.5");
        assert!(ModelKey::from_registry_key("claude").is_none());
        assert!(ModelKey::from_registry_key("_3.5").is_none());
    }

    #[tokio::test]
    async fn every_registry_entry_resolves_with_region_and_id() {
        let config = Config::sample();
        let resolver = resolver();
        for (key, model_id) in &config.model_registry {
            let resolved = resolver.resolve(&key.model_type, &key.version, None).await.unwrap();
            assert_eq!(&resolved.model_id, model_id);
            assert!(resolved.model_arn.contains("us-west-2"));
            assert!(resolved.model_arn.contains("111122223333"));
            assert!(resolved.model_arn.ends_with(model_id.as_str()));
        }
    }

    #[tokio::test]
    async fn exact_match_builds_arn() {
        let resolved = resolver().resolve("claude", "3.5", Some("teamb")).await.unwrap();
        assert_eq!(resolved.model_id, "us.anthropic.claude-3-5-sonnet-20240620-v1:0");
        assert_eq!(
            resolved.model_arn,
            "arn:aws:bedrock:us-west-2:111122223333:inference-profile/\
             us.anthropic.claude-3-5-sonnet-20240620-v1:0"
        );
    }

    #[tokio::test]
    async fn unknown_model_falls_back_to_team_default() {
        let resolved = resolver().resolve("claude", "9.9", Some("teamb")).await.unwrap();
        assert_eq!(resolved.model_id, "us.amazon.nova-pro-v1:0");
    }

    #[test]
    fn unknown_model_without_default_is_not_found() {
        let resolver = resolver();
        let err = resolver.lookup("llama", "3", None).unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
        assert!(err.to_string().contains("model_type: llama, version: 3"));

        // teamc has no default configured
        assert!(resolver.lookup("llama", "3", Some("teamc")).is_err());
    }

    #[test]
    fn default_missing_from_registry_is_not_found() {
        let mut config = Config::sample();
        config.team_defaults.insert("teamc".into(), ModelKey::new("mistral", "7b"));
        let resolver = Resolver::new(Arc::new(config), Arc::new(StaticIdentity::new("1")));
        assert!(matches!(
            resolver.lookup("llama", "3", Some("teamc")),
            Err(GatewayError::NotFound(_))
        ));
    }
}
