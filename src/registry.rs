//! Profile lifecycle: create, get, delete and use.
//!
//! Each `(team, model_type, version)` key is either absent or provisioned.
//! A profile lives in two places, the provider (the inference profile itself)
//! and the profile store (the record pointing at it). Neither write is
//! transactional with the other, which leaves two known windows:
//!
//! - create: the profile is provisioned, then the conditional put finds an
//!   existing record. The new profile is orphaned unless
//!   `profiles.compensate_orphans` is set, in which case it is deleted again.
//! - delete: the profile is deprovisioned, then removing the record fails.
//!   The record keeps pointing at a profile that no longer exists.
//!
//! Uniqueness of a key is enforced by the store's conditional write and, for
//! racing creates, by the provider rejecting a second profile with the same
//! name. Either rejection is reported as a conflict.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::conversation::{Conversation, ConversationProxy};
use crate::error::GatewayError;
use crate::model::Resolver;
use crate::naming::{sanitize_profile_name, sanitize_user_input};
use crate::ports::{
    bounded, ProfileKey, ProfileRecord, ProfileStore, ProfileTag, ProvisionRequest,
    ProvisionedProfile, PutOutcome, ResourceProvisioner,
};

/// Acknowledgement returned by a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Deleted {
    /// Always `true`.
    pub deleted: bool,
}

/// Orchestrates the provider and the profile store.
#[derive(Clone)]
pub struct ProfileRegistry {
    config: Arc<Config>,
    resolver: Resolver,
    provisioner: Arc<dyn ResourceProvisioner>,
    store: Arc<dyn ProfileStore>,
    proxy: ConversationProxy,
}

impl ProfileRegistry {
    /// Wire a registry from its collaborators.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        resolver: Resolver,
        provisioner: Arc<dyn ResourceProvisioner>,
        store: Arc<dyn ProfileStore>,
        proxy: ConversationProxy,
    ) -> Self {
        Self { config, resolver, provisioner, store, proxy }
    }

    /// Provision a profile for the key and record it.
    ///
    /// An existing record is reported before anything is provisioned; the
    /// conditional put still guards against a concurrent create.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::NotFound`] if the model cannot be resolved.
    /// - [`GatewayError::Conflict`] if a record already exists for the key or
    ///   the provider already holds a profile with the same name.
    /// - Upstream or timeout errors from the provider or store.
    pub async fn create(
        &self,
        team: &str,
        model_type: &str,
        version: &str,
    ) -> Result<ProfileRecord, GatewayError> {
        if self.get(team, model_type, version).await?.is_some() {
            return Err(conflict(team, model_type, version));
        }

        let resolved = self.resolver.resolve(model_type, version, Some(team)).await?;
        let request = ProvisionRequest {
            name: sanitize_profile_name(team, model_type, version),
            description: format!(
                "Inference profile for {team} with {model_type} version {version}"
            ),
            source_arn: resolved.model_arn.clone(),
            tags: vec![
                ProfileTag::new("Team", team),
                ProfileTag::new("model_type", model_type),
                ProfileTag::new("version", version),
            ],
        };

        let profile_id = bounded(
            "create_inference_profile",
            self.config.timeouts.provisioning,
            self.provisioner.create_profile(&request),
        )
        .await
        .map_err(|e| match e {
            GatewayError::Conflict(detail) => {
                warn!(team, profile = %request.name, %detail, "profile name already taken");
                conflict(team, model_type, version)
            }
            other => {
                error!(
                    team,
                    profile = %request.name,
                    error = %other,
                    "failed to create inference profile"
                );
                other
            }
        })?;

        let record = ProfileRecord {
            team_tag: team.to_string(),
            model_type: model_type.to_string(),
            version: version.to_string(),
            profile_id,
            model_arn: resolved.model_arn,
        };

        let outcome =
            bounded("put_item", self.config.timeouts.store, self.store.put_if_absent(&record))
                .await
                .inspect_err(|e| {
                    error!(
                        team,
                        profile_id = %record.profile_id,
                        error = %e,
                        "failed to store profile record"
                    );
                })?;

        if outcome == PutOutcome::AlreadyExists {
            warn!(
                team,
                model_type,
                version,
                profile_id = %record.profile_id,
                "profile record already exists"
            );
            if self.config.profiles.compensate_orphans {
                self.remove_orphan(&record.profile_id).await;
            }
            return Err(conflict(team, model_type, version));
        }

        info!(
            team,
            profile = %request.name,
            profile_id = %record.profile_id,
            "created inference profile"
        );
        Ok(record)
    }

    /// Look up the record for the key.
    ///
    /// # Errors
    ///
    /// Returns upstream or timeout errors from the store. A missing record is
    /// `Ok(None)`.
    pub async fn get(
        &self,
        team: &str,
        model_type: &str,
        version: &str,
    ) -> Result<Option<ProfileRecord>, GatewayError> {
        let key = ProfileKey::new(team, model_type, version);
        let record = bounded("get_item", self.config.timeouts.store, self.store.get(&key)).await?;
        if record.is_none() {
            info!(team, model_type, version, "no profile found");
        }
        Ok(record)
    }

    /// Deprovision the key's profile, then remove its record.
    ///
    /// If deprovisioning fails the record is left in place.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] when no record exists; upstream or timeout
    /// errors from either step otherwise.
    pub async fn delete(
        &self,
        team: &str,
        model_type: &str,
        version: &str,
    ) -> Result<Deleted, GatewayError> {
        let record = self
            .get(team, model_type, version)
            .await?
            .ok_or_else(|| not_found(team, model_type))?;

        bounded(
            "delete_inference_profile",
            self.config.timeouts.provisioning,
            self.provisioner.delete_profile(&record.profile_id),
        )
        .await
        .inspect_err(|e| {
            error!(
                team,
                profile_id = %record.profile_id,
                error = %e,
                "failed to delete inference profile"
            );
        })?;
        info!(team, profile_id = %record.profile_id, "deleted inference profile");

        bounded("delete_item", self.config.timeouts.store, self.store.delete(&record.key()))
            .await
            .inspect_err(|e| {
                error!(
                    team,
                    profile_id = %record.profile_id,
                    error = %e,
                    "profile deprovisioned but record removal failed; record is stale"
                );
            })?;

        info!(team, model_type, version, "deleted profile record");
        Ok(Deleted { deleted: true })
    }

    /// Converse with the model behind the key's profile.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] when no record exists; conversation errors
    /// otherwise.
    pub async fn use_profile(
        &self,
        team: &str,
        model_type: &str,
        version: &str,
        user_message: &str,
        system_prompt: Option<&str>,
    ) -> Result<Conversation, GatewayError> {
        let record = self
            .get(team, model_type, version)
            .await?
            .ok_or_else(|| not_found(team, model_type))?;
        self.proxy.converse(&record.profile_id, user_message, system_prompt).await
    }

    /// List application inference profiles known to the provider.
    ///
    /// # Errors
    ///
    /// Returns upstream or timeout errors from the provider.
    pub async fn list_provisioned(&self) -> Result<Vec<ProvisionedProfile>, GatewayError> {
        bounded(
            "list_inference_profiles",
            self.config.timeouts.provisioning,
            self.provisioner.list_profiles(),
        )
        .await
    }

    async fn remove_orphan(&self, profile_id: &str) {
        let result = bounded(
            "delete_inference_profile",
            self.config.timeouts.provisioning,
            self.provisioner.delete_profile(profile_id),
        )
        .await;
        match result {
            Ok(()) => info!(profile_id, "removed orphaned inference profile"),
            Err(e) => {
                error!(profile_id, error = %e, "failed to remove orphaned inference profile");
            }
        }
    }
}

fn conflict(team: &str, model_type: &str, version: &str) -> GatewayError {
    GatewayError::Conflict(format!(
        "Profile already exists for team {} with model {} version {}",
        sanitize_user_input(team),
        sanitize_user_input(model_type),
        sanitize_user_input(version)
    ))
}

/// Message for a missing profile, with caller input made safe to echo.
pub(crate) fn not_found(team: &str, model_type: &str) -> GatewayError {
    GatewayError::NotFound(format!(
        "No profile found for team {} with model {}",
        sanitize_user_input(team),
        sanitize_user_input(model_type)
    ))
}
