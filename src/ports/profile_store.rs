//! Profile store port for the persisted team → profile mapping.

use serde::{Deserialize, Serialize};

use super::PortFuture;

/// Composite primary key of a profile record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileKey {
    /// Partition key.
    pub team_tag: String,
    /// Sort key, `"{model_type}#{version}"`.
    pub model_type_version: String,
}

impl ProfileKey {
    /// Build the key for a team, model type and version.
    pub fn new(team_tag: impl Into<String>, model_type: &str, version: &str) -> Self {
        Self { team_tag: team_tag.into(), model_type_version: format!("{model_type}#{version}") }
    }
}

/// A team's inference profile as persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Owning team.
    pub team_tag: String,
    /// Model family, e.g. `"claude"`.
    pub model_type: String,
    /// Model version, e.g. `"3.5"`.
    pub version: String,
    /// ARN of the provisioned inference profile.
    pub profile_id: String,
    /// Fully-qualified ARN of the model the profile was copied from.
    pub model_arn: String,
}

impl ProfileRecord {
    /// Composite key of this record.
    #[must_use]
    pub fn key(&self) -> ProfileKey {
        ProfileKey::new(self.team_tag.clone(), &self.model_type, &self.version)
    }
}

/// Result of a conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PutOutcome {
    /// The record was written.
    Inserted,
    /// A record with the same key already existed; nothing was written.
    AlreadyExists,
}

/// Key-value storage for profile records.
pub trait ProfileStore: Send + Sync {
    /// Write `record` only if no record with the same key exists.
    fn put_if_absent(&self, record: &ProfileRecord) -> PortFuture<'_, PutOutcome>;

    /// Read the record stored under `key`.
    fn get(&self, key: &ProfileKey) -> PortFuture<'_, Option<ProfileRecord>>;

    /// Remove the record stored under `key`. Removing a missing key succeeds.
    fn delete(&self, key: &ProfileKey) -> PortFuture<'_, ()>;
}
