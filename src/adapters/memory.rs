//! In-process adapters for local runs and tests.
//!
//! State lives for the lifetime of the process. Each adapter can be told to
//! fail specific operations so callers can exercise partial-failure paths.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::GatewayError;
use crate::ports::{
    ConverseReply, ConverseRequest, FoundationModel, IdentityProvider, ModelInvoker, PortFuture,
    ProfileKey, ProfileRecord, ProfileStore, ProvisionRequest, ProvisionedProfile,
    PutOutcome, ResourceProvisioner, TokenUsage,
};

/// Operations an adapter has been told to fail.
#[derive(Debug, Default)]
struct Faults {
    failing: Mutex<HashSet<&'static str>>,
}

impl Faults {
    #[cfg(test)]
    fn inject(&self, operation: &'static str) {
        self.failing.lock().expect("faults lock poisoned").insert(operation);
    }

    #[cfg(test)]
    fn clear(&self) {
        self.failing.lock().expect("faults lock poisoned").clear();
    }

    fn check(&self, service: &str, operation: &str) -> Result<(), GatewayError> {
        if self.failing.lock().expect("faults lock poisoned").contains(operation) {
            return Err(GatewayError::upstream(service, format!("injected {operation} failure")));
        }
        Ok(())
    }
}

/// Identity port that always reports the same account.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    account_id: String,
}

impl StaticIdentity {
    /// Report `account_id` for every lookup.
    pub fn new(account_id: impl Into<String>) -> Self {
        Self { account_id: account_id.into() }
    }
}

impl IdentityProvider for StaticIdentity {
    fn account_id(&self) -> PortFuture<'_, String> {
        let account_id = self.account_id.clone();
        Box::pin(async move { Ok(account_id) })
    }
}

/// Provisioner that keeps application inference profiles in memory.
#[derive(Debug)]
pub struct MemoryProvisioner {
    region: String,
    account_id: String,
    profiles: Mutex<BTreeMap<String, ProvisionedProfile>>,
    next_id: AtomicU64,
    faults: Faults,
}

impl MemoryProvisioner {
    /// Create an empty provisioner that mints ARNs for `region`/`account_id`.
    pub fn new(region: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            account_id: account_id.into(),
            profiles: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            faults: Faults::default(),
        }
    }

    #[cfg(test)]
    /// Make `operation` (`"create"`, `"delete"`, `"list"`) fail until cleared.
    pub fn fail(&self, operation: &'static str) {
        self.faults.inject(operation);
    }

    #[cfg(test)]
    /// Stop failing injected operations.
    pub fn recover(&self) {
        self.faults.clear();
    }

    /// Snapshot of provisioned profiles.
    #[must_use]
    pub fn profiles(&self) -> Vec<ProvisionedProfile> {
        self.profiles.lock().expect("provisioner lock poisoned").values().cloned().collect()
    }
}

impl ResourceProvisioner for MemoryProvisioner {
    fn create_profile(&self, request: &ProvisionRequest) -> PortFuture<'_, String> {
        let request = request.clone();
        Box::pin(async move {
            self.faults.check("bedrock", "create")?;
            let mut profiles = self.profiles.lock().expect("provisioner lock poisoned");
            if profiles.values().any(|p| p.name == request.name) {
                return Err(GatewayError::Conflict(format!(
                    "profile {} already exists",
                    request.name
                )));
            }
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let arn = format!(
                "arn:aws:bedrock:{}:{}:application-inference-profile/mem{id:08}",
                self.region, self.account_id
            );
            profiles.insert(
                arn.clone(),
                ProvisionedProfile {
                    name: request.name,
                    arn: arn.clone(),
                    status: "ACTIVE".into(),
                    description: Some(request.description),
                },
            );
            Ok(arn)
        })
    }

    fn delete_profile(&self, profile_arn: &str) -> PortFuture<'_, ()> {
        let profile_arn = profile_arn.to_string();
        Box::pin(async move {
            self.faults.check("bedrock", "delete")?;
            let removed =
                self.profiles.lock().expect("provisioner lock poisoned").remove(&profile_arn);
            match removed {
                Some(_) => Ok(()),
                None => Err(GatewayError::upstream(
                    "bedrock",
                    format!("ResourceNotFoundException: {profile_arn}"),
                )),
            }
        })
    }

    fn list_profiles(&self) -> PortFuture<'_, Vec<ProvisionedProfile>> {
        Box::pin(async move {
            self.faults.check("bedrock", "list")?;
            Ok(self.profiles())
        })
    }

    fn list_foundation_models(&self) -> PortFuture<'_, Vec<FoundationModel>> {
        Box::pin(async move {
            self.faults.check("bedrock", "list")?;
            Ok(vec![
                FoundationModel {
                    model_id: "anthropic.claude-3-5-sonnet-20240620-v1:0".into(),
                    provider: "Anthropic".into(),
                    name: "Claude 3.5 Sonnet".into(),
                    status: "ACTIVE".into(),
                },
                FoundationModel {
                    model_id: "amazon.nova-pro-v1:0".into(),
                    provider: "Amazon".into(),
                    name: "Nova Pro".into(),
                    status: "ACTIVE".into(),
                },
            ])
        })
    }
}

/// Profile store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    records: Mutex<HashMap<ProfileKey, ProfileRecord>>,
    faults: Faults,
}

impl MemoryProfileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    /// Make `operation` (`"put"`, `"get"`, `"delete"`) fail until cleared.
    pub fn fail(&self, operation: &'static str) {
        self.faults.inject(operation);
    }

    #[cfg(test)]
    /// Stop failing injected operations.
    pub fn recover(&self) {
        self.faults.clear();
    }

    #[cfg(test)]
    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().expect("store lock poisoned").len()
    }

    #[cfg(test)]
    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProfileStore for MemoryProfileStore {
    fn put_if_absent(&self, record: &ProfileRecord) -> PortFuture<'_, PutOutcome> {
        let record = record.clone();
        Box::pin(async move {
            self.faults.check("dynamodb", "put")?;
            let mut records = self.records.lock().expect("store lock poisoned");
            let key = record.key();
            if records.contains_key(&key) {
                return Ok(PutOutcome::AlreadyExists);
            }
            records.insert(key, record);
            Ok(PutOutcome::Inserted)
        })
    }

    fn get(&self, key: &ProfileKey) -> PortFuture<'_, Option<ProfileRecord>> {
        let key = key.clone();
        Box::pin(async move {
            self.faults.check("dynamodb", "get")?;
            Ok(self.records.lock().expect("store lock poisoned").get(&key).cloned())
        })
    }

    fn delete(&self, key: &ProfileKey) -> PortFuture<'_, ()> {
        let key = key.clone();
        Box::pin(async move {
            self.faults.check("dynamodb", "delete")?;
            self.records.lock().expect("store lock poisoned").remove(&key);
            Ok(())
        })
    }
}

/// Invoker that answers by echoing the user message.
#[derive(Debug, Default)]
pub struct EchoInvoker {
    omit_text: bool,
    requests: Mutex<Vec<ConverseRequest>>,
    faults: Faults,
}

impl EchoInvoker {
    /// Create an invoker that echoes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    /// Create an invoker whose replies carry no text segment.
    #[must_use]
    pub fn without_text() -> Self {
        Self { omit_text: true, ..Self::default() }
    }

    #[cfg(test)]
    /// Make every conversation fail until cleared.
    pub fn fail(&self) {
        self.faults.inject("converse");
    }

    #[cfg(test)]
    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ConverseRequest> {
        self.requests.lock().expect("invoker lock poisoned").clone()
    }
}

impl ModelInvoker for EchoInvoker {
    fn converse(&self, request: &ConverseRequest) -> PortFuture<'_, ConverseReply> {
        let request = request.clone();
        Box::pin(async move {
            self.faults.check("bedrock-runtime", "converse")?;
            let input_tokens =
                word_count(&request.system_prompt) + word_count(&request.user_message);
            let text = format!("echo: {}", request.user_message);
            let output_tokens = word_count(&text);
            let reply = ConverseReply {
                text: (!self.omit_text).then_some(text),
                usage: Some(TokenUsage {
                    input_tokens,
                    output_tokens,
                    total_tokens: input_tokens + output_tokens,
                }),
            };
            self.requests.lock().expect("invoker lock poisoned").push(request);
            Ok(reply)
        })
    }
}

fn word_count(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}
