//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::adapters::live::{
    load_sdk_config, BedrockInvoker, BedrockProvisioner, DynamoProfileStore, StsIdentity,
};
use crate::adapters::memory::{
    EchoInvoker, MemoryProfileStore, MemoryProvisioner, StaticIdentity,
};
use crate::adapters::recording::{
    RecordingIdentity, RecordingModelInvoker, RecordingProfileStore, RecordingProvisioner,
};
use crate::adapters::replaying::{
    ReplayingIdentity, ReplayingModelInvoker, ReplayingProfileStore, ReplayingProvisioner,
};
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::Config;
use crate::error::GatewayError;
use crate::ports::{IdentityProvider, ModelInvoker, ProfileStore, ResourceProvisioner};

/// Account id reported by the in-memory backend.
pub const MEMORY_ACCOUNT_ID: &str = "000000000000";

/// Directory recording sessions are written under.
const CASSETTE_DIR: &str = ".profile-gateway/cassettes";

/// Bundles all port trait objects into a single context.
#[derive(Clone)]
pub struct ServiceContext {
    /// Inference profile provisioning.
    pub provisioner: Arc<dyn ResourceProvisioner>,
    /// Persisted team/profile records.
    pub store: Arc<dyn ProfileStore>,
    /// Model conversations.
    pub invoker: Arc<dyn ModelInvoker>,
    /// Account lookup for ARN construction.
    pub identity: Arc<dyn IdentityProvider>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Write every interaction recorded so far to disk.
    ///
    /// Adapters may still hold the recorder; later interactions are kept
    /// for the next call.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(&self) -> Result<PathBuf, String> {
        let recorder = self.recorder.lock().map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder
            .write()
            .map(Path::to_path_buf)
            .map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a context backed by AWS using the default credential chain.
    pub async fn live(config: &Config) -> Self {
        let sdk = load_sdk_config(&config.aws.region).await;
        info!(
            region = %config.aws.region,
            table = %config.aws.dynamodb_table,
            "AWS clients initialized"
        );
        Self {
            provisioner: Arc::new(BedrockProvisioner::new(&sdk)),
            store: Arc::new(DynamoProfileStore::new(&sdk, config.aws.dynamodb_table.clone())),
            invoker: Arc::new(BedrockInvoker::new(&sdk)),
            identity: Arc::new(StsIdentity::new(&sdk)),
        }
    }

    /// Create a context whose state lives in this process.
    #[must_use]
    pub fn memory(config: &Config) -> Self {
        Self {
            provisioner: Arc::new(MemoryProvisioner::new(
                config.aws.region.clone(),
                MEMORY_ACCOUNT_ID,
            )),
            store: Arc::new(MemoryProfileStore::new()),
            invoker: Arc::new(EchoInvoker::new()),
            identity: Arc::new(StaticIdentity::new(MEMORY_ACCOUNT_ID)),
        }
    }

    /// Create a recording context that wraps the live adapters with a recorder.
    pub async fn recording(config: &Config) -> (Self, RecordingSession) {
        let live = Self::live(config).await;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path =
            PathBuf::from(CASSETTE_DIR).join(&timestamp).join("profile_gateway.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-profile_gateway"),
            get_commit_hash(),
        )));

        let ctx = Self {
            provisioner: Arc::new(RecordingProvisioner::new(
                live.provisioner,
                Arc::clone(&recorder),
            )),
            store: Arc::new(RecordingProfileStore::new(live.store, Arc::clone(&recorder))),
            invoker: Arc::new(RecordingModelInvoker::new(live.invoker, Arc::clone(&recorder))),
            identity: Arc::new(RecordingIdentity::new(live.identity, Arc::clone(&recorder))),
        };
        (ctx, RecordingSession { recorder })
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, GatewayError> {
        let replayer = load_cassette(path)
            .map_err(|e| GatewayError::Config(format!("Failed to load cassette: {e}")))?;
        let replayer = Arc::new(Mutex::new(replayer));
        Ok(Self {
            provisioner: Arc::new(ReplayingProvisioner::new(Arc::clone(&replayer))),
            store: Arc::new(ReplayingProfileStore::new(Arc::clone(&replayer))),
            invoker: Arc::new(ReplayingModelInvoker::new(Arc::clone(&replayer))),
            identity: Arc::new(ReplayingIdentity::new(replayer)),
        })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
