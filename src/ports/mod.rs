//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system. Implementations live in `src/adapters/`.

pub mod identity;
pub mod model_invoker;
pub mod profile_store;
pub mod provisioner;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::GatewayError;

pub use identity::IdentityProvider;
pub use model_invoker::{ConverseReply, ConverseRequest, ModelInvoker, TokenUsage};
pub use profile_store::{ProfileKey, ProfileRecord, ProfileStore, PutOutcome};
pub use provisioner::{
    FoundationModel, ProfileTag, ProvisionRequest, ProvisionedProfile, ResourceProvisioner,
};

/// Boxed future returned by every port method.
pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

/// Run a port call under a deadline of `seconds`.
///
/// # Errors
///
/// Returns [`GatewayError::Timeout`] when the deadline elapses, otherwise the
/// call's own result.
pub async fn bounded<T, F>(operation: &str, seconds: u64, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    tokio::time::timeout(Duration::from_secs(seconds), call)
        .await
        .unwrap_or_else(|_| {
            Err(GatewayError::Timeout { operation: operation.to_string(), seconds })
        })
}
