//! Identity port for looking up the calling AWS account.

use super::PortFuture;

/// Reports the account the service is running as.
pub trait IdentityProvider: Send + Sync {
    /// Account id of the current caller.
    fn account_id(&self) -> PortFuture<'_, String>;
}
