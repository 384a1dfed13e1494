//! Replaying adapter for the `IdentityProvider` port.

use super::{replay, SharedReplayer};
use crate::ports::{IdentityProvider, PortFuture};

/// Serves recorded account lookups from a cassette.
pub struct ReplayingIdentity {
    replayer: SharedReplayer,
}

impl ReplayingIdentity {
    /// Create an identity port backed by the given replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl IdentityProvider for ReplayingIdentity {
    fn account_id(&self) -> PortFuture<'_, String> {
        let result = replay::<String>(&self.replayer, "identity", "account_id");
        Box::pin(async move { result })
    }
}
