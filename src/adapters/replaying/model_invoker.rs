//! Replaying adapter for the `ModelInvoker` port.

use super::{replay, SharedReplayer};
use crate::ports::{ConverseReply, ConverseRequest, ModelInvoker, PortFuture};

/// Serves recorded conversations from a cassette.
pub struct ReplayingModelInvoker {
    replayer: SharedReplayer,
}

impl ReplayingModelInvoker {
    /// Create an invoker backed by the given replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl ModelInvoker for ReplayingModelInvoker {
    fn converse(&self, _request: &ConverseRequest) -> PortFuture<'_, ConverseReply> {
        let result = replay::<ConverseReply>(&self.replayer, "model_invoker", "converse");
        Box::pin(async move { result })
    }
}
