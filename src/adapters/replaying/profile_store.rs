//! Replaying adapter for the `ProfileStore` port.

use super::{replay, SharedReplayer};
use crate::ports::{PortFuture, ProfileKey, ProfileRecord, ProfileStore, PutOutcome};

const PORT: &str = "profile_store";

/// Serves recorded store results from a cassette.
pub struct ReplayingProfileStore {
    replayer: SharedReplayer,
}

impl ReplayingProfileStore {
    /// Create a store backed by the given replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl ProfileStore for ReplayingProfileStore {
    fn put_if_absent(&self, _record: &ProfileRecord) -> PortFuture<'_, PutOutcome> {
        let result = replay::<PutOutcome>(&self.replayer, PORT, "put_if_absent");
        Box::pin(async move { result })
    }

    fn get(&self, _key: &ProfileKey) -> PortFuture<'_, Option<ProfileRecord>> {
        let result = replay::<Option<ProfileRecord>>(&self.replayer, PORT, "get");
        Box::pin(async move { result })
    }

    fn delete(&self, _key: &ProfileKey) -> PortFuture<'_, ()> {
        let result = replay::<()>(&self.replayer, PORT, "delete");
        Box::pin(async move { result })
    }
}
