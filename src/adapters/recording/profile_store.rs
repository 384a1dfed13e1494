//! Recording adapter for the `ProfileStore` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{PortFuture, ProfileKey, ProfileRecord, ProfileStore, PutOutcome};

const PORT: &str = "profile_store";

/// Records store reads and writes while delegating to an inner implementation.
pub struct RecordingProfileStore {
    inner: Arc<dyn ProfileStore>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingProfileStore {
    /// Wrap `inner`, writing interactions to `recorder`.
    pub fn new(inner: Arc<dyn ProfileStore>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ProfileStore for RecordingProfileStore {
    fn put_if_absent(&self, record: &ProfileRecord) -> PortFuture<'_, PutOutcome> {
        let record = record.clone();
        Box::pin(async move {
            let result = self.inner.put_if_absent(&record).await;
            record_result(&self.recorder, PORT, "put_if_absent", &record, &result);
            result
        })
    }

    fn get(&self, key: &ProfileKey) -> PortFuture<'_, Option<ProfileRecord>> {
        let key = key.clone();
        Box::pin(async move {
            let result = self.inner.get(&key).await;
            record_result(&self.recorder, PORT, "get", &key, &result);
            result
        })
    }

    fn delete(&self, key: &ProfileKey) -> PortFuture<'_, ()> {
        let key = key.clone();
        Box::pin(async move {
            let result = self.inner.delete(&key).await;
            record_result(&self.recorder, PORT, "delete", &key, &result);
            result
        })
    }
}
