//! Recording adapter for the `ModelInvoker` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{ConverseReply, ConverseRequest, ModelInvoker, PortFuture};

/// Records conversations while delegating to an inner implementation.
pub struct RecordingModelInvoker {
    inner: Arc<dyn ModelInvoker>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingModelInvoker {
    /// Wrap `inner`, writing interactions to `recorder`.
    pub fn new(inner: Arc<dyn ModelInvoker>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ModelInvoker for RecordingModelInvoker {
    fn converse(&self, request: &ConverseRequest) -> PortFuture<'_, ConverseReply> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.converse(&request).await;
            record_result(&self.recorder, "model_invoker", "converse", &request, &result);
            result
        })
    }
}
