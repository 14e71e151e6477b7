//! Scripted transport for tests.
//!
//! `MockTransport` implements the same [`SellsyTransport`] API as the
//! production client but operates entirely in memory: queued replies are
//! handed out in call order, and every call is recorded so tests can assert
//! on the exact method/parameter sequence sent to the CRM.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::transport::SellsyTransport;
use crate::SellsyError;

#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<Value, SellsyError>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a success envelope wrapping `payload`.
    pub fn push_success(&self, payload: Value) {
        self.push_envelope(json!({ "status": "success", "response": payload }));
    }

    /// Queue a raw envelope (e.g. `{"status": "error", ...}`).
    pub fn push_envelope(&self, envelope: Value) {
        self.replies.lock().unwrap().push_back(Ok(envelope));
    }

    /// Queue a transport-level failure.
    pub fn push_failure(&self, error: SellsyError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Every (method, params) pair sent so far, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    /// Method names sent so far, in order.
    pub fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SellsyTransport for MockTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, SellsyError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(SellsyError::Transport(format!(
                    "no scripted reply for {method}"
                )))
            })
    }
}
