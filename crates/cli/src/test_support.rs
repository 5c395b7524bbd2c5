//! Test doubles shared by the handler and dispatcher tests.

use crate::prompt::Prompt;
use async_trait::async_trait;
use kimbank_core::ProcedureCall;
use kimbank_persistence::{PersistenceError, PersistenceResult, ProcedureExecutor};
use std::sync::Mutex;
use tokio::io::AsyncBufRead;

/// Records every call; optionally rejects calls to one procedure, or loses the
/// connection on it.
#[derive(Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<ProcedureCall>>,
    failing: Option<&'static str>,
    closing: Option<&'static str>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, procedure: &'static str) -> Self {
        self.failing = Some(procedure);
        self
    }

    pub fn closing_on(mut self, procedure: &'static str) -> Self {
        self.closing = Some(procedure);
        self
    }

    pub fn calls(&self) -> Vec<ProcedureCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcedureExecutor for RecordingExecutor {
    async fn invoke(&self, call: &ProcedureCall) -> PersistenceResult<u64> {
        self.calls.lock().unwrap().push(call.clone());
        if self.closing == Some(call.name) {
            return Err(PersistenceError::ConnectionClosed);
        }
        if self.failing == Some(call.name) {
            return Err(PersistenceError::Procedure {
                name: call.name,
                message: "rejected by server".to_string(),
            });
        }
        Ok(0)
    }
}

/// Everything the prompt has written so far
pub fn printed<R: AsyncBufRead + Unpin>(prompt: &Prompt<R, Vec<u8>>) -> String {
    String::from_utf8_lossy(prompt.output()).into_owned()
}
