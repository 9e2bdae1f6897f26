use std::{
    sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError},
    time::Duration,
};

use serde_json::Value;

use crate::{protocol::RequestId, signal_error::SignalError};

/// The caller's side of a [`PendingRequest`](super::PendingRequest).
///
/// Yields its outcome exactly once. If the correlator goes away without
/// resolving the request, the outcome is [`SignalError::Cancelled`].
#[derive(Debug)]
pub struct Completion {
    id: RequestId,
    rx: Option<Receiver<Result<Value, SignalError>>>,
}

impl Completion {
    pub(crate) fn new(id: RequestId, rx: Receiver<Result<Value, SignalError>>) -> Self {
        Self { id, rx: Some(rx) }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// `true` once the outcome has been taken.
    #[must_use]
    pub fn is_taken(&self) -> bool {
        self.rx.is_none()
    }

    /// Non-blocking: the outcome if it is ready and not yet taken.
    pub fn try_take(&mut self) -> Option<Result<Value, SignalError>> {
        let rx = self.rx.as_ref()?;
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(SignalError::Cancelled),
        };
        self.rx = None;
        Some(outcome)
    }

    /// Blocks up to `timeout` for the outcome. Meant for threads other than
    /// the one driving the engine.
    pub fn wait(&mut self, timeout: Duration) -> Option<Result<Value, SignalError>> {
        let rx = self.rx.as_ref()?;
        let outcome = match rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => Err(SignalError::Cancelled),
        };
        self.rx = None;
        Some(outcome)
    }
}
