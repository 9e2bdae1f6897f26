use std::{sync::mpsc::Sender, time::Instant};

use serde_json::Value;

use crate::{
    protocol::{Method, RequestId},
    signal_error::SignalError,
};

/// A correlated request waiting for the response that echoes its id.
#[derive(Debug)]
pub struct PendingRequest {
    pub id: RequestId,
    /// Intent kind; also the wire method it was sent as.
    pub kind: Method,
    pub created_at: Instant,
    pub deadline: Option<Instant>,
    pub(crate) tx: Sender<Result<Value, SignalError>>,
}

impl PendingRequest {
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Completes the request; a dropped [`Completion`](super::Completion) is fine.
    pub(crate) fn complete(self, outcome: Result<Value, SignalError>) {
        let _ = self.tx.send(outcome);
    }
}
