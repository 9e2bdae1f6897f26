use std::{
    collections::HashMap,
    sync::{Arc, mpsc},
    time::{Duration, Instant},
};

use serde_json::Value;
use uuid::Uuid;

use crate::{
    correlator::{completion::Completion, pending_request::PendingRequest},
    log::LogSink,
    protocol::{Method, RequestId, encode_request},
    signal_error::SignalError,
    signaling_client::SignalingChannel,
    sink_debug, sink_warn,
};

/// Sends correlated requests and routes responses back by id.
///
/// There is a single inbound route: whoever reads the channel calls
/// [`resolve`](Self::resolve) with each response. Arrival order does not
/// matter, only the echoed id.
pub struct RequestCorrelator {
    channel: Arc<dyn SignalingChannel>,
    pending: HashMap<RequestId, PendingRequest>,
    log: Arc<dyn LogSink>,
}

impl RequestCorrelator {
    pub fn new(channel: Arc<dyn SignalingChannel>, log: Arc<dyn LogSink>) -> Self {
        Self {
            channel,
            pending: HashMap::new(),
            log,
        }
    }

    /// Sends `{id, method, params}` and registers the pending entry.
    ///
    /// With a `deadline`, the request completes with [`SignalError::Timeout`]
    /// once [`expire`](Self::expire) runs past it.
    ///
    /// # Errors
    /// [`SignalError::ChannelClosed`] if the frame could not be handed to the
    /// channel; nothing is registered in that case.
    pub fn issue(
        &mut self,
        kind: Method,
        params: &Value,
        deadline: Option<Duration>,
    ) -> Result<(RequestId, Completion), SignalError> {
        let mut id = Uuid::new_v4().to_string();
        while self.pending.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }

        let frame = encode_request(&id, kind, params)?;
        self.channel.send(&frame)?;

        let now = Instant::now();
        let (tx, rx) = mpsc::channel();
        self.pending.insert(
            id.clone(),
            PendingRequest {
                id: id.clone(),
                kind,
                created_at: now,
                deadline: deadline.map(|d| now + d),
                tx,
            },
        );
        sink_debug!(self.log, "[Correlator] issued {kind} {id}");
        Ok((id.clone(), Completion::new(id, rx)))
    }

    /// Completes the pending request with this id.
    ///
    /// Returns `false` for unknown or already resolved ids.
    pub fn resolve(&mut self, id: &str, outcome: Result<Value, SignalError>) -> bool {
        match self.pending.remove(id) {
            Some(req) => {
                sink_debug!(
                    self.log,
                    "[Correlator] resolved {} {id} after {:?}",
                    req.kind,
                    req.created_at.elapsed()
                );
                req.complete(outcome);
                true
            }
            None => {
                sink_debug!(self.log, "[Correlator] no pending request {id}");
                false
            }
        }
    }

    /// Times out every request whose deadline is at or before `now`.
    pub fn expire(&mut self, now: Instant) -> Vec<RequestId> {
        let expired: Vec<RequestId> = self
            .pending
            .values()
            .filter(|req| req.is_expired(now))
            .map(|req| req.id.clone())
            .collect();
        for id in &expired {
            if let Some(req) = self.pending.remove(id) {
                sink_warn!(self.log, "[Correlator] {} {id} timed out", req.kind);
                req.complete(Err(SignalError::Timeout));
            }
        }
        expired
    }

    /// Completes every pending request with [`SignalError::Cancelled`].
    pub fn cancel_all(&mut self) -> Vec<RequestId> {
        let cancelled: Vec<RequestId> = self.pending.keys().cloned().collect();
        for (id, req) in self.pending.drain() {
            sink_debug!(self.log, "[Correlator] cancelled {} {id}", req.kind);
            req.complete(Err(SignalError::Cancelled));
        }
        cancelled
    }

    /// Earliest deadline among pending requests.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().filter_map(|req| req.deadline).min()
    }

    #[must_use]
    pub fn kind_of(&self, id: &str) -> Option<Method> {
        self.pending.get(id).map(|req| req.kind)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
