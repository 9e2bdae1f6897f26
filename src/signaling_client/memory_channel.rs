use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Receiver, Sender},
};

use crate::signaling_client::{
    signaling_channel::SignalingChannel, signaling_client_error::SignalingClientError,
};

/// In-process channel: every sent frame lands on a `Receiver<String>`.
///
/// Used to embed the engine next to an in-process coordinator and to drive
/// it from tests. Inbound frames are injected by whoever owns the engine.
#[derive(Debug)]
pub struct MemoryChannel {
    outbound: Sender<String>,
    open: AtomicBool,
}

impl MemoryChannel {
    /// Returns the channel and the receiving end of its outbound frames.
    #[must_use]
    pub fn new() -> (Self, Receiver<String>) {
        let (outbound, rx) = mpsc::channel();
        (
            Self {
                outbound,
                open: AtomicBool::new(true),
            },
            rx,
        )
    }
}

impl SignalingChannel for MemoryChannel {
    fn send(&self, frame: &str) -> Result<(), SignalingClientError> {
        if !self.is_open() {
            return Err(SignalingClientError::Closed);
        }
        self.outbound
            .send(frame.to_owned())
            .map_err(|_| SignalingClientError::Closed)
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}
