use std::sync::mpsc::{self, Receiver, Sender};

use crate::{
    media::{MediaStream, TransportEvent},
    negotiation::engine_event::{EngineEvent, Intent},
    protocol::SessionId,
    signaling_client::{ChannelEvent, InboundHandler},
};

/// Cloneable, thread-safe way into a [`NegotiationEngine`](super::NegotiationEngine).
///
/// Every method only enqueues; the engine's thread does the work. They return
/// `false` once the engine is gone.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: Sender<EngineEvent>,
}

impl EngineHandle {
    pub fn join(&self, session_id: impl Into<SessionId>) -> bool {
        self.intent(Intent::Join {
            session_id: session_id.into(),
        })
    }

    pub fn renegotiate(&self) -> bool {
        self.intent(Intent::Renegotiate)
    }

    pub fn add_local_stream(&self, stream: MediaStream) -> bool {
        self.intent(Intent::AddLocalStream(stream))
    }

    pub fn disconnect(&self) -> bool {
        self.intent(Intent::Disconnect)
    }

    /// For media transports reporting their events.
    pub fn transport_event(&self, event: TransportEvent) -> bool {
        self.send(EngineEvent::Transport(event))
    }

    pub fn channel_event(&self, event: ChannelEvent) -> bool {
        self.send(EngineEvent::Channel(event))
    }

    /// Inbound handler to give a signaling channel when opening it.
    #[must_use]
    pub fn channel_handler(&self) -> InboundHandler {
        let tx = self.tx.clone();
        Box::new(move |event| {
            let _ = tx.send(EngineEvent::Channel(event));
        })
    }

    fn intent(&self, intent: Intent) -> bool {
        self.send(EngineEvent::Intent(intent))
    }

    fn send(&self, event: EngineEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// The engine's inbound queue, created before the engine so the signaling
/// channel can be opened with [`EngineHandle::channel_handler`] first.
#[derive(Debug)]
pub struct EventQueue {
    pub(crate) handle: EngineHandle,
    pub(crate) rx: Receiver<EngineEvent>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            handle: EngineHandle { tx },
            rx,
        }
    }

    #[must_use]
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
