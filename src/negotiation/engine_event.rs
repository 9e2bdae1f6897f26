use crate::{
    media::{MediaStream, TransportEvent},
    protocol::SessionId,
    signaling_client::ChannelEvent,
};

/// Everything the engine reacts to, serialized onto its one queue.
#[derive(Debug)]
pub enum EngineEvent {
    Channel(ChannelEvent),
    Transport(TransportEvent),
    Intent(Intent),
}

/// Application requests.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Join { session_id: SessionId },
    Renegotiate,
    AddLocalStream(MediaStream),
    Disconnect,
}
