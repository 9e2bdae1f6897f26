use crate::{
    media::media_stream::TrackInfo,
    protocol::IceCandidateInit,
};

/// Connection state as reported by the media transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    New,
    Connecting,
    Connected,
    /// Transient loss of connectivity; may recover on its own.
    Disconnected,
    /// Permanent failure.
    Failed,
    Closed,
}

impl ConnectionState {
    /// States after which the transport will not recover.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Closed)
    }
}

/// Events the media transport reports to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Topology changed (track added/removed, ICE restart); a new offer is needed.
    NegotiationNeeded,
    /// A local connectivity candidate was gathered.
    CandidateDiscovered(IceCandidateInit),
    /// A remote track arrived, with the ids of the streams it belongs to.
    TrackAdded {
        track: TrackInfo,
        stream_ids: Vec<String>,
    },
    /// A remote track ended.
    TrackEnded { track_id: String },
    ConnectionStateChanged(ConnectionState),
}
