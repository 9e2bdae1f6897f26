use std::fmt;

use crate::{media::ConnectionState, signal_error::SignalError};

/// Why the session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Explicit disconnect intent.
    Disconnected,
    /// The signaling channel went away, with the peer's reason if it gave one.
    ChannelClosed(Option<String>),
    /// A description could not be produced, decoded or applied.
    NegotiationFailed,
    /// The coordinator answered a negotiation request with an error.
    Remote,
    /// A negotiation request outlived its deadline.
    Timeout,
    /// The media transport reported a terminal connection state.
    TransportFailed(ConnectionState),
}

impl CloseReason {
    /// How a failed negotiation step ends the session.
    #[must_use]
    pub fn for_error(err: &SignalError) -> Self {
        match err {
            SignalError::ChannelClosed => Self::ChannelClosed(None),
            SignalError::Timeout => Self::Timeout,
            SignalError::Remote { .. } => Self::Remote,
            _ => Self::NegotiationFailed,
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::ChannelClosed(Some(why)) => write!(f, "signaling channel closed: {why}"),
            Self::ChannelClosed(None) => write!(f, "signaling channel closed"),
            Self::NegotiationFailed => write!(f, "negotiation failed"),
            Self::Remote => write!(f, "coordinator rejected the request"),
            Self::Timeout => write!(f, "negotiation request timed out"),
            Self::TransportFailed(state) => write!(f, "media transport {state:?}"),
        }
    }
}
