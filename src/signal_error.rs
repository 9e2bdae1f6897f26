use std::fmt;

use crate::{
    media::MediaTransportError,
    negotiation::NegotiationState,
    protocol::{ProtocolError, RpcError},
    signaling_client::SignalingClientError,
};

/// Failures surfaced by the correlator and the negotiation engine.
#[derive(Debug)]
pub enum SignalError {
    /// The signaling transport is not open. Recoverable only by reconnecting
    /// and joining again.
    ChannelClosed,
    /// A description was rejected or malformed; the session is closed.
    NegotiationFailed(String),
    /// The request was outstanding when the channel or session closed.
    Cancelled,
    /// A caller-supplied deadline elapsed before the response arrived.
    Timeout,
    /// An inbound frame could not be decoded.
    MalformedMessage(ProtocolError),
    /// The coordinator answered a request with an error object.
    Remote { code: i64, message: String },
    /// The intent is not valid in the engine's current state.
    InvalidState(NegotiationState),
    Transport(MediaTransportError),
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelClosed => write!(f, "signaling channel closed"),
            Self::NegotiationFailed(why) => write!(f, "negotiation failed: {why}"),
            Self::Cancelled => write!(f, "request cancelled"),
            Self::Timeout => write!(f, "request timed out"),
            Self::MalformedMessage(e) => write!(f, "malformed message: {e}"),
            Self::Remote { code, message } => write!(f, "coordinator error {code}: {message}"),
            Self::InvalidState(state) => write!(f, "not allowed while {state}"),
            Self::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SignalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedMessage(e) => Some(e),
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProtocolError> for SignalError {
    fn from(e: ProtocolError) -> Self {
        Self::MalformedMessage(e)
    }
}

impl From<MediaTransportError> for SignalError {
    fn from(e: MediaTransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<RpcError> for SignalError {
    fn from(e: RpcError) -> Self {
        Self::Remote {
            code: e.code,
            message: e.message,
        }
    }
}

/// Any failure to hand a frame to the channel means it is unusable.
impl From<SignalingClientError> for SignalError {
    fn from(_: SignalingClientError) -> Self {
        Self::ChannelClosed
    }
}
