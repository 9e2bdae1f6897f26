use std::{fmt, io};

/// Errors raised while opening or using a signaling channel.
///
/// Once connected, the only thing `send()` can reliably report is that the
/// channel is closed (the network thread has exited and dropped its command
/// receiver).
#[derive(Debug)]
pub enum SignalingClientError {
    Io(io::Error),
    WebSocket(tungstenite::Error),
    Tls(String),
    InvalidEndpoint(String),
    Closed,
}

impl fmt::Display for SignalingClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::WebSocket(e) => write!(f, "websocket error: {e}"),
            Self::Tls(e) => write!(f, "TLS error: {e}"),
            Self::InvalidEndpoint(e) => write!(f, "invalid endpoint: {e}"),
            Self::Closed => write!(f, "signaling channel closed"),
        }
    }
}

impl std::error::Error for SignalingClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::WebSocket(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SignalingClientError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<tungstenite::Error> for SignalingClientError {
    fn from(e: tungstenite::Error) -> Self {
        Self::WebSocket(e)
    }
}
