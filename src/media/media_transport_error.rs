use std::fmt;

/// Failures reported by a [`MediaTransport`](super::MediaTransport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaTransportError {
    /// The transport refused a local or remote description.
    InvalidDescription(String),
    /// A remote candidate could not be added.
    InvalidCandidate(String),
    /// The transport cannot perform this operation at all.
    Unsupported(&'static str),
    /// The transport has been closed.
    Closed,
    Other(String),
}

impl fmt::Display for MediaTransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDescription(e) => write!(f, "description rejected: {e}"),
            Self::InvalidCandidate(e) => write!(f, "candidate rejected: {e}"),
            Self::Unsupported(op) => write!(f, "operation not supported: {op}"),
            Self::Closed => write!(f, "media transport closed"),
            Self::Other(e) => write!(f, "media transport error: {e}"),
        }
    }
}

impl std::error::Error for MediaTransportError {}
