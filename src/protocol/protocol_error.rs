use std::fmt;

/// Problems decoding or encoding a signaling frame.
#[derive(Debug)]
pub enum ProtocolError {
    /// The frame is not valid JSON or not a JSON object.
    InvalidJson(serde_json::Error),
    /// The frame is JSON but neither a response nor a notification.
    UnknownShape,
    /// A recognised method carried params that do not match its schema.
    InvalidParams {
        method: &'static str,
        source: serde_json::Error,
    },
    /// A response carried an `error` member that is not `{code, message}`.
    InvalidErrorObject(serde_json::Error),
    /// A required params field was absent.
    MissingField {
        method: &'static str,
        field: &'static str,
    },
    /// Serialising an outbound frame failed.
    Encode(serde_json::Error),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson(e) => write!(f, "invalid JSON frame: {e}"),
            Self::UnknownShape => write!(f, "frame is neither a response nor a notification"),
            Self::InvalidParams { method, source } => {
                write!(f, "invalid params for '{method}': {source}")
            }
            Self::InvalidErrorObject(e) => write!(f, "invalid error object in response: {e}"),
            Self::MissingField { method, field } => {
                write!(f, "'{method}' params missing field '{field}'")
            }
            Self::Encode(e) => write!(f, "failed to encode frame: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidJson(e) | Self::InvalidErrorObject(e) | Self::Encode(e) => Some(e),
            Self::InvalidParams { source, .. } => Some(source),
            Self::UnknownShape | Self::MissingField { .. } => None,
        }
    }
}
