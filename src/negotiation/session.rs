use crate::{
    media::ConnectionState,
    protocol::{RequestId, SessionDescription, SessionId},
};

/// The negotiation context of one joined session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub session_id: SessionId,
    pub local_description: Option<SessionDescription>,
    pub remote_description: Option<SessionDescription>,
    pub connection: ConnectionState,
    /// Ids of this session's correlated requests that are still unresolved.
    pub pending: Vec<RequestId>,
}

impl Session {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            local_description: None,
            remote_description: None,
            connection: ConnectionState::New,
            pending: Vec::new(),
        }
    }
}
