use std::fmt;

/// Lifecycle of the engine's single session.
///
/// `Idle -> Joining -> Negotiated <-> Renegotiating`, and `Closed` from
/// anywhere. `Closed` is terminal for the engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationState {
    Idle,
    Joining,
    Negotiated,
    Renegotiating,
    Closed,
}

impl NegotiationState {
    /// A negotiation request is in flight.
    #[must_use]
    pub const fn is_negotiating(self) -> bool {
        matches!(self, Self::Joining | Self::Renegotiating)
    }

    /// A session exists and is not closed.
    #[must_use]
    pub const fn has_session(self) -> bool {
        matches!(self, Self::Joining | Self::Negotiated | Self::Renegotiating)
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Joining => "joining",
            Self::Negotiated => "negotiated",
            Self::Renegotiating => "renegotiating",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}
