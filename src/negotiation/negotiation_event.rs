use crate::{
    negotiation::{close_reason::CloseReason, negotiation_state::NegotiationState},
    signal_error::SignalError,
};

/// What the engine reports to its owner from [`poll`](super::NegotiationEngine::poll).
#[derive(Debug)]
pub enum NegotiationEvent {
    StateChanged {
        from: NegotiationState,
        to: NegotiationState,
    },
    /// An intent or a negotiation request failed. Failures of negotiation
    /// requests are followed by [`Closed`](Self::Closed).
    Failed(SignalError),
    Closed(CloseReason),
}
