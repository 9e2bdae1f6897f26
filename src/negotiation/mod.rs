//! Offer/answer negotiation: the session state machine and its event queue.
pub mod close_reason;
pub mod engine_event;
pub mod engine_handle;
pub mod negotiation_engine;
pub mod negotiation_event;
pub mod negotiation_state;
pub mod session;

pub use close_reason::CloseReason;
pub use engine_event::{EngineEvent, Intent};
pub use engine_handle::{EngineHandle, EventQueue};
pub use negotiation_engine::{EngineOptions, NegotiationEngine};
pub use negotiation_event::NegotiationEvent;
pub use negotiation_state::NegotiationState;
pub use session::Session;
