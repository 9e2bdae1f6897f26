//! RustySignal is the negotiation client of a WebRTC media endpoint.
//!
//! It joins a session on a remote coordinator over a JSON signaling channel,
//! drives offer/answer and renegotiation cycles against an abstract media
//! transport, trickles connectivity candidates and keeps track of the media
//! streams that result.
//!
//! It provides one binary:
//! - `signal_probe`: joins a session with a recorded offer and reports the
//!   coordinator's behaviour.

/// Handles configuration loading and management.
pub mod config;
/// Request/response correlation by generated identifier.
pub mod correlator;
/// Logging utilities: leveled macros over an injected sink.
pub mod log;
/// Media transport capability, its events and stream types.
pub mod media;
/// The negotiation state machine and its event queue.
pub mod negotiation;
/// Wire frames exchanged with the coordinator.
pub mod protocol;
/// Local and remote stream bookkeeping.
pub mod registry;
/// Error taxonomy of the negotiation client.
pub mod signal_error;
/// Signaling channel implementations (WebSocket, in-memory).
pub mod signaling_client;

pub use signal_error::SignalError;
