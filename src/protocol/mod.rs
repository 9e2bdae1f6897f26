//! JSON wire format spoken with the session coordinator.
//!
//! Two frame shapes travel over the signaling channel:
//! - correlated: `{"id": "<uuid>", "method": ..., "params": {...}}`, answered
//!   by `{"id": "<uuid>", "result": {...}}` (or `"error": {...}`);
//! - notification: `{"method": ..., "params": {...}}` with no `id`.
pub mod frame;
pub mod method;
pub mod protocol_error;
pub mod types;

pub use frame::{Inbound, Notification, RpcError, encode_notification, encode_request};
pub use method::Method;
pub use protocol_error::ProtocolError;
pub use types::{IceCandidateInit, RequestId, SdpKind, SessionDescription, SessionId};
