//! Request/response correlation over the signaling channel.
pub mod completion;
pub mod pending_request;
pub mod request_correlator;

pub use completion::Completion;
pub use pending_request::PendingRequest;
pub use request_correlator::RequestCorrelator;
