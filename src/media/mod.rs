//! Abstract media-transport capability consumed by the negotiation engine.
pub mod media_stream;
pub mod media_transport;
pub mod media_transport_error;
pub mod static_transport;
pub mod transport_event;

pub use media_stream::{MediaStream, TrackInfo, TrackKind};
pub use media_transport::MediaTransport;
pub use media_transport_error::MediaTransportError;
pub use static_transport::StaticTransport;
pub use transport_event::{ConnectionState, TransportEvent};
