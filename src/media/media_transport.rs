use crate::{
    media::{media_stream::MediaStream, media_transport_error::MediaTransportError},
    protocol::{IceCandidateInit, SessionDescription},
};

/// The peer-connection primitives the negotiation engine drives.
///
/// Implementations wrap a concrete WebRTC stack. They report asynchronous
/// happenings (negotiation needed, gathered candidates, remote tracks,
/// connection state) as [`TransportEvent`](super::TransportEvent)s through the
/// [`EngineHandle`](crate::negotiation::EngineHandle) they were given, never by
/// calling back into the engine.
pub trait MediaTransport: Send {
    fn create_offer(&mut self) -> Result<SessionDescription, MediaTransportError>;

    fn create_answer(&mut self) -> Result<SessionDescription, MediaTransportError>;

    fn set_local_description(
        &mut self,
        desc: &SessionDescription,
    ) -> Result<(), MediaTransportError>;

    fn set_remote_description(
        &mut self,
        desc: &SessionDescription,
    ) -> Result<(), MediaTransportError>;

    fn add_remote_candidate(
        &mut self,
        candidate: &IceCandidateInit,
    ) -> Result<(), MediaTransportError>;

    /// Starts sending a locally produced stream.
    fn add_local_stream(&mut self, stream: &MediaStream) -> Result<(), MediaTransportError>;

    /// Tears the transport down. Called once when the session closes.
    fn close(&mut self) {}
}
