use crate::signaling_client::signaling_client_error::SignalingClientError;

/// Outbound half of a signaling channel.
///
/// The inbound half is the [`InboundHandler`](super::InboundHandler) given to
/// the implementation when it is opened; it sees every frame in arrival order.
pub trait SignalingChannel: Send + Sync {
    /// Queues one text frame for the coordinator.
    ///
    /// # Errors
    /// [`SignalingClientError::Closed`] if the channel is not open.
    fn send(&self, frame: &str) -> Result<(), SignalingClientError>;

    /// Closes the channel. Idempotent.
    fn close(&self);

    fn is_open(&self) -> bool;
}
