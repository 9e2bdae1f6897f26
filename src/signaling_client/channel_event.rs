/// What a signaling channel delivers to its inbound handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// One text frame, exactly as received.
    Frame(String),
    /// The channel is gone. Delivered once, after the last frame.
    Closed { reason: Option<String> },
}

/// Receives every inbound [`ChannelEvent`] in arrival order.
pub type InboundHandler = Box<dyn FnMut(ChannelEvent) + Send + 'static>;
