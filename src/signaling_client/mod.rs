//! Bidirectional text-frame transport to the session coordinator.
pub mod channel_event;
pub mod memory_channel;
pub mod signaling_channel;
pub mod signaling_client_error;
pub mod signaling_command;
pub mod tls;
pub mod ws_channel;

pub use channel_event::{ChannelEvent, InboundHandler};
pub use memory_channel::MemoryChannel;
pub use signaling_channel::SignalingChannel;
pub use signaling_client_error::SignalingClientError;
pub use ws_channel::WsChannel;
