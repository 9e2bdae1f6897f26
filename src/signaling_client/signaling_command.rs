/// Commands from the owning side into the channel's network thread.
#[derive(Debug, PartialEq, Eq)]
pub enum SignalingCommand {
    Send(String),
    Disconnect,
}
