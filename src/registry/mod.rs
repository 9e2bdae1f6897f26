pub mod participant_ref;
pub mod session_registry;
pub mod stream_entry;

pub use participant_ref::ParticipantRef;
pub use session_registry::SessionRegistry;
pub use stream_entry::{StreamEntry, StreamOrigin};
