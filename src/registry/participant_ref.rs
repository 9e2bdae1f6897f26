/// A remote contribution, identified by its track id.
///
/// Lookup-only bookkeeping: the track itself belongs to the media transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRef {
    pub track_id: String,
}
