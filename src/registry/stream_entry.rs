use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOrigin {
    Local,
    Remote,
}

/// One media stream known to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    pub id: String,
    pub origin: StreamOrigin,
    pub tracks: BTreeSet<String>,
}

impl StreamEntry {
    #[must_use]
    pub fn has_track(&self, track_id: &str) -> bool {
        self.tracks.contains(track_id)
    }
}
