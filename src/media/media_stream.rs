#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

/// A single media track as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub id: String,
    pub kind: TrackKind,
}

impl TrackInfo {
    pub fn new(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// A group of tracks sharing a stream identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStream {
    pub id: String,
    pub tracks: Vec<TrackInfo>,
}

impl MediaStream {
    pub fn new(id: impl Into<String>, tracks: Vec<TrackInfo>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }
}
