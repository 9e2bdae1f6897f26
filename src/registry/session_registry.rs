use std::collections::{BTreeSet, HashMap};

use crate::{
    media::{MediaStream, TrackInfo},
    registry::{
        participant_ref::ParticipantRef,
        stream_entry::{StreamEntry, StreamOrigin},
    },
};

/// Local and remote streams of the current session, plus the remote tracks
/// seen so far.
///
/// Recording is idempotent: an identifier that is already known updates its
/// entry in place and keeps its original position in [`streams`](Self::streams).
#[derive(Debug, Default)]
pub struct SessionRegistry {
    streams: Vec<StreamEntry>,
    index: HashMap<String, usize>,
    participants: Vec<ParticipantRef>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_local_stream(&mut self, stream: &MediaStream) {
        let tracks = stream.tracks.iter().map(|t| t.id.clone());
        self.upsert(&stream.id, StreamOrigin::Local, tracks);
    }

    /// Records a remote track and the streams it was delivered in.
    ///
    /// Returns `true` the first time `track.id` is seen.
    pub fn record_remote_track(&mut self, track: &TrackInfo, stream_ids: &[String]) -> bool {
        let is_new = !self.participants.iter().any(|p| p.track_id == track.id);
        if is_new {
            self.participants.push(ParticipantRef {
                track_id: track.id.clone(),
            });
        }
        for stream_id in stream_ids {
            self.upsert(
                stream_id,
                StreamOrigin::Remote,
                std::iter::once(track.id.clone()),
            );
        }
        is_new
    }

    /// Forgets a track everywhere; streams this removal leaves without tracks
    /// are dropped. Streams that were already empty stay.
    ///
    /// Returns `true` if anything was removed.
    pub fn remove_track(&mut self, track_id: &str) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.track_id != track_id);
        let mut changed = before != self.participants.len();

        let mut emptied = Vec::new();
        for entry in &mut self.streams {
            if entry.tracks.remove(track_id) {
                changed = true;
                if entry.tracks.is_empty() {
                    emptied.push(entry.id.clone());
                }
            }
        }
        if !emptied.is_empty() {
            self.streams.retain(|e| !emptied.contains(&e.id));
            self.reindex();
        }
        changed
    }

    /// Snapshot in insertion order.
    #[must_use]
    pub fn streams(&self) -> Vec<StreamEntry> {
        self.streams.clone()
    }

    #[must_use]
    pub fn stream(&self, id: &str) -> Option<&StreamEntry> {
        self.index.get(id).and_then(|i| self.streams.get(*i))
    }

    #[must_use]
    pub fn participants(&self) -> &[ParticipantRef] {
        &self.participants
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty() && self.participants.is_empty()
    }

    fn upsert(&mut self, id: &str, origin: StreamOrigin, tracks: impl Iterator<Item = String>) {
        if let Some(entry) = self.index.get(id).and_then(|i| self.streams.get_mut(*i)) {
            entry.origin = origin;
            entry.tracks.extend(tracks);
            return;
        }
        self.index.insert(id.to_owned(), self.streams.len());
        self.streams.push(StreamEntry {
            id: id.to_owned(),
            origin,
            tracks: tracks.collect::<BTreeSet<_>>(),
        });
    }

    fn reindex(&mut self) {
        self.index = self
            .streams
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::media::TrackKind;

    fn video(id: &str) -> TrackInfo {
        TrackInfo::new(id, TrackKind::Video)
    }

    #[test]
    fn duplicate_remote_track_updates_instead_of_duplicating() {
        let mut reg = SessionRegistry::new();
        assert!(reg.record_remote_track(&video("t1"), &["s1".into()]));
        assert!(!reg.record_remote_track(&video("t1"), &["s1".into()]));

        assert_eq!(reg.streams().len(), 1);
        assert_eq!(reg.participants().len(), 1);
        assert!(reg.stream("s1").unwrap().has_track("t1"));
    }

    #[test]
    fn tracks_join_existing_streams() {
        let mut reg = SessionRegistry::new();
        reg.record_remote_track(&video("v"), &["s1".into()]);
        reg.record_remote_track(&TrackInfo::new("a", TrackKind::Audio), &["s1".into()]);

        let entry = reg.stream("s1").unwrap();
        assert_eq!(entry.origin, StreamOrigin::Remote);
        assert_eq!(entry.tracks.len(), 2);
        assert_eq!(reg.participants().len(), 2);
    }

    #[test]
    fn snapshot_keeps_insertion_order() {
        let mut reg = SessionRegistry::new();
        reg.record_local_stream(&MediaStream::new("local", vec![video("cam")]));
        reg.record_remote_track(&video("r1"), &["zeta".into()]);
        reg.record_remote_track(&video("r2"), &["alpha".into()]);
        reg.record_local_stream(&MediaStream::new("local", vec![video("screen")]));

        let ids: Vec<_> = reg.streams().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, ["local", "zeta", "alpha"]);
        assert_eq!(reg.stream("local").unwrap().tracks.len(), 2);
        assert_eq!(reg.stream("local").unwrap().origin, StreamOrigin::Local);
    }

    #[test]
    fn remove_track_drops_empty_streams_and_reindexes() {
        let mut reg = SessionRegistry::new();
        reg.record_remote_track(&video("t1"), &["s1".into()]);
        reg.record_remote_track(&video("t2"), &["s2".into()]);

        assert!(reg.remove_track("t1"));
        assert!(!reg.remove_track("t1"));

        assert!(reg.stream("s1").is_none());
        assert_eq!(reg.stream("s2").unwrap().id, "s2");
        assert_eq!(reg.participants().len(), 1);
    }

    #[test]
    fn remove_track_keeps_streams_it_did_not_empty() {
        let mut reg = SessionRegistry::new();
        reg.record_local_stream(&MediaStream::new("screen", vec![]));
        reg.record_remote_track(&video("t1"), &["s1".into()]);
        reg.record_remote_track(&video("t2"), &["s2".into()]);

        assert!(reg.remove_track("t1"));

        let ids: Vec<_> = reg.streams().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, ["screen", "s2"]);
        assert_eq!(reg.stream("screen").unwrap().origin, StreamOrigin::Local);
        assert!(reg.stream("s2").unwrap().has_track("t2"));
    }
}
