#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    sync::{Arc, mpsc::Receiver},
    thread,
    time::Duration,
};

use rustysignal::{
    SignalError,
    correlator::RequestCorrelator,
    log::{LogLevel, MemoryLogSink, NoopLogSink},
    media::{
        ConnectionState, MediaStream, MediaTransport, MediaTransportError, TrackInfo, TrackKind,
        TransportEvent,
    },
    negotiation::{
        CloseReason, EngineEvent, EngineOptions, EventQueue, NegotiationEngine,
        NegotiationEvent, NegotiationState,
    },
    protocol::{IceCandidateInit, Method, SessionDescription},
    registry::StreamOrigin,
    signaling_client::{ChannelEvent, MemoryChannel},
};
use serde_json::{Value, json};

/// Media transport double: numbered offers/answers, everything recorded.
#[derive(Debug, Default)]
struct ScriptedTransport {
    offers: usize,
    answers: usize,
    local: Vec<SessionDescription>,
    remote: Vec<SessionDescription>,
    remote_candidates: Vec<String>,
    streams: Vec<String>,
    closed: bool,
}

impl MediaTransport for ScriptedTransport {
    fn create_offer(&mut self) -> Result<SessionDescription, MediaTransportError> {
        self.offers += 1;
        Ok(SessionDescription::offer(format!("v=0 offer-{}", self.offers)))
    }

    fn create_answer(&mut self) -> Result<SessionDescription, MediaTransportError> {
        self.answers += 1;
        Ok(SessionDescription::answer(format!("v=0 answer-{}", self.answers)))
    }

    fn set_local_description(
        &mut self,
        desc: &SessionDescription,
    ) -> Result<(), MediaTransportError> {
        self.local.push(desc.clone());
        Ok(())
    }

    fn set_remote_description(
        &mut self,
        desc: &SessionDescription,
    ) -> Result<(), MediaTransportError> {
        if desc.sdp.starts_with("bad") {
            return Err(MediaTransportError::InvalidDescription(desc.sdp.clone()));
        }
        self.remote.push(desc.clone());
        Ok(())
    }

    fn add_remote_candidate(
        &mut self,
        candidate: &IceCandidateInit,
    ) -> Result<(), MediaTransportError> {
        self.remote_candidates.push(candidate.candidate.clone());
        Ok(())
    }

    fn add_local_stream(&mut self, stream: &MediaStream) -> Result<(), MediaTransportError> {
        self.streams.push(stream.id.clone());
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

struct Harness {
    engine: NegotiationEngine<ScriptedTransport>,
    wire: Receiver<String>,
    log: Arc<MemoryLogSink>,
}

impl Harness {
    fn new() -> Self {
        let (channel, wire) = MemoryChannel::new();
        let log = Arc::new(MemoryLogSink::new());
        let engine = NegotiationEngine::new(
            EventQueue::new(),
            Arc::new(channel),
            ScriptedTransport::default(),
            log.clone(),
            EngineOptions::default(),
        );
        Self { engine, wire, log }
    }

    /// Frames written to the coordinator since the last call.
    fn sent(&self) -> Vec<Value> {
        self.wire
            .try_iter()
            .map(|f| serde_json::from_str(&f).unwrap())
            .collect()
    }

    fn deliver(&mut self, frame: Value) {
        self.engine
            .handle_event(EngineEvent::Channel(ChannelEvent::Frame(frame.to_string())));
    }

    fn transport_event(&mut self, event: TransportEvent) {
        self.engine.handle_event(EngineEvent::Transport(event));
    }

    fn answer(&mut self, id: &str, sdp: &str) {
        self.deliver(json!({"id": id, "result": {"type": "answer", "sdp": sdp}}));
    }

    /// Joins "abc" and completes the exchange.
    fn negotiated(&mut self) {
        let id = self.engine.join("abc").unwrap();
        self.answer(&id, "v=0 a1");
        assert_eq!(self.engine.state(), NegotiationState::Negotiated);
        self.sent();
        self.engine.poll();
    }
}

fn candidate(n: u32) -> IceCandidateInit {
    IceCandidateInit::new(format!(
        "candidate:{n} 1 udp 2122260223 192.168.1.2 {} typ host",
        50000 + n
    ))
}

fn trickled(frames: &[Value]) -> Vec<String> {
    frames
        .iter()
        .filter(|f| f["method"] == "trickle")
        .map(|f| f["params"]["candidate"]["candidate"].as_str().unwrap().to_owned())
        .collect()
}

#[test]
fn join_sends_offer_and_sid_then_applies_answer() {
    let mut h = Harness::new();
    let id = h.engine.join("abc").unwrap();

    let frames = h.sent();
    assert_eq!(
        frames,
        vec![json!({
            "id": id,
            "method": "join",
            "params": {"offer": {"type": "offer", "sdp": "v=0 offer-1"}, "sid": "abc"},
        })]
    );

    h.answer(&id, "v=0 a1");
    assert_eq!(h.engine.state(), NegotiationState::Negotiated);
    assert_eq!(h.engine.transport().remote, vec![SessionDescription::answer("v=0 a1")]);
    assert_eq!(h.engine.session().unwrap().session_id, "abc");
    assert_eq!(h.engine.transport().local, vec![SessionDescription::offer("v=0 offer-1")]);

    let states: Vec<_> = h
        .engine
        .poll()
        .into_iter()
        .filter_map(|e| match e {
            NegotiationEvent::StateChanged { to, .. } => Some(to),
            _ => None,
        })
        .collect();
    assert_eq!(states, [NegotiationState::Joining, NegotiationState::Negotiated]);
    assert!(h.log.contains(LogLevel::Info, "joining session abc"));
}

#[test]
fn inbound_offer_is_answered_with_an_uncorrelated_notification() {
    let mut h = Harness::new();
    h.negotiated();

    h.deliver(json!({"method": "offer", "params": {"type": "offer", "sdp": "v=0 o2"}}));

    assert_eq!(h.engine.state(), NegotiationState::Negotiated);
    assert_eq!(
        h.engine.transport().remote.last(),
        Some(&SessionDescription::offer("v=0 o2"))
    );
    let frames = h.sent();
    assert_eq!(
        frames,
        vec![json!({
            "method": "answer",
            "params": {"desc": {"type": "answer", "sdp": "v=0 answer-1"}},
        })]
    );
    assert!(frames[0].get("id").is_none());
}

#[test]
fn offer_during_renegotiation_is_answered_without_disturbing_the_request() {
    let mut h = Harness::new();
    h.negotiated();
    h.transport_event(TransportEvent::NegotiationNeeded);
    let pending = h.sent();
    assert_eq!(pending.len(), 1);
    let offer_id = pending[0]["id"].as_str().unwrap().to_owned();

    h.deliver(json!({"method": "offer", "params": {"type": "offer", "sdp": "v=0 remote"}}));

    assert_eq!(
        h.sent(),
        vec![json!({
            "method": "answer",
            "params": {"desc": {"type": "answer", "sdp": "v=0 answer-1"}},
        })]
    );
    assert_eq!(h.engine.state(), NegotiationState::Renegotiating);
    assert_eq!(h.engine.in_flight_request(), Some(offer_id.as_str()));

    h.answer(&offer_id, "v=0 a2");
    assert_eq!(h.engine.state(), NegotiationState::Negotiated);
    assert_eq!(
        h.engine.transport().remote.last(),
        Some(&SessionDescription::answer("v=0 a2"))
    );
    assert!(h.sent().is_empty());
}

#[test]
fn offer_while_joining_is_answered_and_join_still_completes() {
    let mut h = Harness::new();
    let id = h.engine.join("abc").unwrap();
    h.sent();

    h.deliver(json!({"method": "offer", "params": {"type": "offer", "sdp": "v=0 early"}}));
    let frames = h.sent();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["method"], "answer");
    assert_eq!(h.engine.state(), NegotiationState::Joining);
    assert_eq!(h.engine.in_flight_request(), Some(id.as_str()));

    h.answer(&id, "v=0 a1");
    assert_eq!(h.engine.state(), NegotiationState::Negotiated);
}

#[test]
fn ended_tracks_are_left_alone_after_close() {
    let (channel, _wire) = MemoryChannel::new();
    let mut engine = NegotiationEngine::new(
        EventQueue::new(),
        Arc::new(channel),
        ScriptedTransport::default(),
        Arc::new(NoopLogSink),
        EngineOptions {
            prune_ended_tracks: true,
            ..EngineOptions::default()
        },
    );
    engine.handle_event(EngineEvent::Transport(TransportEvent::TrackAdded {
        track: TrackInfo::new("t1", TrackKind::Video),
        stream_ids: vec!["s1".into()],
    }));
    engine.disconnect();
    engine.handle_event(EngineEvent::Transport(TransportEvent::TrackEnded {
        track_id: "t1".into(),
    }));

    assert_eq!(engine.registry().streams().len(), 1);
    assert_eq!(engine.registry().participants().len(), 1);
}

#[test]
fn channel_close_cancels_pending_join() {
    let mut h = Harness::new();
    h.engine.join("abc").unwrap();
    h.engine.handle_event(EngineEvent::Channel(ChannelEvent::Closed {
        reason: Some("going away".into()),
    }));

    let events = h.engine.poll();
    assert_eq!(h.engine.state(), NegotiationState::Closed);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, NegotiationEvent::Failed(SignalError::Cancelled)))
    );
    assert!(matches!(
        events.last(),
        Some(NegotiationEvent::Closed(CloseReason::ChannelClosed(Some(r)))) if r == "going away"
    ));
    assert!(h.engine.transport().closed);
}

#[test]
fn triggers_during_renegotiation_coalesce_into_one_follow_up() {
    let mut h = Harness::new();
    h.negotiated();

    h.transport_event(TransportEvent::NegotiationNeeded);
    assert_eq!(h.engine.state(), NegotiationState::Renegotiating);
    h.transport_event(TransportEvent::NegotiationNeeded);
    h.transport_event(TransportEvent::NegotiationNeeded);

    let first = h.sent();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0]["method"], "offer");
    assert_eq!(first[0]["params"]["desc"]["sdp"], "v=0 offer-2");
    assert!(h.engine.renegotiation_queued());

    h.answer(first[0]["id"].as_str().unwrap(), "v=0 a2");
    let follow_up = h.sent();
    assert_eq!(follow_up.len(), 1, "exactly one follow-up offer");
    assert_eq!(follow_up[0]["method"], "offer");
    assert_ne!(follow_up[0]["id"], first[0]["id"]);
    assert_eq!(h.engine.state(), NegotiationState::Renegotiating);
    assert!(!h.engine.renegotiation_queued());

    h.answer(follow_up[0]["id"].as_str().unwrap(), "v=0 a3");
    assert_eq!(h.engine.state(), NegotiationState::Negotiated);
    assert!(h.sent().is_empty());
    assert_eq!(h.engine.transport().offers, 3);
}

#[test]
fn trigger_while_joining_runs_after_the_join_answer() {
    let mut h = Harness::new();
    let id = h.engine.join("abc").unwrap();
    h.transport_event(TransportEvent::NegotiationNeeded);
    h.sent();

    h.answer(&id, "v=0 a1");
    let frames = h.sent();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["method"], "offer");
    assert_eq!(h.engine.state(), NegotiationState::Renegotiating);
}

#[test]
fn early_candidates_are_flushed_once_in_order_after_join() {
    let mut h = Harness::new();
    for n in 1..=3 {
        h.transport_event(TransportEvent::CandidateDiscovered(candidate(n)));
    }
    assert!(h.sent().is_empty());

    h.engine.join("abc").unwrap();
    h.transport_event(TransportEvent::CandidateDiscovered(candidate(4)));

    let frames = h.sent();
    assert_eq!(frames[0]["method"], "join");
    let expected: Vec<String> = (1..=4).map(|n| candidate(n).candidate).collect();
    assert_eq!(trickled(&frames), expected);
    assert!(frames[1..].iter().all(|f| f.get("id").is_none()));
}

#[test]
fn no_candidates_are_sent_after_close() {
    let mut h = Harness::new();
    h.negotiated();
    h.engine.disconnect();
    h.transport_event(TransportEvent::CandidateDiscovered(candidate(9)));
    assert!(trickled(&h.sent()).is_empty());
}

#[test]
fn remote_candidates_wait_for_a_remote_description() {
    let mut h = Harness::new();
    let id = h.engine.join("abc").unwrap();
    h.deliver(json!({"method": "trickle", "params": {"candidate": candidate(1)}}));
    h.deliver(json!({"method": "trickle", "params": {"candidate": candidate(2).candidate}}));
    assert!(h.engine.transport().remote_candidates.is_empty());

    h.answer(&id, "v=0 a1");
    h.deliver(json!({"method": "trickle", "params": {"candidate": candidate(3)}}));

    let expected: Vec<String> = (1..=3).map(|n| candidate(n).candidate).collect();
    assert_eq!(h.engine.transport().remote_candidates, expected);
}

#[test]
fn rejected_answer_closes_without_retry() {
    let mut h = Harness::new();
    let id = h.engine.join("abc").unwrap();
    h.answer(&id, "bad answer");

    let events = h.engine.poll();
    assert_eq!(h.engine.state(), NegotiationState::Closed);
    assert!(events.iter().any(|e| matches!(
        e,
        NegotiationEvent::Failed(SignalError::NegotiationFailed(_))
    )));
    let sent = h.sent();
    assert_eq!(sent.len(), 1, "only the join request, no retry");
    assert_eq!(h.engine.transport().offers, 1);
}

#[test]
fn stale_response_is_ignored() {
    let mut h = Harness::new();
    let id = h.engine.join("abc").unwrap();
    h.answer("00000000-0000-4000-8000-000000000000", "v=0 other");
    assert_eq!(h.engine.state(), NegotiationState::Joining);
    assert_eq!(h.engine.in_flight_request(), Some(id.as_str()));
    assert!(h.log.contains(LogLevel::Debug, "no pending request"));
}

#[test]
fn responses_out_of_order_resolve_by_id() {
    let (channel, wire) = MemoryChannel::new();
    let mut correlator = RequestCorrelator::new(Arc::new(channel), Arc::new(NoopLogSink));

    let mut issued = Vec::new();
    for _ in 0..4 {
        issued.push(correlator.issue(Method::Offer, &json!({}), None).unwrap());
    }
    assert_eq!(wire.try_iter().count(), 4);

    for (id, _) in issued.iter().rev() {
        assert!(correlator.resolve(id, Ok(json!(id))));
    }
    for (id, completion) in &mut issued {
        assert_eq!(completion.try_take().unwrap().unwrap(), json!(id));
    }
}

#[test]
fn registry_tracks_local_and_remote_streams() {
    let mut h = Harness::new();
    let cam = MediaStream::new("local-cam", vec![TrackInfo::new("cam-v", TrackKind::Video)]);
    h.engine.add_local_stream(cam).unwrap();
    h.negotiated();

    let track = TrackInfo::new("remote-v", TrackKind::Video);
    for _ in 0..2 {
        h.transport_event(TransportEvent::TrackAdded {
            track: track.clone(),
            stream_ids: vec!["remote-stream".into()],
        });
    }

    let streams = h.engine.registry().streams();
    assert_eq!(streams.len(), 2);
    assert_eq!(streams[0].origin, StreamOrigin::Local);
    assert_eq!(streams[1].id, "remote-stream");
    assert_eq!(h.engine.registry().participants().len(), 1);
    assert_eq!(h.engine.transport().streams, ["local-cam"]);
}

#[test]
fn failed_transport_closes_but_disconnected_does_not() {
    let mut h = Harness::new();
    h.negotiated();

    h.transport_event(TransportEvent::ConnectionStateChanged(ConnectionState::Disconnected));
    assert_eq!(h.engine.state(), NegotiationState::Negotiated);
    assert!(h.log.contains(LogLevel::Warn, "disconnected"));

    h.transport_event(TransportEvent::ConnectionStateChanged(ConnectionState::Failed));
    let events = h.engine.poll();
    assert_eq!(h.engine.state(), NegotiationState::Closed);
    assert!(matches!(
        events.last(),
        Some(NegotiationEvent::Closed(CloseReason::TransportFailed(ConnectionState::Failed)))
    ));
}

#[test]
fn intents_after_close_are_rejected() {
    let mut h = Harness::new();
    h.engine.disconnect();
    assert!(matches!(
        h.engine.join("abc"),
        Err(SignalError::InvalidState(NegotiationState::Closed))
    ));
    assert!(h.engine.renegotiate().is_err());
    assert!(h.engine.add_local_stream(MediaStream::new("s", vec![])).is_err());
}

#[test]
fn run_serves_a_coordinator_on_another_thread() {
    let (channel, wire) = MemoryChannel::new();
    let queue = EventQueue::new();
    let handle = queue.handle();
    let mut engine = NegotiationEngine::new(
        queue,
        Arc::new(channel),
        ScriptedTransport::default(),
        Arc::new(NoopLogSink),
        EngineOptions::default(),
    );

    let coordinator = thread::spawn(move || {
        assert!(handle.join("abc"));
        let join: Value =
            serde_json::from_str(&wire.recv_timeout(Duration::from_secs(5)).unwrap()).unwrap();
        assert_eq!(join["method"], "join");
        let reply = json!({"id": join["id"], "result": {"type": "answer", "sdp": "v=0 a1"}});
        let mut on_frame = handle.channel_handler();
        on_frame(ChannelEvent::Frame(reply.to_string()));
        handle.disconnect();
    });

    let mut seen = Vec::new();
    engine.run(|event| {
        if let NegotiationEvent::StateChanged { to, .. } = event {
            seen.push(*to);
        }
    });
    coordinator.join().unwrap();

    assert_eq!(
        seen,
        [
            NegotiationState::Joining,
            NegotiationState::Negotiated,
            NegotiationState::Closed
        ]
    );
}
