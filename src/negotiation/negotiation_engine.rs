use std::{
    mem,
    sync::{
        Arc,
        mpsc::{Receiver, RecvTimeoutError},
    },
    time::{Duration, Instant},
};

use serde_json::Value;

use crate::{
    config::ClientSettings,
    correlator::{Completion, RequestCorrelator},
    log::LogSink,
    media::{ConnectionState, MediaStream, MediaTransport, TransportEvent},
    negotiation::{
        close_reason::CloseReason,
        engine_event::{EngineEvent, Intent},
        engine_handle::{EngineHandle, EventQueue},
        negotiation_event::NegotiationEvent,
        negotiation_state::NegotiationState,
        session::Session,
    },
    protocol::{
        IceCandidateInit, Inbound, Method, Notification, RequestId, SessionDescription,
        encode_notification,
        frame::{DescParams, JoinParams, TrickleParams, description, to_params},
    },
    registry::SessionRegistry,
    signal_error::SignalError,
    signaling_client::{ChannelEvent, SignalingChannel},
    sink_debug, sink_error, sink_info, sink_verbose, sink_warn,
};

/// Upper bound on how long [`NegotiationEngine::run`] blocks between deadline checks.
const RUN_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Deadline for join/offer requests; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// Forget tracks (and emptied streams) when the transport reports them ended.
    pub prune_ended_tracks: bool,
}

impl EngineOptions {
    #[must_use]
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            request_timeout: settings.signaling.request_timeout,
            prune_ended_tracks: settings.prune_ended_tracks,
        }
    }
}

/// The negotiation request currently awaiting its response.
struct InFlight {
    id: RequestId,
    kind: Method,
    completion: Completion,
}

/// Drives offer/answer for one session over a signaling channel and a media
/// transport.
///
/// The engine is sans-IO with respect to threads: it is owned by one thread,
/// which feeds it [`EngineEvent`]s (directly through
/// [`handle_event`](Self::handle_event) or through the queue behind
/// [`EngineHandle`]) and collects [`NegotiationEvent`]s from
/// [`poll`](Self::poll). Nothing ever blocks waiting for the coordinator; a
/// correlated request leaves a [`Completion`] behind and the engine advances
/// when the response is routed back.
///
/// At most one negotiation request (join or offer) is in flight. A
/// negotiation-needed trigger that arrives meanwhile sets a one-deep flag,
/// so any number of triggers collapse into a single follow-up offer.
pub struct NegotiationEngine<T: MediaTransport> {
    state: NegotiationState,
    session: Option<Session>,
    correlator: RequestCorrelator,
    channel: Arc<dyn SignalingChannel>,
    transport: T,
    registry: SessionRegistry,
    log: Arc<dyn LogSink>,
    options: EngineOptions,
    handle: EngineHandle,
    rx: Receiver<EngineEvent>,
    in_flight: Option<InFlight>,
    renegotiation_queued: bool,
    /// Local candidates gathered before the join request went out.
    early_candidates: Vec<IceCandidateInit>,
    /// Remote candidates received before any remote description was applied.
    early_remote_candidates: Vec<IceCandidateInit>,
    out: Vec<NegotiationEvent>,
}

impl<T: MediaTransport> NegotiationEngine<T> {
    pub fn new(
        queue: EventQueue,
        channel: Arc<dyn SignalingChannel>,
        transport: T,
        log: Arc<dyn LogSink>,
        options: EngineOptions,
    ) -> Self {
        Self {
            state: NegotiationState::Idle,
            session: None,
            correlator: RequestCorrelator::new(Arc::clone(&channel), Arc::clone(&log)),
            channel,
            transport,
            registry: SessionRegistry::new(),
            log,
            options,
            handle: queue.handle,
            rx: queue.rx,
            in_flight: None,
            renegotiation_queued: false,
            early_candidates: Vec::new(),
            early_remote_candidates: Vec::new(),
            out: Vec::new(),
        }
    }

    #[must_use]
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    #[must_use]
    pub fn state(&self) -> NegotiationState {
        self.state
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Id of the join/offer request awaiting its response, if any.
    #[must_use]
    pub fn in_flight_request(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|f| f.id.as_str())
    }

    /// A renegotiation will start as soon as the in-flight request resolves.
    #[must_use]
    pub fn renegotiation_queued(&self) -> bool {
        self.renegotiation_queued
    }

    // ---- intents ------------------------------------------------------------

    /// Creates the session and sends the `join` request with a fresh offer.
    ///
    /// Local candidates gathered so far are trickled right after the request.
    ///
    /// # Errors
    /// [`SignalError::InvalidState`] unless `Idle`. Failing to produce the offer
    /// or to send the request closes the session and returns the cause.
    pub fn join(&mut self, session_id: impl Into<String>) -> Result<RequestId, SignalError> {
        if self.state != NegotiationState::Idle {
            return Err(SignalError::InvalidState(self.state));
        }
        let session_id = session_id.into();
        sink_info!(self.log, "[Negotiation] joining session {session_id}");
        self.session = Some(Session::new(session_id.clone()));
        self.set_state(NegotiationState::Joining);

        match self.send_join(&session_id) {
            Ok(id) => {
                for candidate in mem::take(&mut self.early_candidates) {
                    self.send_trickle(&candidate);
                }
                Ok(id)
            }
            Err(e) => {
                sink_error!(self.log, "[Negotiation] join failed: {e}");
                self.close(CloseReason::for_error(&e));
                Err(e)
            }
        }
    }

    /// Asks for a new offer/answer cycle, as a negotiation-needed trigger would.
    ///
    /// # Errors
    /// [`SignalError::InvalidState`] when there is no session.
    pub fn renegotiate(&mut self) -> Result<(), SignalError> {
        if !self.state.has_session() {
            return Err(SignalError::InvalidState(self.state));
        }
        self.on_negotiation_needed();
        Ok(())
    }

    /// Records a locally produced stream and hands it to the transport.
    ///
    /// # Errors
    /// [`SignalError::InvalidState`] once closed; transport rejections are
    /// returned as [`SignalError::Transport`] and leave the session untouched.
    pub fn add_local_stream(&mut self, stream: MediaStream) -> Result<(), SignalError> {
        if self.state == NegotiationState::Closed {
            return Err(SignalError::InvalidState(self.state));
        }
        self.registry.record_local_stream(&stream);
        self.transport.add_local_stream(&stream)?;
        sink_verbose!(
            self.log,
            "[Negotiation] local stream {} with {} track(s)",
            stream.id,
            stream.tracks.len()
        );
        Ok(())
    }

    /// Closes the session. Pending requests complete with `Cancelled`.
    pub fn disconnect(&mut self) {
        self.close(CloseReason::Disconnected);
    }

    // ---- event loop -----------------------------------------------------------

    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Channel(ChannelEvent::Frame(text)) => self.on_frame(&text),
            EngineEvent::Channel(ChannelEvent::Closed { reason }) => {
                if self.state != NegotiationState::Closed {
                    sink_warn!(self.log, "[Negotiation] signaling channel closed");
                    self.close(CloseReason::ChannelClosed(reason));
                }
            }
            EngineEvent::Transport(event) => self.on_transport_event(event),
            EngineEvent::Intent(intent) => self.on_intent(intent),
        }
    }

    /// Drains the queue, applies expired deadlines and returns what happened.
    pub fn poll(&mut self) -> Vec<NegotiationEvent> {
        while let Ok(event) = self.rx.try_recv() {
            self.handle_event(event);
        }
        self.tick(Instant::now());
        mem::take(&mut self.out)
    }

    /// Times out requests whose deadline is at or before `now`.
    pub fn tick(&mut self, now: Instant) {
        if !self.correlator.expire(now).is_empty() {
            self.advance_in_flight();
        }
    }

    /// Blocks processing the queue until the session is closed, passing every
    /// [`NegotiationEvent`] to `on_event`.
    pub fn run<F: FnMut(&NegotiationEvent)>(&mut self, mut on_event: F) {
        while self.state != NegotiationState::Closed {
            let wait = self.correlator.next_deadline().map_or(RUN_TICK, |d| {
                d.saturating_duration_since(Instant::now()).min(RUN_TICK)
            });
            match self.rx.recv_timeout(wait) {
                Ok(event) => self.handle_event(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            for event in self.poll() {
                on_event(&event);
            }
        }
        for event in mem::take(&mut self.out) {
            on_event(&event);
        }
    }

    // ---- inbound ----------------------------------------------------------

    fn on_intent(&mut self, intent: Intent) {
        let result = match intent {
            Intent::Join { session_id } => self.join(session_id).map(|_| ()),
            Intent::Renegotiate => self.renegotiate(),
            Intent::AddLocalStream(stream) => self.add_local_stream(stream),
            Intent::Disconnect => {
                self.disconnect();
                Ok(())
            }
        };
        if let Err(e) = result {
            self.out.push(NegotiationEvent::Failed(e));
        }
    }

    fn on_frame(&mut self, text: &str) {
        let inbound = match Inbound::parse(text) {
            Ok(inbound) => inbound,
            Err(e) => {
                sink_warn!(self.log, "[Negotiation] dropping malformed frame: {e}");
                return;
            }
        };
        match inbound {
            Inbound::Response { id, outcome } => {
                if let Some(kind) = self.correlator.kind_of(&id) {
                    sink_verbose!(self.log, "[Negotiation] {kind} response {id}");
                }
                if self.correlator.resolve(&id, outcome.map_err(SignalError::from)) {
                    self.advance_in_flight();
                }
            }
            Inbound::Notification(Notification::Offer(offer)) => self.on_remote_offer(offer),
            Inbound::Notification(Notification::Trickle(candidate)) => {
                self.on_remote_candidate(candidate);
            }
            Inbound::Notification(other) => {
                sink_debug!(
                    self.log,
                    "[Negotiation] ignoring {} notification",
                    other.method_name()
                );
            }
        }
    }

    /// Remote-initiated renegotiation: apply, answer, notify. No state change.
    fn on_remote_offer(&mut self, offer: SessionDescription) {
        if !self.state.has_session() {
            sink_warn!(self.log, "[Negotiation] offer notification while {}", self.state);
            return;
        }
        sink_info!(self.log, "[Negotiation] got offer notification");
        if let Err(e) = self.answer_remote_offer(offer) {
            self.fail(e);
        }
    }

    fn answer_remote_offer(&mut self, offer: SessionDescription) -> Result<(), SignalError> {
        self.apply_remote_description(offer)?;
        let answer = self
            .transport
            .create_answer()
            .map_err(|e| SignalError::NegotiationFailed(format!("create answer: {e}")))?;
        self.transport
            .set_local_description(&answer)
            .map_err(|e| SignalError::NegotiationFailed(format!("apply local answer: {e}")))?;
        let params = to_params(&DescParams { desc: &answer })?;
        let frame = encode_notification(Method::Answer, &params)?;
        if let Some(session) = self.session.as_mut() {
            session.local_description = Some(answer);
        }
        sink_info!(self.log, "[Negotiation] sending answer");
        self.channel.send(&frame)?;
        Ok(())
    }

    fn on_remote_candidate(&mut self, candidate: IceCandidateInit) {
        if !self.state.has_session() {
            sink_debug!(self.log, "[Negotiation] remote candidate while {}", self.state);
            return;
        }
        let has_remote = self
            .session
            .as_ref()
            .is_some_and(|s| s.remote_description.is_some());
        if !has_remote {
            self.early_remote_candidates.push(candidate);
            return;
        }
        if let Err(e) = self.transport.add_remote_candidate(&candidate) {
            sink_warn!(self.log, "[Negotiation] remote candidate rejected: {e}");
        }
    }

    fn on_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::NegotiationNeeded => self.on_negotiation_needed(),
            TransportEvent::CandidateDiscovered(candidate) => match self.state {
                NegotiationState::Closed => {}
                NegotiationState::Idle => self.early_candidates.push(candidate),
                _ => self.send_trickle(&candidate),
            },
            TransportEvent::TrackAdded { track, stream_ids } => {
                if self.state == NegotiationState::Closed {
                    return;
                }
                if self.registry.record_remote_track(&track, &stream_ids) {
                    sink_debug!(self.log, "[Negotiation] ontrack: {}", track.id);
                }
            }
            TransportEvent::TrackEnded { track_id } => {
                if self.state == NegotiationState::Closed {
                    return;
                }
                if self.options.prune_ended_tracks {
                    self.registry.remove_track(&track_id);
                }
                sink_debug!(self.log, "[Negotiation] track {track_id} ended");
            }
            TransportEvent::ConnectionStateChanged(state) => self.on_connection_state(state),
        }
    }

    fn on_connection_state(&mut self, state: ConnectionState) {
        if let Some(session) = self.session.as_mut() {
            session.connection = state;
        }
        sink_verbose!(self.log, "[Negotiation] connection state {state:?}");
        if state == ConnectionState::Disconnected {
            sink_warn!(self.log, "[Negotiation] media transport disconnected");
        } else if state.is_terminal() && self.state != NegotiationState::Closed {
            self.close(CloseReason::TransportFailed(state));
        }
    }

    fn on_negotiation_needed(&mut self) {
        if self.state.is_negotiating() {
            sink_debug!(self.log, "[Negotiation] renegotiation deferred");
            self.renegotiation_queued = true;
        } else if self.state == NegotiationState::Negotiated {
            sink_info!(self.log, "[Negotiation] renegotiating");
            self.set_state(NegotiationState::Renegotiating);
            if let Err(e) = self.send_offer() {
                self.fail(e);
            }
        } else {
            sink_debug!(self.log, "[Negotiation] negotiation needed while {}", self.state);
        }
    }

    // ---- outbound ---------------------------------------------------------

    fn send_join(&mut self, session_id: &str) -> Result<RequestId, SignalError> {
        let offer = self.create_local_offer()?;
        let params = to_params(&JoinParams {
            offer: &offer,
            sid: session_id,
        })?;
        self.issue(Method::Join, &params)
    }

    fn send_offer(&mut self) -> Result<RequestId, SignalError> {
        let offer = self.create_local_offer()?;
        let params = to_params(&DescParams { desc: &offer })?;
        self.issue(Method::Offer, &params)
    }

    fn create_local_offer(&mut self) -> Result<SessionDescription, SignalError> {
        let offer = self
            .transport
            .create_offer()
            .map_err(|e| SignalError::NegotiationFailed(format!("create offer: {e}")))?;
        self.transport
            .set_local_description(&offer)
            .map_err(|e| SignalError::NegotiationFailed(format!("apply local offer: {e}")))?;
        if let Some(session) = self.session.as_mut() {
            session.local_description = Some(offer.clone());
        }
        Ok(offer)
    }

    fn issue(&mut self, kind: Method, params: &Value) -> Result<RequestId, SignalError> {
        let (id, completion) = self
            .correlator
            .issue(kind, params, self.options.request_timeout)?;
        if let Some(session) = self.session.as_mut() {
            session.pending.push(id.clone());
        }
        self.in_flight = Some(InFlight {
            id: id.clone(),
            kind,
            completion,
        });
        Ok(id)
    }

    fn send_trickle(&mut self, candidate: &IceCandidateInit) {
        let frame = to_params(&TrickleParams { candidate })
            .and_then(|params| encode_notification(Method::Trickle, &params));
        let sent = match frame {
            Ok(frame) => self.channel.send(&frame).map_err(SignalError::from),
            Err(e) => Err(e.into()),
        };
        match sent {
            Ok(()) => sink_debug!(self.log, "[Negotiation] trickled {}", candidate.candidate),
            Err(e) => sink_warn!(self.log, "[Negotiation] trickle not sent: {e}"),
        }
    }

    // ---- completion of negotiation requests ---------------------------------

    fn advance_in_flight(&mut self) {
        let Some(outcome) = self
            .in_flight
            .as_mut()
            .and_then(|flight| flight.completion.try_take())
        else {
            return;
        };
        let Some(flight) = self.in_flight.take() else {
            return;
        };
        if let Some(session) = self.session.as_mut() {
            session.pending.retain(|id| *id != flight.id);
        }

        let applied = outcome.and_then(|result| {
            let answer = description(flight.kind, result).map_err(|e| {
                SignalError::NegotiationFailed(format!("{} response: {e}", flight.kind))
            })?;
            self.apply_remote_description(answer)
        });
        if let Err(e) = applied {
            self.fail(e);
            return;
        }

        match flight.kind {
            Method::Join => sink_info!(self.log, "[Negotiation] got join answer"),
            _ => sink_info!(self.log, "[Negotiation] got renegotiation answer"),
        }
        self.set_state(NegotiationState::Negotiated);
        if mem::take(&mut self.renegotiation_queued) {
            self.on_negotiation_needed();
        }
    }

    /// Applies a remote description, then any remote candidates held back for it.
    fn apply_remote_description(&mut self, desc: SessionDescription) -> Result<(), SignalError> {
        self.transport
            .set_remote_description(&desc)
            .map_err(|e| SignalError::NegotiationFailed(format!("apply remote description: {e}")))?;
        if let Some(session) = self.session.as_mut() {
            session.remote_description = Some(desc);
        }
        for candidate in mem::take(&mut self.early_remote_candidates) {
            if let Err(e) = self.transport.add_remote_candidate(&candidate) {
                sink_warn!(self.log, "[Negotiation] remote candidate rejected: {e}");
            }
        }
        Ok(())
    }

    // ---- state --------------------------------------------------------------

    fn set_state(&mut self, to: NegotiationState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        sink_verbose!(self.log, "[Negotiation] {from} -> {to}");
        self.out.push(NegotiationEvent::StateChanged { from, to });
    }

    /// A negotiation step failed: report it and close, never retry.
    fn fail(&mut self, err: SignalError) {
        sink_error!(self.log, "[Negotiation] {err}");
        let reason = CloseReason::for_error(&err);
        self.out.push(NegotiationEvent::Failed(err));
        self.close(reason);
    }

    fn close(&mut self, reason: CloseReason) {
        if self.state == NegotiationState::Closed {
            return;
        }
        self.correlator.cancel_all();
        if let Some(mut flight) = self.in_flight.take() {
            if let Some(Err(e)) = flight.completion.try_take() {
                sink_debug!(self.log, "[Negotiation] {} {} ended: {e}", flight.kind, flight.id);
                self.out.push(NegotiationEvent::Failed(e));
            }
        }
        self.renegotiation_queued = false;
        self.early_candidates.clear();
        self.early_remote_candidates.clear();
        self.session = None;
        self.transport.close();
        self.channel.close();

        sink_info!(self.log, "[Negotiation] session closed: {reason}");
        self.set_state(NegotiationState::Closed);
        self.out.push(NegotiationEvent::Closed(reason));
    }
}
