use std::{
    net::TcpStream,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, Sender, TryRecvError},
    },
    thread,
    time::Duration,
};

use rustls::ClientConfig;
use tungstenite::{
    Connector, Message, WebSocket, client::IntoClientRequest, handshake::HandshakeError,
    stream::MaybeTlsStream,
};

use crate::{
    log::LogSink,
    signaling_client::{
        channel_event::{ChannelEvent, InboundHandler},
        signaling_channel::SignalingChannel,
        signaling_client_error::SignalingClientError,
        signaling_command::SignalingCommand,
    },
    sink_debug, sink_info, sink_warn,
};

/// How long the network thread blocks in `read()` before servicing commands.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

/// WebSocket signaling channel.
///
/// One network thread owns the socket. Outbound frames reach it through a
/// command queue; inbound text frames are handed to the [`InboundHandler`] in
/// arrival order, followed by exactly one [`ChannelEvent::Closed`].
pub struct WsChannel {
    cmd_tx: Sender<SignalingCommand>,
    open: Arc<AtomicBool>,
}

impl WsChannel {
    /// Connects to `url` (`ws://` or `wss://`) and starts the network thread.
    ///
    /// With `tls = None`, `wss://` endpoints are verified against the webpki
    /// roots; pass a pinned config from [`tls::pinned_client_config`] to trust
    /// a private CA instead.
    ///
    /// [`tls::pinned_client_config`]: super::tls::pinned_client_config
    ///
    /// # Errors
    /// Fails if the URL is unusable, the TCP connection cannot be made, or the
    /// TLS/WebSocket handshake is rejected.
    pub fn connect(
        url: &str,
        tls: Option<Arc<ClientConfig>>,
        log: Arc<dyn LogSink>,
        on_event: InboundHandler,
    ) -> Result<Self, SignalingClientError> {
        let request = url.into_client_request()?;
        let uri = request.uri();
        let host = uri
            .host()
            .ok_or_else(|| SignalingClientError::InvalidEndpoint(url.to_owned()))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_owned();
        let port = uri.port_u16().unwrap_or(match uri.scheme_str() {
            Some("wss") => 443,
            _ => 80,
        });

        let tcp = TcpStream::connect((host.as_str(), port))?;
        tcp.set_nodelay(true)?;
        let ctl = tcp.try_clone()?;

        let connector = tls.map(Connector::Rustls);
        let (socket, _response) = tungstenite::client_tls_with_config(request, tcp, None, connector)
            .map_err(|e| match e {
                HandshakeError::Failure(e) => SignalingClientError::WebSocket(e),
                HandshakeError::Interrupted(_) => SignalingClientError::Tls(
                    "handshake interrupted on a blocking socket".into(),
                ),
            })?;
        // Shared with the socket owned by the handshake result.
        ctl.set_read_timeout(Some(POLL_INTERVAL))?;

        sink_info!(log, "[Signaling] connected to {url}");

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let open = Arc::new(AtomicBool::new(true));
        let worker_open = Arc::clone(&open);
        thread::Builder::new()
            .name("signaling-ws".into())
            .spawn(move || network_loop(socket, cmd_rx, worker_open, log, on_event))?;

        Ok(Self { cmd_tx, open })
    }
}

impl SignalingChannel for WsChannel {
    fn send(&self, frame: &str) -> Result<(), SignalingClientError> {
        if !self.is_open() {
            return Err(SignalingClientError::Closed);
        }
        self.cmd_tx
            .send(SignalingCommand::Send(frame.to_owned()))
            .map_err(|_| SignalingClientError::Closed)
    }

    fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            let _ = self.cmd_tx.send(SignalingCommand::Disconnect);
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Drop for WsChannel {
    fn drop(&mut self) {
        self.close();
    }
}

fn network_loop(
    mut socket: Socket,
    cmd_rx: Receiver<SignalingCommand>,
    open: Arc<AtomicBool>,
    log: Arc<dyn LogSink>,
    mut on_event: InboundHandler,
) {
    let reason = 'run: loop {
        loop {
            match cmd_rx.try_recv() {
                Ok(SignalingCommand::Send(frame)) => {
                    sink_debug!(log, "[Signaling] -> {frame}");
                    if let Err(e) = socket.send(Message::text(frame)) {
                        break 'run Some(format!("write failed: {e}"));
                    }
                }
                Ok(SignalingCommand::Disconnect) | Err(TryRecvError::Disconnected) => {
                    let _ = socket.close(None);
                    let _ = socket.flush();
                    break 'run None;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        match socket.read() {
            Ok(Message::Text(text)) => {
                sink_debug!(log, "[Signaling] <- {}", text.as_str());
                on_event(ChannelEvent::Frame(text.as_str().to_owned()));
            }
            Ok(Message::Binary(bytes)) => {
                sink_warn!(log, "[Signaling] ignoring {}-byte binary frame", bytes.len());
            }
            Ok(Message::Close(frame)) => {
                let _ = socket.flush();
                break frame.map(|f| f.reason.as_str().to_owned()).filter(|r| !r.is_empty());
            }
            Ok(_) => {}
            Err(tungstenite::Error::Io(e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) => {}
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                break None;
            }
            Err(e) => break Some(e.to_string()),
        }
    };

    open.store(false, Ordering::SeqCst);
    match &reason {
        Some(r) => sink_warn!(log, "[Signaling] channel closed: {r}"),
        None => sink_info!(log, "[Signaling] channel closed"),
    }
    on_event(ChannelEvent::Closed { reason });
}
