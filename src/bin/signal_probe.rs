//! Joins a session with a pre-recorded offer and reports what the
//! coordinator does, until the session closes.
//!
//! Usage: `signal_probe [CONFIG]`. Without an argument the probe reads
//! `client_signal_probe.conf`, then `client_default.conf`, then falls back to the
//! built-in defaults.

use std::{env, process, sync::Arc};

use rustysignal::{
    config::{ClientSettings, Config},
    log::{LogSink, NoopLogSink, logger::Logger},
    media::StaticTransport,
    negotiation::{EngineOptions, EventQueue, NegotiationEngine, NegotiationEvent},
    signaling_client::{SignalingChannel, WsChannel, tls::pinned_client_config},
};

fn main() {
    let args: Vec<String> = env::args().collect();

    let config_result = if args.len() > 1 {
        let path = &args[1];
        println!("Loading config: {path}");
        Config::load(path)
    } else {
        Config::load("client_signal_probe.conf").or_else(|_| Config::load("client_default.conf"))
    };
    let config = config_result.unwrap_or_else(|e| {
        eprintln!("Error loading config: {e}. Using defaults.");
        Config::empty()
    });
    let settings = ClientSettings::from_config(&config);

    let logger = settings.logging.enabled.then(|| Logger::start(&settings.logging));
    let log: Arc<dyn LogSink> = match &logger {
        Some(logger) => {
            println!("Logging to {}", logger.file_path().display());
            Arc::new(logger.handle())
        }
        None => Arc::new(NoopLogSink),
    };

    let Some(offer_path) = settings.media.offer_path.as_ref() else {
        eprintln!("[Media] offer_path is not set; the probe needs a recorded SDP offer.");
        process::exit(2);
    };
    let transport = match StaticTransport::from_file(offer_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Cannot use offer: {e}");
            process::exit(2);
        }
    };

    let tls = match settings.signaling.ca_cert_path.as_deref() {
        Some(path) => match pinned_client_config(path) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                eprintln!("Cannot load CA {}: {e}", path.display());
                process::exit(2);
            }
        },
        None => None,
    };

    let queue = EventQueue::new();
    let endpoint = &settings.signaling.endpoint;
    let channel: Arc<dyn SignalingChannel> = match WsChannel::connect(
        endpoint,
        tls,
        Arc::clone(&log),
        queue.handle().channel_handler(),
    ) {
        Ok(ch) => Arc::new(ch),
        Err(e) => {
            eprintln!("Cannot connect to {endpoint}: {e}");
            process::exit(1);
        }
    };
    println!("Connected to {endpoint} (media STUN: {})", settings.media.stun);

    let mut engine = NegotiationEngine::new(
        queue,
        channel,
        transport,
        log,
        EngineOptions::from_settings(&settings),
    );

    let session_id = settings.signaling.session_id.clone();
    match engine.join(session_id.as_str()) {
        Ok(id) => println!("Join request {id} sent for session '{session_id}'"),
        Err(e) => {
            eprintln!("Join failed: {e}");
            process::exit(1);
        }
    }

    let mut failed = false;
    engine.run(|event| match event {
        NegotiationEvent::StateChanged { from, to } => println!("state: {from} -> {to}"),
        NegotiationEvent::Failed(e) => {
            failed = true;
            eprintln!("failed: {e}");
        }
        NegotiationEvent::Closed(reason) => println!("closed: {reason}"),
    });

    for entry in engine.registry().streams() {
        println!(
            "stream {} ({:?}): {} track(s)",
            entry.id,
            entry.origin,
            entry.tracks.len()
        );
    }
    if failed {
        process::exit(1);
    }
}
