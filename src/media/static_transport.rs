use std::{fs, path::Path};

use crate::{
    media::{
        media_stream::MediaStream, media_transport::MediaTransport,
        media_transport_error::MediaTransportError,
    },
    protocol::{IceCandidateInit, SessionDescription},
};

/// A transport that offers a fixed, pre-recorded SDP.
///
/// It exists to probe a coordinator's join path without a media stack: the
/// offer comes from a file, the answer is only stored, and remote candidates
/// are collected for inspection. It cannot answer remote offers.
#[derive(Debug, Default)]
pub struct StaticTransport {
    offer_sdp: String,
    local: Option<SessionDescription>,
    remote: Option<SessionDescription>,
    remote_candidates: Vec<IceCandidateInit>,
    streams: Vec<MediaStream>,
    closed: bool,
}

impl StaticTransport {
    pub fn new(offer_sdp: impl Into<String>) -> Self {
        Self {
            offer_sdp: offer_sdp.into(),
            ..Self::default()
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MediaTransportError> {
        let path = path.as_ref();
        let sdp = fs::read_to_string(path)
            .map_err(|e| MediaTransportError::Other(format!("{}: {e}", path.display())))?;
        if !sdp.trim_start().starts_with("v=") {
            return Err(MediaTransportError::InvalidDescription(format!(
                "{} does not contain an SDP body",
                path.display()
            )));
        }
        Ok(Self::new(sdp))
    }

    #[must_use]
    pub fn local_description(&self) -> Option<&SessionDescription> {
        self.local.as_ref()
    }

    #[must_use]
    pub fn remote_description(&self) -> Option<&SessionDescription> {
        self.remote.as_ref()
    }

    #[must_use]
    pub fn remote_candidates(&self) -> &[IceCandidateInit] {
        &self.remote_candidates
    }

    fn ensure_open(&self) -> Result<(), MediaTransportError> {
        if self.closed {
            Err(MediaTransportError::Closed)
        } else {
            Ok(())
        }
    }
}

impl MediaTransport for StaticTransport {
    fn create_offer(&mut self) -> Result<SessionDescription, MediaTransportError> {
        self.ensure_open()?;
        Ok(SessionDescription::offer(self.offer_sdp.clone()))
    }

    fn create_answer(&mut self) -> Result<SessionDescription, MediaTransportError> {
        Err(MediaTransportError::Unsupported("answering remote offers"))
    }

    fn set_local_description(
        &mut self,
        desc: &SessionDescription,
    ) -> Result<(), MediaTransportError> {
        self.ensure_open()?;
        self.local = Some(desc.clone());
        Ok(())
    }

    fn set_remote_description(
        &mut self,
        desc: &SessionDescription,
    ) -> Result<(), MediaTransportError> {
        self.ensure_open()?;
        if !desc.sdp.trim_start().starts_with("v=") {
            return Err(MediaTransportError::InvalidDescription(
                "missing version line".into(),
            ));
        }
        self.remote = Some(desc.clone());
        Ok(())
    }

    fn add_remote_candidate(
        &mut self,
        candidate: &IceCandidateInit,
    ) -> Result<(), MediaTransportError> {
        self.ensure_open()?;
        self.remote_candidates.push(candidate.clone());
        Ok(())
    }

    fn add_local_stream(&mut self, stream: &MediaStream) -> Result<(), MediaTransportError> {
        self.ensure_open()?;
        self.streams.push(stream.clone());
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
