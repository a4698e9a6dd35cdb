use crate::error::ClientError;
use crate::media::{AudioSink, RemoteAudioTrack};
use crate::peer::link_state::{Handshake, LinkState, Role};
use crate::signaling::SignalSender;
use crate::transport::{ConnectionState, LinkId, PeerTransport};
use std::sync::Arc;
use tracing::{debug, info, warn};
use voicemesh_core::{IceCandidate, SessionDescription, UserId};

/// Signaling payload addressed to one link.
#[derive(Debug, Clone)]
pub enum Signal {
    Offer(SessionDescription),
    Answer(SessionDescription),
    Candidate(IceCandidate),
}

/// Everything that can drive a [`PeerLink`] forward.
pub enum LinkEvent {
    SignalReceived(Signal),
    TransportStateChanged(ConnectionState),
    TrackAvailable(Arc<dyn RemoteAudioTrack>),
    LocalStop,
}

/// Negotiation with exactly one remote participant.
///
/// A link never goes back to an earlier state. Once `Closed` it is discarded
/// and any later interaction with the same peer starts a fresh instance.
pub struct PeerLink {
    remote: UserId,
    id: LinkId,
    role: Role,
    state: LinkState,
    transport: Box<dyn PeerTransport>,
    sink: Box<dyn AudioSink>,
    sink_attached: bool,
    local_applied: bool,
    remote_applied: bool,
    transport_connected: bool,
    signals: SignalSender,
}

impl PeerLink {
    fn new(
        remote: UserId,
        id: LinkId,
        role: Role,
        handshake: Handshake,
        transport: Box<dyn PeerTransport>,
        sink: Box<dyn AudioSink>,
        signals: SignalSender,
    ) -> Self {
        Self {
            remote,
            id,
            role,
            state: LinkState::Connecting(handshake),
            transport,
            sink,
            sink_attached: false,
            local_applied: false,
            remote_applied: false,
            transport_connected: false,
            signals,
        }
    }

    /// Creates the offer, applies it locally and sends it to `remote`.
    ///
    /// On failure the transport is closed before the error is returned.
    pub async fn initiator(
        remote: UserId,
        id: LinkId,
        transport: Box<dyn PeerTransport>,
        sink: Box<dyn AudioSink>,
        signals: SignalSender,
    ) -> Result<Self, ClientError> {
        let mut link = Self::new(
            remote,
            id,
            Role::Initiator,
            Handshake::OfferSent,
            transport,
            sink,
            signals,
        );

        match link.send_offer().await {
            Ok(()) => {
                info!("Sent offer to {} on link {}", link.remote, link.id);
                Ok(link)
            }
            Err(e) => {
                link.close().await;
                Err(e)
            }
        }
    }

    /// Applies `offer` from `remote`, then creates, applies and sends the answer.
    pub async fn responder(
        remote: UserId,
        id: LinkId,
        transport: Box<dyn PeerTransport>,
        sink: Box<dyn AudioSink>,
        signals: SignalSender,
        offer: SessionDescription,
    ) -> Result<Self, ClientError> {
        let mut link = Self::new(
            remote,
            id,
            Role::Responder,
            Handshake::OfferReceived,
            transport,
            sink,
            signals,
        );

        match link.answer(offer).await {
            Ok(()) => {
                link.state = LinkState::Connecting(Handshake::AnswerSent);
                info!("Answered offer from {} on link {}", link.remote, link.id);
                Ok(link)
            }
            Err(e) => {
                link.close().await;
                Err(e)
            }
        }
    }

    pub fn remote(&self) -> &UserId {
        &self.remote
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    pub fn has_audio(&self) -> bool {
        self.sink_attached
    }

    /// Applies one event. An `Err` means the link is unusable and must be closed.
    pub async fn handle(&mut self, event: LinkEvent) -> Result<(), ClientError> {
        if matches!(self.state, LinkState::Closing | LinkState::Closed) {
            debug!("Link {} to {} is {}, ignoring event", self.id, self.remote, self.state);
            return Ok(());
        }

        match event {
            LinkEvent::SignalReceived(Signal::Offer(offer)) => self.on_offer(offer).await,
            LinkEvent::SignalReceived(Signal::Answer(answer)) => self.on_answer(answer).await,
            LinkEvent::SignalReceived(Signal::Candidate(candidate)) => {
                self.transport
                    .add_candidate(candidate)
                    .await
                    .map_err(|e| ClientError::negotiation(&self.remote, "candidate", e))
            }
            LinkEvent::TransportStateChanged(state) => {
                self.on_transport_state(state).await;
                Ok(())
            }
            LinkEvent::TrackAvailable(track) => {
                info!("Audio from {} is available on link {}", self.remote, self.id);
                self.sink.attach(track);
                self.sink_attached = true;
                Ok(())
            }
            LinkEvent::LocalStop => {
                self.close().await;
                Ok(())
            }
        }
    }

    /// Trickles one locally discovered candidate to the remote peer.
    pub fn forward_local_candidate(&self, candidate: IceCandidate) {
        if matches!(self.state, LinkState::Closing | LinkState::Closed) {
            return;
        }
        self.signals.send_candidate(&self.remote, candidate);
    }

    /// Detaches audio and closes the transport. Safe to call more than once.
    pub async fn close(&mut self) {
        if matches!(self.state, LinkState::Closing | LinkState::Closed) {
            return;
        }
        self.state = LinkState::Closing;

        if self.sink_attached {
            self.sink.detach();
            self.sink_attached = false;
        }
        if let Err(e) = self.transport.close().await {
            warn!("Failed to close transport for {}: {:#}", self.remote, e);
        }

        self.state = LinkState::Closed;
        info!("Link {} to {} closed", self.id, self.remote);
    }

    async fn send_offer(&mut self) -> Result<(), ClientError> {
        let offer = self
            .transport
            .create_offer()
            .await
            .map_err(|e| ClientError::negotiation(&self.remote, "create offer", e))?;
        self.transport
            .set_local_description(offer.clone())
            .await
            .map_err(|e| ClientError::negotiation(&self.remote, "apply local offer", e))?;
        self.local_applied = true;
        self.signals.send_offer(&self.remote, offer);
        Ok(())
    }

    async fn answer(&mut self, offer: SessionDescription) -> Result<(), ClientError> {
        self.transport
            .set_remote_description(offer)
            .await
            .map_err(|e| ClientError::negotiation(&self.remote, "apply remote offer", e))?;
        self.remote_applied = true;

        let answer = self
            .transport
            .create_answer()
            .await
            .map_err(|e| ClientError::negotiation(&self.remote, "create answer", e))?;
        self.transport
            .set_local_description(answer.clone())
            .await
            .map_err(|e| ClientError::negotiation(&self.remote, "apply local answer", e))?;
        self.local_applied = true;
        self.signals.send_answer(&self.remote, answer);
        Ok(())
    }

    async fn on_offer(&mut self, offer: SessionDescription) -> Result<(), ClientError> {
        match self.state {
            LinkState::Connecting(Handshake::OfferSent) => {
                warn!(
                    "Offer from {} collides with our own offer on link {}, dropping it",
                    self.remote, self.id
                );
                Ok(())
            }
            _ => {
                debug!("Renegotiating link {} with {}", self.id, self.remote);
                self.answer(offer).await?;
                self.maybe_connected();
                Ok(())
            }
        }
    }

    async fn on_answer(&mut self, answer: SessionDescription) -> Result<(), ClientError> {
        if self.state != LinkState::Connecting(Handshake::OfferSent) || self.remote_applied {
            warn!(
                "Unexpected answer from {} while link {} is {}, dropping it",
                self.remote, self.id, self.state
            );
            return Ok(());
        }

        self.transport
            .set_remote_description(answer)
            .await
            .map_err(|e| ClientError::negotiation(&self.remote, "apply remote answer", e))?;
        self.remote_applied = true;
        self.maybe_connected();
        Ok(())
    }

    async fn on_transport_state(&mut self, state: ConnectionState) {
        debug!("Transport for {} on link {} is {:?}", self.remote, self.id, state);

        if state.is_terminal() {
            warn!("Transport to {} went {:?}, tearing down link", self.remote, state);
            self.close().await;
            return;
        }

        if state == ConnectionState::Connected {
            self.transport_connected = true;
            self.maybe_connected();
        }
    }

    fn maybe_connected(&mut self) {
        if let LinkState::Connecting(_) = self.state
            && self.local_applied
            && self.remote_applied
            && self.transport_connected
        {
            self.state = LinkState::Connected;
            info!("Link {} to {} is connected ({:?})", self.id, self.remote, self.role);
        }
    }
}
