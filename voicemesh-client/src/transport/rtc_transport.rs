use crate::transport::peer_transport::{ConnectionState, LinkId, PeerTransport, TransportFactory};
use crate::transport::rtc_audio::{RtcAudioSource, RtcRemoteTrack};
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::TransportEvent;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};
use voicemesh_core::{IceCandidate, SdpKind, SessionDescription, UserId};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

impl From<RTCPeerConnectionState> for ConnectionState {
    fn from(state: RTCPeerConnectionState) -> Self {
        match state {
            RTCPeerConnectionState::Connecting => ConnectionState::Connecting,
            RTCPeerConnectionState::Connected => ConnectionState::Connected,
            RTCPeerConnectionState::Disconnected => ConnectionState::Disconnected,
            RTCPeerConnectionState::Failed => ConnectionState::Failed,
            RTCPeerConnectionState::Closed => ConnectionState::Closed,
            _ => ConnectionState::New,
        }
    }
}

fn to_rtc_description(desc: SessionDescription) -> Result<RTCSessionDescription> {
    let rtc = match desc.kind {
        SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
    };
    Ok(rtc)
}

/// [`PeerTransport`] over a `webrtc` peer connection carrying one audio track each way.
pub struct RtcTransport {
    peer: UserId,
    link: LinkId,
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcTransport {
    /// Builds the connection, binds the local audio track and wires every
    /// callback into `event_tx`.
    pub async fn new(
        peer: UserId,
        link: LinkId,
        config: &TransportConfig,
        source: &RtcAudioSource,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        let track: Arc<dyn TrackLocal + Send + Sync> = source.track();
        let rtp_sender = peer_connection
            .add_track(track)
            .await
            .context("Failed to add local audio track")?;

        // RTCP has to be drained for the interceptors to work.
        tokio::spawn(async move {
            let mut buf = vec![0u8; 1500];
            while rtp_sender.read(&mut buf).await.is_ok() {}
        });

        let state_tx = event_tx.clone();
        let uid_state = peer.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let uid = uid_state.clone();

                Box::pin(async move {
                    info!("Peer connection {} for {} is now {}", link, uid, s);
                    let _ = tx
                        .send(TransportEvent::StateChanged {
                            peer: uid,
                            link,
                            state: s.into(),
                        })
                        .await;
                })
            },
        ));

        let ice_tx = event_tx.clone();
        let uid_ice = peer.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let uid = uid_ice.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                trace!("Local candidate for {}: {}", uid, init.candidate);
                let _ = tx
                    .send(TransportEvent::CandidateGenerated {
                        peer: uid,
                        link,
                        candidate: IceCandidate {
                            candidate: init.candidate,
                            sdp_mid: init.sdp_mid,
                            sdp_m_line_index: init.sdp_mline_index,
                            username_fragment: init.username_fragment,
                        },
                    })
                    .await;
            })
        }));

        let track_tx = event_tx;
        let uid_track = peer.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                let uid = uid_track.clone();

                Box::pin(async move {
                    debug!("Remote track {} arrived from {}", track.id(), uid);
                    let _ = tx
                        .send(TransportEvent::TrackAvailable {
                            peer: uid,
                            link,
                            track: Arc::new(RtcRemoteTrack(track)),
                        })
                        .await;
                })
            },
        ));

        Ok(Self {
            peer,
            link,
            peer_connection,
        })
    }
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_local_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        self.peer_connection
            .set_remote_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn add_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment,
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        self.peer_connection.connection_state().into()
    }

    async fn close(&self) -> Result<()> {
        debug!("Closing peer connection {} to {}", self.link, self.peer);
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Creates [`RtcTransport`]s sharing one local audio source.
pub struct RtcTransportFactory {
    config: TransportConfig,
    source: Arc<RtcAudioSource>,
}

impl RtcTransportFactory {
    pub fn new(config: TransportConfig, source: Arc<RtcAudioSource>) -> Self {
        Self { config, source }
    }
}

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        peer: &UserId,
        link: LinkId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>> {
        let transport =
            RtcTransport::new(peer.clone(), link, &self.config, &self.source, events).await?;
        Ok(Box::new(transport))
    }
}
