use crate::error::ClientError;
use crate::media::{AudioCapture, LocalAudio, RemoteAudioTrack};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, trace};
use webrtc::api::media_engine::MIME_TYPE_OPUS;
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

const OPUS_CLOCK_RATE: u32 = 48_000;
const OPUS_CHANNELS: u16 = 2;

/// The single outgoing Opus track shared by every peer connection of a session.
///
/// An encoder pushes samples through [`RtcAudioSource::write_sample`]; while
/// muted or released the samples are discarded, the track itself stays bound.
pub struct RtcAudioSource {
    track: Arc<TrackLocalStaticSample>,
    enabled: AtomicBool,
    live: AtomicBool,
}

impl RtcAudioSource {
    pub fn opus() -> Arc<Self> {
        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: OPUS_CLOCK_RATE,
                channels: OPUS_CHANNELS,
                ..Default::default()
            },
            "audio".to_owned(),
            "voicemesh".to_owned(),
        ));

        Arc::new(Self {
            track,
            enabled: AtomicBool::new(false),
            live: AtomicBool::new(false),
        })
    }

    pub fn track(&self) -> Arc<TrackLocalStaticSample> {
        Arc::clone(&self.track)
    }

    /// Writes one encoded frame to every bound connection.
    pub async fn write_sample(&self, data: Bytes, duration: Duration) -> Result<()> {
        if !self.live.load(Ordering::Acquire) || !self.enabled.load(Ordering::Acquire) {
            trace!("Dropping {} byte sample, source is silent", data.len());
            return Ok(());
        }

        self.track
            .write_sample(&Sample {
                data,
                duration,
                ..Default::default()
            })
            .await?;
        Ok(())
    }
}

impl LocalAudio for RtcAudioSource {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    fn release(&self) {
        debug!("Releasing local audio source");
        self.live.store(false, Ordering::Release);
        self.enabled.store(false, Ordering::Release);
    }
}

/// [`AudioCapture`] backed by an [`RtcAudioSource`].
pub struct RtcCapture {
    source: Arc<RtcAudioSource>,
}

impl RtcCapture {
    pub fn new(source: Arc<RtcAudioSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl AudioCapture for RtcCapture {
    async fn acquire(&self) -> Result<Arc<dyn LocalAudio>, ClientError> {
        if self.source.live.swap(true, Ordering::AcqRel) {
            return Err(ClientError::CaptureUnavailable(
                "audio source is already in use".to_owned(),
            ));
        }
        Ok(self.source.clone())
    }
}

/// Incoming audio track of a remote peer.
pub struct RtcRemoteTrack(pub Arc<TrackRemote>);

#[async_trait]
impl RemoteAudioTrack for RtcRemoteTrack {
    fn id(&self) -> String {
        self.0.id()
    }

    fn stream_id(&self) -> String {
        self.0.stream_id()
    }

    async fn read_payload(&self) -> Option<Bytes> {
        match self.0.read_rtp().await {
            Ok((packet, _)) => Some(packet.payload),
            Err(e) => {
                debug!("Remote track {} ended: {}", self.0.id(), e);
                None
            }
        }
    }
}
