mod channel_output;

pub use channel_output::*;

use crate::error::ClientError;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use voicemesh_core::UserId;

/// Microphone (or any other local source) that can be opened for a session.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Fails with [`ClientError::CaptureUnavailable`] when the device cannot be opened.
    async fn acquire(&self) -> Result<Arc<dyn LocalAudio>, ClientError>;
}

/// An acquired capture handle.
pub trait LocalAudio: Send + Sync {
    /// Disabled audio keeps the track alive but transmits nothing.
    fn set_enabled(&self, enabled: bool);

    fn is_enabled(&self) -> bool;

    fn release(&self);
}

/// Audio arriving from one remote participant.
#[async_trait]
pub trait RemoteAudioTrack: Send + Sync {
    fn id(&self) -> String;

    fn stream_id(&self) -> String;

    /// Next encoded payload, `None` once the track has ended.
    async fn read_payload(&self) -> Option<Bytes>;
}

/// Playback endpoint for one remote participant.
pub trait AudioSink: Send {
    fn attach(&mut self, track: Arc<dyn RemoteAudioTrack>);

    fn detach(&mut self);
}

/// Hands out one [`AudioSink`] per remote participant.
pub trait AudioOutput: Send + Sync {
    fn create_sink(&self, peer: &UserId) -> Box<dyn AudioSink>;
}
