use crate::media::{AudioOutput, AudioSink, RemoteAudioTrack};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use voicemesh_core::UserId;

/// One decoded-elsewhere audio payload tagged with its sender.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub peer: UserId,
    pub payload: Bytes,
}

/// [`AudioOutput`] that pumps every attached track into a single channel.
///
/// The platform player sits on the receiving end.
#[derive(Clone)]
pub struct ChannelAudioOutput {
    tx: mpsc::Sender<AudioFrame>,
}

impl ChannelAudioOutput {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<AudioFrame>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl AudioOutput for ChannelAudioOutput {
    fn create_sink(&self, peer: &UserId) -> Box<dyn AudioSink> {
        Box::new(ChannelSink {
            peer: peer.clone(),
            tx: self.tx.clone(),
            pump: None,
        })
    }
}

struct ChannelSink {
    peer: UserId,
    tx: mpsc::Sender<AudioFrame>,
    pump: Option<JoinHandle<()>>,
}

impl AudioSink for ChannelSink {
    fn attach(&mut self, track: Arc<dyn RemoteAudioTrack>) {
        self.detach();

        debug!(
            "Attaching track {} (stream {}) from {}",
            track.id(),
            track.stream_id(),
            self.peer
        );

        let peer = self.peer.clone();
        let tx = self.tx.clone();
        self.pump = Some(tokio::spawn(async move {
            while let Some(payload) = track.read_payload().await {
                let frame = AudioFrame {
                    peer: peer.clone(),
                    payload,
                };
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
        }));
    }

    fn detach(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

impl Drop for ChannelSink {
    fn drop(&mut self) {
        self.detach();
    }
}
