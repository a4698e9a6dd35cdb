use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use voicemesh_client::{AudioCapture, AudioOutput, AudioSink, ClientError, LocalAudio, RemoteAudioTrack};
use voicemesh_core::UserId;

#[derive(Default)]
pub struct FakeLocalAudio {
    enabled: AtomicBool,
    releases: AtomicUsize,
}

impl FakeLocalAudio {
    pub fn is_released(&self) -> bool {
        self.release_count() > 0
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl LocalAudio for FakeLocalAudio {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.enabled.store(false, Ordering::SeqCst);
    }
}

/// Capture double that counts acquisitions and can simulate a missing device.
#[derive(Default)]
pub struct FakeCapture {
    unavailable: bool,
    acquired: AtomicUsize,
    last: Mutex<Option<Arc<FakeLocalAudio>>>,
}

impl FakeCapture {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            unavailable: true,
            ..Default::default()
        })
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Option<Arc<FakeLocalAudio>> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioCapture for FakeCapture {
    async fn acquire(&self) -> Result<Arc<dyn LocalAudio>, ClientError> {
        if self.unavailable {
            return Err(ClientError::CaptureUnavailable(
                "no input device".to_owned(),
            ));
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        let audio = Arc::new(FakeLocalAudio::default());
        *self.last.lock().unwrap() = Some(audio.clone());
        Ok(audio)
    }
}

/// Records which peers currently have remote audio attached.
#[derive(Default)]
pub struct RecordingOutput {
    attached: Arc<Mutex<HashMap<UserId, bool>>>,
}

impl RecordingOutput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_attached(&self, peer: &str) -> bool {
        self.attached
            .lock()
            .unwrap()
            .get(&UserId::from(peer))
            .copied()
            .unwrap_or(false)
    }
}

impl AudioOutput for RecordingOutput {
    fn create_sink(&self, peer: &UserId) -> Box<dyn AudioSink> {
        Box::new(RecordingSink {
            peer: peer.clone(),
            attached: self.attached.clone(),
        })
    }
}

pub struct RecordingSink {
    peer: UserId,
    attached: Arc<Mutex<HashMap<UserId, bool>>>,
}

impl AudioSink for RecordingSink {
    fn attach(&mut self, _track: Arc<dyn RemoteAudioTrack>) {
        self.attached.lock().unwrap().insert(self.peer.clone(), true);
    }

    fn detach(&mut self) {
        self.attached.lock().unwrap().insert(self.peer.clone(), false);
    }
}
