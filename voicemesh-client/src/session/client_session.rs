use crate::error::ClientError;
use crate::media::{AudioCapture, AudioOutput, ChannelAudioOutput, AudioFrame, LocalAudio};
use crate::peer::{PeerConnectionManager, PeerSnapshot};
use crate::session::client_config::ClientConfig;
use crate::session::engine::{Engine, EngineCommand, TRANSPORT_EVENT_CAPACITY};
use crate::signaling::{RelayConnector, SignalSender, WsConnector};
use crate::transport::{RtcAudioSource, RtcCapture, RtcTransportFactory, TransportFactory};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct Running {
    commands: mpsc::Sender<EngineCommand>,
    task: JoinHandle<()>,
}

/// One participant's membership in a voice room.
///
/// Owns the capture handle, the mute flag and the relay connection. All
/// methods take `&self`, so a session can be shared behind an `Arc`.
pub struct ClientSession {
    config: ClientConfig,
    capture: Arc<dyn AudioCapture>,
    connector: Arc<dyn RelayConnector>,
    factory: Arc<dyn TransportFactory>,
    output: Arc<dyn AudioOutput>,
    started: AtomicBool,
    muted: AtomicBool,
    local_audio: Mutex<Option<Arc<dyn LocalAudio>>>,
    running: tokio::sync::Mutex<Option<Running>>,
}

impl ClientSession {
    pub fn new(
        config: ClientConfig,
        capture: Arc<dyn AudioCapture>,
        connector: Arc<dyn RelayConnector>,
        factory: Arc<dyn TransportFactory>,
        output: Arc<dyn AudioOutput>,
    ) -> Self {
        Self {
            config,
            capture,
            connector,
            factory,
            output,
            started: AtomicBool::new(false),
            muted: AtomicBool::new(true),
            local_audio: Mutex::new(None),
            running: tokio::sync::Mutex::new(None),
        }
    }

    /// A session wired to `webrtc` peer connections and a WebSocket relay.
    ///
    /// Returns the outgoing audio source (feed it encoded Opus frames) and the
    /// receiver of remote audio frames.
    pub fn webrtc(
        config: ClientConfig,
        playback_capacity: usize,
    ) -> (Self, Arc<RtcAudioSource>, mpsc::Receiver<AudioFrame>) {
        let source = RtcAudioSource::opus();
        let (output, frames) = ChannelAudioOutput::new(playback_capacity);
        let factory = RtcTransportFactory::new(config.transport_config(), source.clone());

        let session = Self::new(
            config,
            Arc::new(RtcCapture::new(source.clone())),
            Arc::new(WsConnector),
            Arc::new(factory),
            Arc::new(output),
        );
        (session, source, frames)
    }

    /// Acquires capture, connects to the relay and joins the room.
    ///
    /// A call while already started is a no-op. On failure everything
    /// acquired so far is released and the session can be started again.
    pub async fn start(&self) -> Result<(), ClientError> {
        // `started` only changes under this lock, so a concurrent stop sees
        // either no engine or a fully launched one.
        let mut running = self.running.lock().await;
        if running.is_some() {
            debug!("Session for {} already started", self.config.user);
            return Ok(());
        }

        match self.launch().await {
            Ok(engine) => {
                *running = Some(engine);
                self.started.store(true, Ordering::Release);
                info!("{} joined {}", self.config.user, self.config.room);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to start session for {}: {}", self.config.user, e);
                Err(e)
            }
        }
    }

    async fn launch(&self) -> Result<Running, ClientError> {
        let audio = self.capture.acquire().await?;

        let channel = match self.connector.connect(&self.config.relay_url).await {
            Ok(channel) => channel,
            Err(e) => {
                audio.release();
                return Err(e);
            }
        };

        audio.set_enabled(true);
        self.muted.store(false, Ordering::Release);
        *self.local_audio_slot() = Some(audio.clone());

        let signals = SignalSender::new(self.config.user.clone(), channel.outbound);
        signals.send_join(&self.config.room);

        let (events_tx, events_rx) = mpsc::channel(TRANSPORT_EVENT_CAPACITY);
        let (commands_tx, commands_rx) = mpsc::channel(8);

        let manager = PeerConnectionManager::new(
            self.config.room.clone(),
            signals.clone(),
            self.factory.clone(),
            self.output.clone(),
            events_tx,
        );

        let engine = Engine {
            manager,
            signals,
            local_audio: audio,
            inbound: channel.inbound,
            events: events_rx,
            commands: commands_rx,
        };

        Ok(Running {
            commands: commands_tx,
            task: tokio::spawn(engine.run()),
        })
    }

    /// Closes every link, releases capture and leaves the room. A no-op when not started.
    pub async fn stop(&self) {
        let mut running = self.running.lock().await;
        let Some(Running { commands, task }) = running.take() else {
            debug!("Session for {} is not running", self.config.user);
            return;
        };

        let (ack_tx, ack_rx) = oneshot::channel();
        let acked = match commands.send(EngineCommand::Stop(ack_tx)).await {
            Ok(()) => ack_rx.await.is_ok(),
            Err(_) => false,
        };
        drop(commands);
        if let Err(e) = task.await {
            warn!("Voice engine task ended abnormally: {}", e);
        }

        // The engine releases capture on its way out; only an engine that
        // never acknowledged the stop leaves it to us.
        let audio = self.local_audio_slot().take();
        if let (false, Some(audio)) = (acked, audio) {
            warn!("Voice engine did not shut down cleanly, releasing capture");
            audio.release();
        }
        self.muted.store(true, Ordering::Release);
        self.started.store(false, Ordering::Release);
        info!("{} left {}", self.config.user, self.config.room);
    }

    /// Stops transmitting captured audio. Links are left untouched.
    pub fn mute(&self) {
        self.set_transmitting(false);
    }

    pub fn unmute(&self) {
        self.set_transmitting(true);
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Acquire)
    }

    /// Active links of the running session.
    pub async fn peers(&self) -> Result<Vec<PeerSnapshot>, ClientError> {
        let commands = {
            let running = self.running.lock().await;
            match running.as_ref() {
                Some(running) => running.commands.clone(),
                None => return Err(ClientError::Stopped),
            }
        };

        let (tx, rx) = oneshot::channel();
        commands
            .send(EngineCommand::Snapshot(tx))
            .await
            .map_err(|_| ClientError::Stopped)?;
        rx.await.map_err(|_| ClientError::Stopped)
    }

    fn set_transmitting(&self, enabled: bool) {
        let slot = self.local_audio_slot();
        let Some(audio) = slot.as_ref() else {
            debug!("No capture held, ignoring mute toggle");
            return;
        };
        audio.set_enabled(enabled);
        self.muted.store(!enabled, Ordering::Release);
    }

    fn local_audio_slot(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn LocalAudio>>> {
        self.local_audio
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
