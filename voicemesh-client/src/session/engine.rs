use crate::media::LocalAudio;
use crate::peer::{PeerConnectionManager, PeerSnapshot};
use crate::signaling::SignalSender;
use crate::transport::TransportEvent;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use voicemesh_core::RelayMessage;

pub(crate) const TRANSPORT_EVENT_CAPACITY: usize = 256;

pub(crate) enum EngineCommand {
    Stop(oneshot::Sender<()>),
    Snapshot(oneshot::Sender<Vec<PeerSnapshot>>),
}

/// Single task owning the link table of a started session.
pub(crate) struct Engine {
    pub(crate) manager: PeerConnectionManager,
    pub(crate) signals: SignalSender,
    pub(crate) local_audio: Arc<dyn LocalAudio>,
    pub(crate) inbound: mpsc::UnboundedReceiver<RelayMessage>,
    pub(crate) events: mpsc::Receiver<TransportEvent>,
    pub(crate) commands: mpsc::Receiver<EngineCommand>,
}

impl Engine {
    pub(crate) async fn run(mut self) {
        info!("Voice engine started for room {}", self.manager.room());
        let mut relay_open = true;

        loop {
            tokio::select! {
                cmd = self.commands.recv() => {
                    match cmd {
                        Some(EngineCommand::Stop(ack)) => {
                            self.shutdown().await;
                            let _ = ack.send(());
                            break;
                        }
                        Some(EngineCommand::Snapshot(reply)) => {
                            let _ = reply.send(self.manager.snapshot());
                        }
                        None => {
                            debug!("Session handle dropped, shutting down");
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                msg = self.inbound.recv(), if relay_open => {
                    match msg {
                        Some(msg) => self.manager.handle_relay_message(msg).await,
                        None => {
                            // Established links do not need the relay any more.
                            warn!(
                                "Lost relay connection, keeping {} existing links",
                                self.manager.len()
                            );
                            relay_open = false;
                        }
                    }
                }

                Some(event) = self.events.recv() => {
                    self.manager.on_transport_event(event).await;
                }
            }
        }

        info!("Voice engine stopped");
    }

    async fn shutdown(&mut self) {
        self.manager.close_all().await;
        self.local_audio.release();
        self.signals.send_leave(self.manager.room());
    }
}
