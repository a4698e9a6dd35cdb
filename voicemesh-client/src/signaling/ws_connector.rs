use crate::error::ClientError;
use crate::signaling::relay_channel::{RelayChannel, RelayConnector};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use voicemesh_core::{ClientMessage, RelayMessage};

/// Connects to the relay over a WebSocket.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl RelayConnector for WsConnector {
    async fn connect(&self, url: &str) -> Result<RelayChannel, ClientError> {
        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| ClientError::ChannelUnavailable(format!("{}: {}", url, e)))?;
        info!("Connected to relay at {}", url);

        let (mut ws_write, mut ws_read) = ws_stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientMessage>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<RelayMessage>();

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to encode {:?}: {}", msg, e);
                        continue;
                    }
                };
                if ws_write.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            debug!("Outbound relay channel dropped, closing socket");
            let _ = ws_write.close().await;
        });

        tokio::spawn(async move {
            while let Some(frame) = ws_read.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<RelayMessage>(text.as_str()) {
                            Ok(msg) => {
                                if in_tx.send(msg).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Ignoring malformed relay frame: {}", e),
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Relay socket error: {}", e);
                        break;
                    }
                }
            }
            debug!("Relay socket closed");
        });

        Ok(RelayChannel {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}
