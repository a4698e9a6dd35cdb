use anyhow::{Context, Result};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use voicemesh_core::{ClientMessage, RelayMessage, RoomId, UserId};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A bare WebSocket client speaking the relay protocol.
pub struct TestClient {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl TestClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws, _) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;
        let (sink, stream) = ws.split();
        Ok(Self { sink, stream })
    }

    pub async fn send(&mut self, msg: &ClientMessage) -> Result<()> {
        let json = serde_json::to_string(msg)?;
        self.send_raw(&json).await
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.sink
            .send(Message::Text(text.to_owned().into()))
            .await
            .context("Failed to send frame")?;
        Ok(())
    }

    /// Next relay message, skipping control frames.
    pub async fn recv(&mut self, timeout_ms: u64) -> Result<RelayMessage> {
        let deadline = Duration::from_millis(timeout_ms);

        loop {
            let frame = tokio::time::timeout(deadline, self.stream.next())
                .await
                .context("Timeout waiting for relay message")?;

            match frame {
                Some(Ok(Message::Text(text))) => {
                    tracing::debug!("[TestClient] <- {}", text.as_str());
                    return serde_json::from_str(text.as_str())
                        .context("Relay sent an unparsable frame");
                }
                Some(Ok(Message::Close(_))) | None => anyhow::bail!("Relay closed the socket"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    /// `true` if nothing arrives within `ms`.
    pub async fn is_silent_for(&mut self, ms: u64) -> bool {
        self.recv(ms).await.is_err()
    }

    /// Sends `join` and waits for the roster.
    pub async fn join(&mut self, room: &str, user: &str) -> Result<Vec<UserId>> {
        self.send(&ClientMessage::Join {
            room: RoomId::from(room),
            user: UserId::from(user),
        })
        .await?;

        match self.recv(super::SIGNAL_TIMEOUT_MS).await? {
            RelayMessage::Users { users, .. } => Ok(users),
            other => anyhow::bail!("Expected roster, got {:?}", other),
        }
    }

    pub async fn leave(&mut self, room: &str, user: &str) -> Result<()> {
        self.send(&ClientMessage::Leave {
            room: RoomId::from(room),
            user: UserId::from(user),
        })
        .await
    }

    pub async fn close(mut self) -> Result<()> {
        self.sink.close().await.context("Failed to close socket")?;
        Ok(())
    }
}
