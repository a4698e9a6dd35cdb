use crate::Relay;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::{error, info, warn};
use voicemesh_core::ClientMessage;

pub async fn ws_handler(ws: WebSocketUpgrade, State(relay): State<Relay>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, relay))
}

async fn handle_socket(socket: WebSocket, relay: Relay) {
    let (mut session, mut rx) = relay.open_session();
    let session_id = session.id();
    info!("New WebSocket connection: {}", session_id);

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize relay message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(signal) => session.handle(signal),
                    Err(e) => warn!("Invalid ClientMessage from {}: {:?}", session_id, e),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }

        session.close();
    });

    // Whichever half finishes first takes the other down; dropping the
    // session in an aborted task still runs the disconnect path.
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    info!("WebSocket disconnected: {}", session_id);
}
