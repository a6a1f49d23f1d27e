//! WebSocket endpoint
//!
//! One task reads frames and feeds the coordinator; a second drains the
//! connection's outbound queue into the socket. The coordinator never
//! touches the socket directly.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::ServerState;

pub async fn ws_handler(
    State(state): State<Arc<ServerState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: Arc<ServerState>, socket: WebSocket) {
    let conn_id = format!("conn-{}", uuid::Uuid::new_v4());
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.coordinator.on_connect(&conn_id, tx).await;
    debug!(conn = %conn_id, "websocket open");

    // Writer: outbound queue → socket
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&frame) else {
                continue;
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Reader: socket → coordinator
    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => {
                state.coordinator.handle_frame(&conn_id, text.as_str()).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.coordinator.on_disconnect(&conn_id).await;
    writer.abort();
    debug!(conn = %conn_id, "websocket closed");
}
