//! `WebSocket` handler for real-time session streaming.
//!
//! Clients connect to `GET /ws/session`. The current session is sent as
//! the first frame, then every accepted mutation is pushed as a
//! `session_update` frame carrying the complete state. Clients replace
//! whatever they held with each frame.
//!
//! Each connection is one observer [`Subscription`]; it is dropped, and so
//! unregistered, when the socket closes.
//!
//! [`Subscription`]: groupboard_core::Subscription

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use groupboard_types::SessionUpdate;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming session snapshots.
///
/// # Route
///
/// `GET /ws/session`
pub async fn ws_session(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: subscribe, then forward each snapshot
/// as a text frame until either side goes away.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut subscription = state.subscribe().await;
    debug!(observer = %subscription.id(), "WebSocket client connected");

    loop {
        tokio::select! {
            // Receive the next snapshot from the hub.
            snapshot = subscription.recv() => {
                let Some(snapshot) = snapshot else {
                    debug!(observer = %subscription.id(), "observer unsubscribed, closing");
                    return;
                };
                let json = match SessionUpdate::encode(&snapshot) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!("Failed to serialize session update: {e}");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(observer = %subscription.id(), "WebSocket client disconnected (send failed)");
                    return;
                }
            }
            // Check if the client sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(observer = %subscription.id(), "WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(observer = %subscription.id(), "WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(observer = %subscription.id(), "WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Clients only listen; ignore anything they send.
                    }
                }
            }
        }
    }
}
