//! `WebSocket` endpoint for real-time telemetry.
//!
//! Clients connect to `GET /ws` and receive every processed document
//! ingested after they connected, one text frame per document with no
//! envelope. Nothing is replayed on connect. The client is never
//! required to send anything; a silent client stays subscribed until
//! it disconnects or falls behind. Each subscriber buffers at most
//! [`SUBSCRIBER_BUFFER`] undelivered frames, and the first frame that
//! does not fit drops the subscription, so a burst of more than 64
//! documents disconnects even a healthy client that is briefly slow to
//! drain its socket.
//!
//! [`SUBSCRIBER_BUFFER`]: telemetry_core::fanout::SUBSCRIBER_BUFFER

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use telemetry_core::{FanoutHandle, RecordStore};
use tracing::debug;

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming processed documents.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_telemetry<S: RecordStore>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    let fanout = state.fanout.clone();
    ws.on_upgrade(move |socket| handle_ws(socket, fanout))
}

/// Register with the fan-out and forward frames until either side
/// goes away.
async fn handle_ws(mut socket: WebSocket, fanout: FanoutHandle) {
    let Ok(mut subscription) = fanout.connect() else {
        debug!("fan-out not running, closing WebSocket");
        return;
    };
    let id = subscription.id;

    loop {
        tokio::select! {
            frame = subscription.rx.recv() => {
                let Some(frame) = frame else {
                    debug!(subscriber = %id, "dropped by fan-out, closing WebSocket");
                    break;
                };
                if socket.send(Message::Text(frame.to_string().into())).await.is_err() {
                    debug!(subscriber = %id, "WebSocket client disconnected (send failed)");
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(subscriber = %id, "WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(subscriber = %id, "WebSocket error: {e}");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    let _ = fanout.disconnect(id);
}
