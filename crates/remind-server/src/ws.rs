//! WebSocket push channel.
//!
//! Each connection gets an acknowledgement, then every alert broadcast while
//! it stays connected. Frames sent by the client are ignored.

use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;

use crate::fanout::{Hub, Subscription};

/// First frame every subscriber receives.
pub const CONNECTED_ACK: &str = "Connected to WebSocket server";

/// Shared state for the push listener.
#[derive(Debug, Clone)]
pub struct PushState {
    pub hub: Hub,
    pub send_timeout: Duration,
}

/// Builds the push router.
pub fn router(state: PushState) -> Router {
    Router::new()
        .route("/", get(upgrade))
        .route("/ws", get(upgrade))
        .with_state(state)
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<PushState>) -> Response {
    // Subscribe before the handshake completes so no alert slips in between.
    let subscription = state.hub.subscribe();
    ws.on_upgrade(move |socket| serve_subscriber(socket, subscription, state.send_timeout))
}

#[derive(Debug)]
enum SendError {
    Closed,
    TimedOut,
}

async fn send_text(socket: &mut WebSocket, text: String, timeout: Duration) -> Result<(), SendError> {
    match tokio::time::timeout(timeout, socket.send(Message::Text(text.into()))).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(_)) => Err(SendError::Closed),
        Err(_) => Err(SendError::TimedOut),
    }
}

async fn serve_subscriber(mut socket: WebSocket, mut subscription: Subscription, timeout: Duration) {
    tracing::info!("subscriber connected");

    if let Err(e) = send_text(&mut socket, CONNECTED_ACK.to_string(), timeout).await {
        tracing::debug!(error = ?e, "subscriber gone before acknowledgement");
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                None | Some(Err(_) | Ok(Message::Close(_))) => break,
                Some(Ok(_)) => {}
            },
            alert = subscription.recv() => {
                let Some(alert) = alert else { break };
                match send_text(&mut socket, alert, timeout).await {
                    Ok(()) => {}
                    Err(SendError::TimedOut) => {
                        tracing::warn!(?timeout, "dropping slow subscriber");
                        break;
                    }
                    Err(SendError::Closed) => break,
                }
            }
        }
    }

    tracing::info!("subscriber disconnected");
}
