//! WebSocket feed of encounter events
//!
//! Clients only listen; every state change goes through the REST API and is
//! echoed here as an [`EncounterEvent`] after it has been persisted.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::domain::events::EncounterEvent;
use crate::infrastructure::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let Some(mut events) = state.event_bus.subscribe() else {
        tracing::debug!("Event bus closed, dropping WebSocket connection");
        return;
    };
    let (mut ws_sender, mut ws_receiver) = socket.split();

    tracing::info!("Encounter subscriber connected");

    let send_task = tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Encounter subscriber lagged, events dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if let Some(json) = encode_event(&event) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
        let _ = ws_sender.send(Message::Close(None)).await;
    });

    // Drain the client side until it closes; incoming messages are ignored
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    send_task.abort();
    tracing::info!("Encounter subscriber disconnected");
}

fn encode_event(event: &EncounterEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!("Failed to serialize {} event: {}", event.name(), e);
            None
        }
    }
}
