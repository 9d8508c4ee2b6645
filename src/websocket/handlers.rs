use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::ChatEvent;
use crate::state::AppState;
use crate::websocket::message_types::WsInboundEvent;

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: AppState, socket: WebSocket) {
    let connection_id = Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();

    // Broadcasts for every session this connection joins funnel through
    // one channel; the select loop below writes them to the socket.
    let (tx, mut rx) = unbounded_channel::<Message>();

    debug!(%connection_id, "websocket connected");

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                match outbound {
                    Some(message) => {
                        if sink.send(message).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        handle_inbound(&state, connection_id, &tx, &text).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // ping/pong handled by the framework
                    Some(Err(e)) => {
                        debug!(%connection_id, error = %e, "websocket read failed");
                        break;
                    }
                }
            }
        }
    }

    state.registry.leave(connection_id).await;
    debug!(%connection_id, "websocket disconnected");
}

async fn handle_inbound(
    state: &AppState,
    connection_id: Uuid,
    tx: &tokio::sync::mpsc::UnboundedSender<Message>,
    text: &str,
) {
    let event = match serde_json::from_str::<WsInboundEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(%connection_id, error = %e, "ignoring malformed websocket event");
            return;
        }
    };

    match event {
        WsInboundEvent::JoinSession { session_id } => {
            state
                .registry
                .join(connection_id, &session_id, tx.clone())
                .await;
            debug!(%connection_id, %session_id, "joined session");
        }
        WsInboundEvent::ChatMessage {
            session_id,
            sender,
            text,
            file_url,
            file_type,
        } => {
            state
                .relay
                .handle_chat_event(ChatEvent {
                    session_id,
                    sender,
                    text,
                    file_url,
                    file_type,
                })
                .await;
        }
    }
}
