use std::sync::Arc;

use axum::extract::ws::Message as WsMessage;
use tracing::error;

use crate::metrics::PERSIST_FAILURES_TOTAL;
use crate::models::{ChatEvent, Message};
use crate::services::push::PushDispatcher;
use crate::storage::RelayStore;
use crate::websocket::message_types::WsOutboundEvent;
use crate::websocket::SessionRegistry;

/// The ingest pipeline for one inbound chat event: record it, fan it out
/// to the session's live sockets, then hand it to push delivery. The
/// stages are independent best-effort steps with no transaction across
/// them and no retries.
pub struct RelayEngine {
    store: Arc<dyn RelayStore>,
    registry: SessionRegistry,
    push: Arc<PushDispatcher>,
}

impl RelayEngine {
    pub fn new(
        store: Arc<dyn RelayStore>,
        registry: SessionRegistry,
        push: Arc<PushDispatcher>,
    ) -> Self {
        Self {
            store,
            registry,
            push,
        }
    }

    /// Handle one inbound chat event. Never fails from the caller's point
    /// of view: a failed store write is logged and counted, and the event
    /// is still broadcast. Broadcast happens before this returns, which is
    /// what keeps delivery FIFO within a session; push delivery runs as a
    /// detached task so a slow transport cannot delay it.
    pub async fn handle_chat_event(&self, event: ChatEvent) {
        let message = Message::from_event(&event);
        if let Err(e) = self.store.insert_message(&message).await {
            PERSIST_FAILURES_TOTAL.inc();
            error!(session_id = %event.session_id, error = %e, "failed to persist message, broadcasting anyway");
        }

        let outbound = WsOutboundEvent::ChatMessage {
            session_id: event.session_id.clone(),
            sender: event.sender.clone(),
            text: event.text.clone(),
            file_url: event.file_url.clone(),
            file_type: event.file_type.clone(),
        };
        match serde_json::to_string(&outbound) {
            Ok(json) => {
                self.registry
                    .broadcast(&event.session_id, WsMessage::Text(json))
                    .await;
            }
            Err(e) => {
                error!(session_id = %event.session_id, error = %e, "failed to serialize broadcast event");
            }
        }

        let push = Arc::clone(&self.push);
        tokio::spawn(async move {
            push.dispatch(&event).await;
        });
    }
}
