use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use uuid::Uuid;

pub mod handlers;
pub mod message_types;

pub type ConnectionId = Uuid;

#[derive(Default)]
struct RegistryInner {
    /// session id -> connection id -> outbound channel
    groups: HashMap<String, HashMap<ConnectionId, UnboundedSender<Message>>>,
    /// connection id -> sessions it joined, for disconnect cleanup
    memberships: HashMap<ConnectionId, HashSet<String>>,
}

/// Tracks which live sockets belong to which session. State is in-memory
/// only; a connection re-joins after every reconnect. Mutations go through
/// a single lock so join/leave/broadcast stay race-free on a multi-threaded
/// runtime.
#[derive(Default, Clone)]
pub struct SessionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a session's delivery group. Idempotent: joining
    /// a session twice leaves exactly one membership. A connection may be
    /// in any number of sessions.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        session_id: &str,
        sender: UnboundedSender<Message>,
    ) {
        let mut guard = self.inner.write().await;
        guard
            .groups
            .entry(session_id.to_string())
            .or_default()
            .insert(connection_id, sender);
        guard
            .memberships
            .entry(connection_id)
            .or_default()
            .insert(session_id.to_string());
    }

    /// Remove a connection from every group it joined. Called when the
    /// socket task ends so dropped connections are never addressable.
    pub async fn leave(&self, connection_id: ConnectionId) {
        let mut guard = self.inner.write().await;
        let Some(sessions) = guard.memberships.remove(&connection_id) else {
            return;
        };
        for session_id in sessions {
            if let Some(group) = guard.groups.get_mut(&session_id) {
                group.remove(&connection_id);
                if group.is_empty() {
                    guard.groups.remove(&session_id);
                }
            }
        }
    }

    /// Deliver a payload to every connection currently joined to the
    /// session, including the sender's own socket. Best-effort: senders
    /// whose channel is closed are dropped from the group.
    pub async fn broadcast(&self, session_id: &str, message: Message) {
        let mut guard = self.inner.write().await;
        if let Some(group) = guard.groups.get_mut(session_id) {
            group.retain(|_, sender| sender.send(message.clone()).is_ok());
            if group.is_empty() {
                guard.groups.remove(session_id);
            }
        }
    }

    pub async fn member_count(&self, session_id: &str) -> usize {
        let guard = self.inner.read().await;
        guard.groups.get(session_id).map(|g| g.len()).unwrap_or(0)
    }
}
