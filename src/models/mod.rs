use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chat room, identified by an opaque string. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatSession {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// One stored chat message. Append-only; never mutated or deleted by the
/// relay.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub session_id: String,
    pub sender: String,
    pub text: String,
    pub file_url: String,
    pub file_type: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a message for an inbound chat event with a server-assigned
    /// timestamp.
    pub fn from_event(event: &ChatEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id: event.session_id.clone(),
            sender: event.sender.clone(),
            text: event.text.clone(),
            file_url: event.file_url.clone(),
            file_type: event.file_type.clone(),
            created_at: Utc::now(),
        }
    }
}

/// A registered push target: an opaque transport endpoint plus the key
/// material the transport needs to address this client. Upserted by
/// endpoint; removed when the transport reports the endpoint gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PushSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company_name: String,
    /// Derived URL embedding the user's chat session id.
    pub link: String,
    pub created_at: DateTime<Utc>,
}

/// An inbound chat event as received from a socket, before the relay
/// assigns a timestamp and records it.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub session_id: String,
    pub sender: String,
    pub text: String,
    pub file_url: String,
    pub file_type: String,
}
