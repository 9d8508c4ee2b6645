use serde::{Deserialize, Serialize};

fn default_string() -> String {
    String::new()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsInboundEvent {
    #[serde(rename = "join_session")]
    JoinSession { session_id: String },
    #[serde(rename = "chat_message")]
    ChatMessage {
        session_id: String,
        sender: String,
        #[serde(default = "default_string")]
        text: String,
        #[serde(default = "default_string")]
        file_url: String,
        #[serde(default = "default_string")]
        file_type: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsOutboundEvent {
    // created_at is deliberately not part of the broadcast payload;
    // receivers render with arrival time or fetch it from history.
    #[serde(rename = "chat_message")]
    ChatMessage {
        session_id: String,
        sender: String,
        text: String,
        file_url: String,
        file_type: String,
    },
}
