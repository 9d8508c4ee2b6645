#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use chat_relay_service::error::{AppError, AppResult};
use chat_relay_service::models::{ChatEvent, Message, PushSubscription};
use chat_relay_service::services::push::{NotificationPayload, PushDispatcher};
use chat_relay_service::services::push_client::{PushClient, PushDeliveryError};
use chat_relay_service::services::relay::RelayEngine;
use chat_relay_service::storage::RelayStore;
use chat_relay_service::websocket::SessionRegistry;

/// In-memory store standing in for Postgres.
#[derive(Default)]
pub struct MemoryStore {
    pub messages: Mutex<Vec<Message>>,
    pub subscriptions: Mutex<Vec<PushSubscription>>,
    pub fail_message_inserts: AtomicBool,
}

impl MemoryStore {
    pub fn add_subscription(&self, subscription: PushSubscription) {
        self.subscriptions.lock().unwrap().push(subscription);
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.subscriptions
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.endpoint.clone())
            .collect()
    }
}

#[async_trait]
impl RelayStore for MemoryStore {
    async fn insert_message(&self, message: &Message) -> AppResult<()> {
        if self.fail_message_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Internal);
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn subscriptions_for_session(
        &self,
        session_id: &str,
    ) -> AppResult<Vec<PushSubscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn remove_subscription(&self, endpoint: &str) -> AppResult<()> {
        self.subscriptions
            .lock()
            .unwrap()
            .retain(|s| s.endpoint != endpoint);
        Ok(())
    }
}

/// Push transport double: records every attempt, returns scripted
/// outcomes per endpoint (success when no outcome is scripted).
#[derive(Default)]
pub struct ScriptedPushClient {
    outcomes: Mutex<HashMap<String, PushDeliveryError>>,
    pub deliveries: Mutex<Vec<(String, NotificationPayload)>>,
    delay: Option<Duration>,
}

impl ScriptedPushClient {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn fail_endpoint(&self, endpoint: &str, error: PushDeliveryError) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), error);
    }

    pub fn delivery_count(&self, endpoint: &str) -> usize {
        self.deliveries
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| e == endpoint)
            .count()
    }

    pub fn total_deliveries(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }
}

#[async_trait]
impl PushClient for ScriptedPushClient {
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
    ) -> Result<(), PushDeliveryError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.deliveries
            .lock()
            .unwrap()
            .push((subscription.endpoint.clone(), payload.clone()));
        match self.outcomes.lock().unwrap().get(&subscription.endpoint) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

pub fn chat_event(session_id: &str, sender: &str, text: &str) -> ChatEvent {
    ChatEvent {
        session_id: session_id.into(),
        sender: sender.into(),
        text: text.into(),
        file_url: String::new(),
        file_type: String::new(),
    }
}

pub fn subscription(endpoint: &str, session_id: &str) -> PushSubscription {
    PushSubscription {
        endpoint: endpoint.into(),
        p256dh: "p256dh-key".into(),
        auth: "auth-secret".into(),
        session_id: session_id.into(),
    }
}

pub fn dispatcher(
    store: Arc<MemoryStore>,
    client: Arc<ScriptedPushClient>,
) -> PushDispatcher {
    PushDispatcher::new(
        store,
        client,
        "http://localhost:3000",
        4,
        Duration::from_secs(2),
    )
}

pub fn engine(
    store: Arc<MemoryStore>,
    client: Arc<ScriptedPushClient>,
    registry: SessionRegistry,
) -> RelayEngine {
    let push = Arc::new(dispatcher(store.clone(), client));
    RelayEngine::new(store, registry, push)
}

/// Wait until `condition` holds or a few seconds pass.
pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}
