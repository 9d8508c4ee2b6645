mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::Message;
use tokio::sync::mpsc::unbounded_channel;
use uuid::Uuid;

use chat_relay_service::websocket::SessionRegistry;

use common::{chat_event, engine, subscription, wait_for, MemoryStore, ScriptedPushClient};

fn parse_text(message: Message) -> serde_json::Value {
    match message {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn chat_event_is_stored_and_broadcast_to_all_session_members() {
    let store = Arc::new(MemoryStore::default());
    let client = Arc::new(ScriptedPushClient::default());
    let registry = SessionRegistry::new();
    let relay = engine(store.clone(), client, registry.clone());

    let (tx_a, mut rx_a) = unbounded_channel();
    let (tx_b, mut rx_b) = unbounded_channel();
    let (tx_other, mut rx_other) = unbounded_channel();
    registry.join(Uuid::new_v4(), "abc", tx_a).await;
    registry.join(Uuid::new_v4(), "abc", tx_b).await;
    registry.join(Uuid::new_v4(), "xyz", tx_other).await;

    relay.handle_chat_event(chat_event("abc", "u1", "hello")).await;

    for rx in [&mut rx_a, &mut rx_b] {
        let payload = parse_text(rx.recv().await.unwrap());
        assert_eq!(payload["type"], "chat_message");
        assert_eq!(payload["session_id"], "abc");
        assert_eq!(payload["sender"], "u1");
        assert_eq!(payload["text"], "hello");
        assert_eq!(payload["file_url"], "");
        assert_eq!(payload["file_type"], "");
        assert!(payload.get("created_at").is_none());
    }
    assert!(rx_other.try_recv().is_err());

    let messages = store.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].session_id, "abc");
    assert_eq!(messages[0].sender, "u1");
    assert_eq!(messages[0].text, "hello");
}

#[tokio::test]
async fn broadcast_still_happens_when_persistence_fails() {
    let store = Arc::new(MemoryStore::default());
    store.fail_message_inserts.store(true, Ordering::SeqCst);
    let client = Arc::new(ScriptedPushClient::default());
    let registry = SessionRegistry::new();
    let relay = engine(store.clone(), client, registry.clone());

    let (tx, mut rx) = unbounded_channel();
    registry.join(Uuid::new_v4(), "abc", tx).await;

    relay.handle_chat_event(chat_event("abc", "u1", "hello")).await;

    let payload = parse_text(rx.recv().await.unwrap());
    assert_eq!(payload["text"], "hello");
    assert!(store.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_join_delivers_exactly_once() {
    let store = Arc::new(MemoryStore::default());
    let client = Arc::new(ScriptedPushClient::default());
    let registry = SessionRegistry::new();
    let relay = engine(store, client, registry.clone());

    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = unbounded_channel();
    registry.join(connection_id, "abc", tx.clone()).await;
    registry.join(connection_id, "abc", tx).await;

    relay.handle_chat_event(chat_event("abc", "u1", "hello")).await;

    assert!(rx.recv().await.is_some());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn disconnected_member_is_not_targeted() {
    let store = Arc::new(MemoryStore::default());
    let client = Arc::new(ScriptedPushClient::default());
    let registry = SessionRegistry::new();
    let relay = engine(store, client, registry.clone());

    let gone = Uuid::new_v4();
    let (tx_gone, mut rx_gone) = unbounded_channel();
    let (tx_live, mut rx_live) = unbounded_channel();
    registry.join(gone, "abc", tx_gone).await;
    registry.join(Uuid::new_v4(), "abc", tx_live).await;

    registry.leave(gone).await;
    relay.handle_chat_event(chat_event("abc", "u1", "hello")).await;

    assert!(rx_live.recv().await.is_some());
    assert!(rx_gone.try_recv().is_err());
}

#[tokio::test]
async fn push_delivery_runs_detached_from_the_broadcast_path() {
    let store = Arc::new(MemoryStore::default());
    store.add_subscription(subscription("https://push.example/slow", "abc"));
    // A transport this slow must not hold up the event handler.
    let client = Arc::new(ScriptedPushClient::with_delay(Duration::from_millis(1500)));
    let registry = SessionRegistry::new();
    let relay = engine(store, client.clone(), registry.clone());

    let (tx, mut rx) = unbounded_channel();
    registry.join(Uuid::new_v4(), "abc", tx).await;

    let start = Instant::now();
    relay.handle_chat_event(chat_event("abc", "u1", "hello")).await;
    assert!(start.elapsed() < Duration::from_millis(500));

    // The live broadcast is already out...
    assert!(rx.recv().await.is_some());
    // ...and the push attempt completes later on its own.
    wait_for(|| client.total_deliveries() == 1).await;
}

#[tokio::test]
async fn chat_event_reaches_push_subscribers() {
    let store = Arc::new(MemoryStore::default());
    store.add_subscription(subscription("https://push.example/e1", "abc"));
    let client = Arc::new(ScriptedPushClient::default());
    let registry = SessionRegistry::new();
    let relay = engine(store, client.clone(), registry);

    relay.handle_chat_event(chat_event("abc", "u1", "hello")).await;

    wait_for(|| client.total_deliveries() == 1).await;
    let deliveries = client.deliveries.lock().unwrap();
    let (endpoint, payload) = &deliveries[0];
    assert_eq!(endpoint, "https://push.example/e1");
    assert_eq!(payload.title, "New message from u1");
    assert_eq!(payload.body, "hello");
    assert_eq!(payload.url, "http://localhost:3000/chat/abc");
}
