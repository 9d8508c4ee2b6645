use std::sync::Arc;
use std::time::Duration;

use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::metrics::PUSH_DELIVERIES_TOTAL;
use crate::models::ChatEvent;
use crate::services::push_client::{PushClient, PushDeliveryError};
use crate::storage::RelayStore;

const BODY_PREVIEW_CHARS: usize = 100;
const ATTACHMENT_FALLBACK_BODY: &str = "Sent an attachment";

/// The notification sent to every subscriber of a session. Built once per
/// chat event and shared across all delivery attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub url: String,
}

impl NotificationPayload {
    pub fn for_event(event: &ChatEvent, public_base_url: &str) -> Self {
        let body = if event.text.is_empty() {
            ATTACHMENT_FALLBACK_BODY.to_string()
        } else {
            event.text.chars().take(BODY_PREVIEW_CHARS).collect()
        };

        let icon = if event.file_type.starts_with("image") && !event.file_url.is_empty() {
            Some(event.file_url.clone())
        } else {
            None
        };

        Self {
            title: format!("New message from {}", event.sender),
            body,
            icon,
            url: format!(
                "{}/chat/{}",
                public_base_url.trim_end_matches('/'),
                event.session_id
            ),
        }
    }
}

/// Fans one chat event out to every push subscription of its session.
/// Every subscription gets exactly one attempt; attempts run concurrently
/// up to a bound, and one failing endpoint never affects the others.
pub struct PushDispatcher {
    store: Arc<dyn RelayStore>,
    client: Arc<dyn PushClient>,
    public_base_url: String,
    concurrency: usize,
    attempt_timeout: Duration,
}

impl PushDispatcher {
    pub fn new(
        store: Arc<dyn RelayStore>,
        client: Arc<dyn PushClient>,
        public_base_url: impl Into<String>,
        concurrency: usize,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            store,
            client,
            public_base_url: public_base_url.into(),
            concurrency: concurrency.max(1),
            attempt_timeout,
        }
    }

    pub async fn dispatch(&self, event: &ChatEvent) {
        let subscriptions = match self
            .store
            .subscriptions_for_session(&event.session_id)
            .await
        {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                error!(session_id = %event.session_id, error = %e, "failed to load push subscriptions");
                return;
            }
        };

        if subscriptions.is_empty() {
            return;
        }

        let payload = NotificationPayload::for_event(event, &self.public_base_url);

        let outcomes: Vec<_> = stream::iter(subscriptions)
            .map(|subscription| {
                let client = Arc::clone(&self.client);
                let payload = &payload;
                async move {
                    let result = match tokio::time::timeout(
                        self.attempt_timeout,
                        client.deliver(&subscription, payload),
                    )
                    .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(PushDeliveryError::Transient(
                            "delivery attempt timed out".into(),
                        )),
                    };
                    (subscription, result)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (subscription, outcome) in outcomes {
            match outcome {
                Ok(()) => {
                    PUSH_DELIVERIES_TOTAL.with_label_values(&["delivered"]).inc();
                }
                Err(PushDeliveryError::Gone) => {
                    PUSH_DELIVERIES_TOTAL.with_label_values(&["gone"]).inc();
                    info!(endpoint = %subscription.endpoint, "pruning expired push subscription");
                    if let Err(e) = self.store.remove_subscription(&subscription.endpoint).await {
                        error!(endpoint = %subscription.endpoint, error = %e, "failed to prune subscription");
                    }
                }
                Err(PushDeliveryError::Transient(reason)) => {
                    PUSH_DELIVERIES_TOTAL.with_label_values(&["transient"]).inc();
                    warn!(endpoint = %subscription.endpoint, %reason, "push delivery failed, keeping subscription");
                }
                Err(PushDeliveryError::Other(reason)) => {
                    PUSH_DELIVERIES_TOTAL.with_label_values(&["other"]).inc();
                    warn!(endpoint = %subscription.endpoint, %reason, "push delivery failed, keeping subscription");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: &str, file_url: &str, file_type: &str) -> ChatEvent {
        ChatEvent {
            session_id: "abc".into(),
            sender: "u1".into(),
            text: text.into(),
            file_url: file_url.into(),
            file_type: file_type.into(),
        }
    }

    #[test]
    fn body_is_truncated_to_first_100_chars() {
        let text: String = "x".repeat(150);
        let payload = NotificationPayload::for_event(&event(&text, "", ""), "http://host");

        assert_eq!(payload.body.chars().count(), 100);
        assert_eq!(payload.body, "x".repeat(100));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text: String = "ü".repeat(120);
        let payload = NotificationPayload::for_event(&event(&text, "", ""), "http://host");

        assert_eq!(payload.body.chars().count(), 100);
    }

    #[test]
    fn short_text_is_kept_verbatim() {
        let payload = NotificationPayload::for_event(&event("hello", "", ""), "http://host");
        assert_eq!(payload.body, "hello");
    }

    #[test]
    fn empty_text_falls_back_to_attachment_body() {
        let payload = NotificationPayload::for_event(
            &event("", "http://files/a.png", "image/png"),
            "http://host",
        );
        assert_eq!(payload.body, "Sent an attachment");
    }

    #[test]
    fn image_attachments_set_the_icon() {
        let payload = NotificationPayload::for_event(
            &event("look", "http://files/a.png", "image/png"),
            "http://host",
        );
        assert_eq!(payload.icon.as_deref(), Some("http://files/a.png"));
    }

    #[test]
    fn non_image_attachments_have_no_icon() {
        let payload = NotificationPayload::for_event(
            &event("doc", "http://files/a.pdf", "application/pdf"),
            "http://host",
        );
        assert!(payload.icon.is_none());
    }

    #[test]
    fn deep_link_points_back_to_the_session() {
        let payload = NotificationPayload::for_event(&event("hi", "", ""), "http://host/");
        assert_eq!(payload.url, "http://host/chat/abc");
    }

    #[test]
    fn title_names_the_sender() {
        let payload = NotificationPayload::for_event(&event("hi", "", ""), "http://host");
        assert_eq!(payload.title, "New message from u1");
    }

    #[test]
    fn icon_is_omitted_from_json_when_absent() {
        let payload = NotificationPayload::for_event(&event("hi", "", ""), "http://host");
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("icon").is_none());
    }
}
