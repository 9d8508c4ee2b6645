use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::models::PushSubscription;
use crate::services::push::NotificationPayload;

/// Closed classification of a failed delivery attempt. The dispatcher
/// pattern-matches on this instead of raw status codes.
#[derive(Debug, Clone, Error)]
pub enum PushDeliveryError {
    /// The endpoint no longer exists; the subscription must be pruned.
    #[error("subscription gone")]
    Gone,

    /// Likely to succeed later (server error, timeout, connect failure).
    /// The subscription is kept.
    #[error("transient delivery failure: {0}")]
    Transient(String),

    /// Anything else. The subscription is kept.
    #[error("delivery failure: {0}")]
    Other(String),
}

/// Transport collaborator that carries one notification to one subscriber.
#[async_trait]
pub trait PushClient: Send + Sync {
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
    ) -> Result<(), PushDeliveryError>;
}

/// Delivers notifications by POSTing the JSON payload to the
/// subscription's endpoint.
pub struct HttpPushClient {
    http: reqwest::Client,
    ttl_secs: u32,
}

impl HttpPushClient {
    pub fn new(ttl_secs: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            ttl_secs,
        }
    }
}

fn classify_status(status: StatusCode) -> Result<(), PushDeliveryError> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => Err(PushDeliveryError::Gone),
        s if s.is_server_error() => Err(PushDeliveryError::Transient(format!(
            "endpoint returned {s}"
        ))),
        s => Err(PushDeliveryError::Other(format!("endpoint returned {s}"))),
    }
}

#[async_trait]
impl PushClient for HttpPushClient {
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
    ) -> Result<(), PushDeliveryError> {
        let response = self
            .http
            .post(&subscription.endpoint)
            .header("TTL", self.ttl_secs.to_string())
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    PushDeliveryError::Transient(e.to_string())
                } else {
                    PushDeliveryError::Other(e.to_string())
                }
            })?;

        classify_status(response.status())
    }
}
