use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use relay_common::error::RelayError;
use relay_common::types::Notification;

/// Destination accepting one POST per notification.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    /// Deliver one notification, returning the HTTP status on success.
    async fn deliver(&self, notification: &Notification) -> Result<u16, RelayError>;
}

/// Chat webhook client posting `{"text": ...}` bodies.
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// JSON body sent for a notification.
    pub fn payload(notification: &Notification) -> serde_json::Value {
        serde_json::json!({ "text": notification.text })
    }
}

#[async_trait]
impl WebhookSink for WebhookClient {
    async fn deliver(&self, notification: &Notification) -> Result<u16, RelayError> {
        let body = serde_json::to_vec(&Self::payload(notification))?;

        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), body = %body, "Webhook response");

        if !status.is_success() {
            return Err(RelayError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(status.as_u16())
    }
}
