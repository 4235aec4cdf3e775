use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::io::Write;

use crate::core::NotificationDeliveryError;

/// External sink for the single "new listings available" notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, body: &str) -> Result<(), NotificationDeliveryError>;
}

/// Generic notification text. Never names sources or listings; the console
/// carries the detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

impl NotificationContent {
    pub fn for_query(query: &str) -> Self {
        Self {
            title: format!("New listings for \"{}\"!", query),
            body: "Check your terminal.".to_string(),
        }
    }
}

/// Logs the notification and rings the terminal bell.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<(), NotificationDeliveryError> {
        tracing::info!("🔔 {} {}", title, body);
        let mut stdout = std::io::stdout();
        // the bell is cosmetic; a closed stdout must not fail delivery
        let _ = stdout.write_all(b"\x07").and_then(|_| stdout.flush());
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    body: &'a str,
}

/// POSTs `{"title", "body"}` JSON to a webhook endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<(), NotificationDeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { title, body })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationDeliveryError::Rejected(status.as_u16()));
        }

        tracing::debug!("Notification delivered to {}", self.url);
        Ok(())
    }
}
