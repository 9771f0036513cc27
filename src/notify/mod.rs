//! Notification sink.

pub mod webhook;

use anyhow::Result;

use crate::models::AlertPayload;

pub use webhook::WebhookSink;

/// Best-effort delivery of an alert to an external channel.
pub trait NotificationSink: Send + Sync {
    fn send(&self, payload: &AlertPayload) -> Result<()>;
}
