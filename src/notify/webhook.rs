//! Slack-compatible incoming webhook delivery.

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client, Response};
use std::time::Duration;
use tracing::debug;

use super::NotificationSink;
use crate::models::AlertPayload;

/// Posts alert payloads as JSON to a webhook URL.
pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    /// Build a sink with connect and total request timeouts so a hung
    /// endpoint cannot stall a loop past its cycle.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(concat!("stalewatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl NotificationSink for WebhookSink {
    fn send(&self, payload: &AlertPayload) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .context("Failed to post alert to webhook")?;

        validate_response_status(&response)?;
        debug!(status = %response.status(), "webhook accepted alert");
        Ok(())
    }
}

fn validate_response_status(response: &Response) -> Result<()> {
    let status = response.status();
    if !status.is_success() {
        bail!(
            "Webhook rejected alert: HTTP {} - {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error")
        );
    }
    Ok(())
}
