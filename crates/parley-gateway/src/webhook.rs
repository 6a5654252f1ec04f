// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget event webhook.
//!
//! After each successfully answered question the exchange is POSTed to the
//! configured URL. Delivery failures are logged at warn and never affect
//! the caller.

use serde::Serialize;
use tracing::{debug, warn};

/// One answered exchange, as delivered to the webhook endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AskEvent {
    pub conversation_id: String,
    pub question: String,
    pub answer: String,
}

/// Posts [`AskEvent`]s to a configured endpoint.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Creates a notifier targeting the given URL.
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Spawn a background delivery of the event. Never blocks the caller.
    pub fn notify(&self, event: AskEvent) {
        let client = self.client.clone();
        let url = self.url.clone();
        tokio::spawn(async move {
            match client.post(&url).json(&event).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(url = %url, "webhook event delivered");
                }
                Ok(response) => {
                    warn!(url = %url, status = %response.status(), "webhook endpoint rejected event");
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "failed to deliver webhook event");
                }
            }
        });
    }
}
