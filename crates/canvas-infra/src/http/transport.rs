//! reqwest implementation of the webhook transport port.

use std::time::Duration;

use canvas_core::webhook::{TransportReply, WebhookTransport};
use canvas_types::error::WebhookError;

/// Outbound webhook transport over reqwest.
///
/// Sends `Content-Type: application/json` and nothing else -- authentication
/// headers are a destination concern, configured outside the core.
pub struct HttpWebhookTransport {
    client: reqwest::Client,
}

impl HttpWebhookTransport {
    /// Create a transport with a 60-second request timeout.
    ///
    /// The per-session resolution window is enforced by the correlator's
    /// timers; this client timeout only bounds how long a single POST can
    /// hold its connection.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create reqwest client");
        Self { client }
    }
}

impl Default for HttpWebhookTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookTransport for HttpWebhookTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<TransportReply, WebhookError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| WebhookError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| WebhookError::Transport(e.to_string()))?;

        Ok(TransportReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unresolvable_host_maps_to_transport_error() {
        let transport = HttpWebhookTransport::new();
        let result = transport
            .post_json(
                "http://canvas-test.invalid/hook",
                &serde_json::json!({"action": "test"}),
            )
            .await;

        match result {
            Err(WebhookError::Transport(_)) => {}
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
