//! Transport port for outbound webhook POSTs.

use canvas_types::error::WebhookError;

/// The raw result of an outbound POST: status code plus body text.
///
/// The correlator decides what the body means (JSON inline response vs.
/// out-of-band acknowledgement); the transport only moves bytes.
#[derive(Debug, Clone)]
pub struct TransportReply {
    pub status: u16,
    pub body: String,
}

impl TransportReply {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound HTTP transport for webhook envelopes.
///
/// Implementations live in canvas-infra (e.g., `HttpWebhookTransport`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait WebhookTransport: Send + Sync {
    /// POST `body` as `application/json` to `url` and return the reply.
    ///
    /// Network-level failures map to [`WebhookError::Transport`]; a non-2xx
    /// status is a successful transport call and is reported via the reply.
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<TransportReply, WebhookError>> + Send;
}
