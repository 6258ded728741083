//! Webhook wire format and correlation outcome types.
//!
//! The outbound envelope and inbound response match the JSON layout the n8n
//! automation flows already consume and produce: camelCase fields and epoch
//! millisecond timestamps. Session ids stay caller-chosen strings; they are
//! the only correlation key between an outbound request and its (possibly
//! asynchronous) response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::project::ProjectSettings;

/// Well-known envelope actions.
pub mod action {
    pub const TEST: &str = "test";
    pub const GENERATE_PROJECT_ATTRIBUTES: &str = "generate-project-attributes";
    pub const CONVERSATION_MESSAGE: &str = "conversation-message";
    pub const USER_RESPONSE: &str = "user-response";
}

/// Outbound webhook body: `{sessionId, action, data, timestamp}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEnvelope {
    pub session_id: String,
    pub action: String,
    pub data: serde_json::Value,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl WebhookEnvelope {
    /// Build an envelope stamped with the current time.
    pub fn new(
        session_id: impl Into<String>,
        action: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            action: action.into(),
            data,
            timestamp: Utc::now(),
        }
    }
}

/// Inbound correlated response: `{sessionId, success, data?, error?, timestamp?}`.
///
/// `success` defaults to `true` when the sender omits it; only an explicit
/// `false` marks a remote failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub session_id: String,
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub timestamp: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// How a dispatched session is expected to resolve.
///
/// The source conflated synchronous-webhook and asynchronous-callback
/// delivery behind an accidental "fire inline if the body parses as JSON,
/// else keep waiting" fallback. The mode makes that contract explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Resolve inline when the HTTP body parses as JSON; otherwise keep the
    /// session pending for out-of-band delivery. (The source behavior.)
    #[default]
    Auto,
    /// The destination answers synchronously: a non-JSON body is an error.
    Inline,
    /// The destination answers out of band: the HTTP body is ignored and the
    /// session resolves only via delivery or timeout.
    Deferred,
}

/// The exactly-once resolution of a dispatched session.
///
/// Replaces the source's `onSuccess`/`onError`/`onTimeout` callback triple
/// with a single tagged value carried over the session's outcome channel.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    /// A response arrived, inline or out of band. The embedded `success`
    /// flag reflects the remote result; delivery itself succeeded.
    Success(WebhookResponse),
    /// Transport failure or non-2xx HTTP status.
    Error(String),
    /// No resolution within the timeout window.
    Timeout,
}

/// Payload n8n returns for the `generate-project-attributes` action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGenerationResponse {
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub settings: Option<ProjectSettings>,
    /// Whether the agent considers the attribute set complete.
    #[serde(default)]
    pub finished: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wire_layout() {
        let envelope = WebhookEnvelope::new(
            "sess-1",
            action::TEST,
            serde_json::json!({"message": "hello"}),
        );
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["sessionId"], "sess-1");
        assert_eq!(json["action"], "test");
        assert_eq!(json["data"]["message"], "hello");
        assert!(json["timestamp"].is_i64());
    }

    #[test]
    fn test_response_success_defaults_to_true() {
        let response: WebhookResponse =
            serde_json::from_str(r#"{"sessionId":"sess-1","data":{"x":1}}"#).unwrap();
        assert!(response.success);
        assert_eq!(response.data, Some(serde_json::json!({"x": 1})));
        assert!(response.timestamp.is_none());
    }

    #[test]
    fn test_response_explicit_failure() {
        let response: WebhookResponse =
            serde_json::from_str(r#"{"sessionId":"sess-1","success":false,"error":"boom"}"#)
                .unwrap();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_delivery_mode_defaults_to_auto() {
        assert_eq!(DeliveryMode::default(), DeliveryMode::Auto);
        assert_eq!(
            serde_json::from_str::<DeliveryMode>("\"deferred\"").unwrap(),
            DeliveryMode::Deferred
        );
    }

    #[test]
    fn test_generation_response_tolerates_partial_payload() {
        let parsed: ProjectGenerationResponse =
            serde_json::from_str(r#"{"instructions":"be helpful","tags":["ai"]}"#).unwrap();
        assert_eq!(parsed.instructions, "be helpful");
        assert_eq!(parsed.tags, vec!["ai"]);
        assert!(parsed.settings.is_none());
    }
}
