//! Webhook dispatch and correlation-callback handlers for the REST API.
//!
//! `/webhooks/response` is the inbound endpoint the automation side (n8n)
//! posts correlated responses to. It optionally verifies a shared bearer
//! token and always acknowledges with 200 -- duplicates and post-timeout
//! stragglers are expected and dropped by the correlator.

use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use canvas_core::webhook::DispatchOptions;
use canvas_types::webhook::{DeliveryMode, WebhookEnvelope, WebhookResponse};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body for POST /api/v1/webhooks/dispatch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    /// Destination; falls back to the configured agent URL.
    pub url: Option<String>,
    pub action: String,
    #[serde(default)]
    pub data: serde_json::Value,
    /// Correlation key; a fresh one is minted when omitted.
    pub session_id: Option<String>,
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub mode: DeliveryMode,
}

/// Body for POST /api/v1/webhooks/test.
#[derive(Debug, Deserialize)]
pub struct TestRequest {
    pub url: String,
}

/// POST /api/v1/webhooks/dispatch - Send an envelope and register the session.
pub async fn dispatch_webhook(
    State(state): State<AppState>,
    Json(body): Json<DispatchRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let url = body
        .url
        .or_else(|| state.config.webhook.agent_url.clone())
        .ok_or_else(|| {
            AppError::Validation("no URL given and no agent URL is configured".to_string())
        })?;
    let session_id = body
        .session_id
        .unwrap_or_else(|| format!("session-{}", Uuid::now_v7()));

    let envelope = WebhookEnvelope::new(session_id.clone(), body.action, body.data);
    let options = DispatchOptions {
        timeout: body.timeout_ms.map(Duration::from_millis),
        mode: body.mode,
    };
    let handle = state.webhook.dispatch(&url, envelope, options).await?;

    // The API has no caller waiting on the channel, so just log the
    // resolution from a background task.
    tokio::spawn(async move {
        match handle.outcome().await {
            Ok(outcome) => {
                tracing::info!(session_id = %session_id, outcome = ?outcome, "webhook session resolved");
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "webhook session cancelled");
            }
        }
    });

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        serde_json::json!({ "status": "submitted" }),
        request_id,
        elapsed,
    )
    .with_link("pending", "/api/v1/webhooks/pending");
    Ok(Json(resp))
}

/// POST /api/v1/webhooks/response - Correlation callback from the automation
/// side.
///
/// Always acknowledges known-shape payloads with 200; responses for unknown
/// or already-resolved sessions are dropped by the correlator.
pub async fn receive_response(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if let Some(expected) = &state.config.webhook.callback_token {
        let provided = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing Authorization header".to_string()))?;
        if !verify_bearer_token(expected, provided) {
            return Err(AppError::Unauthorized("invalid callback token".to_string()));
        }
    }

    let response: WebhookResponse = serde_json::from_value(payload)
        .map_err(|e| AppError::Validation(format!("malformed webhook response: {e}")))?;
    if response.session_id.trim().is_empty() {
        return Err(AppError::Validation("sessionId must not be empty".to_string()));
    }

    let session_id = response.session_id.clone();
    state.webhook.deliver_response(response);

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        serde_json::json!({ "sessionId": session_id, "status": "accepted" }),
        request_id,
        elapsed,
    );
    Ok(Json(resp))
}

/// POST /api/v1/webhooks/test - Stateless reachability check.
pub async fn test_webhook(
    State(state): State<AppState>,
    Json(body): Json<TestRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let reachable = state.webhook.probe(&body.url).await;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(
        serde_json::json!({ "url": body.url, "reachable": reachable }),
        request_id,
        elapsed,
    );
    Ok(Json(resp))
}

/// GET /api/v1/webhooks/pending - Count of sessions awaiting resolution.
pub async fn pending_webhooks(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let count = state.webhook.pending_count();
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(serde_json::json!({ "count": count }), request_id, elapsed);
    Ok(Json(resp))
}

/// DELETE /api/v1/webhooks/pending - Hard abort every pending session.
pub async fn clear_pending(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let cleared = state.webhook.pending_count();
    state.webhook.clear_all();
    tracing::info!(cleared, "pending webhook sessions cleared");
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(serde_json::json!({ "cleared": cleared }), request_id, elapsed);
    Ok(Json(resp))
}

/// Compare a provided `Authorization` value (with or without the `Bearer `
/// prefix) against the configured callback token.
fn verify_bearer_token(expected: &str, provided: &str) -> bool {
    let token = provided.strip_prefix("Bearer ").unwrap_or(provided);
    constant_time_eq(expected.as_bytes(), token.as_bytes())
}

/// Constant-time byte comparison to avoid timing side channels.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_accepts_with_and_without_prefix() {
        assert!(verify_bearer_token("secret", "Bearer secret"));
        assert!(verify_bearer_token("secret", "secret"));
    }

    #[test]
    fn test_bearer_token_rejects_mismatch() {
        assert!(!verify_bearer_token("secret", "Bearer wrong"));
        assert!(!verify_bearer_token("secret", "Bearer secre"));
        assert!(!verify_bearer_token("secret", ""));
    }

    #[test]
    fn test_dispatch_request_defaults() {
        let req: DispatchRequest = serde_json::from_str(r#"{"action":"test"}"#).unwrap();
        assert!(req.url.is_none());
        assert!(req.session_id.is_none());
        assert_eq!(req.mode, DeliveryMode::Auto);
        assert_eq!(req.data, serde_json::Value::Null);
    }
}
