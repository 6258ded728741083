//! The webhook request/response correlator.
//!
//! [`WebhookService`] owns two maps sharing the session-id key space:
//!
//! - `pending`: one entry per in-flight session, holding the timeout timer's
//!   cancellation token. Created on dispatch, removed on resolution.
//! - `handlers`: the oneshot sender that carries the session's
//!   [`WebhookOutcome`] to whoever holds the [`SessionHandle`].
//!
//! Removing the pending entry (`DashMap::remove` is atomic) is the single
//! claim point for resolution, so each session resolves at most once no
//! matter which of the four paths -- inline success, inline error,
//! out-of-band delivery, timeout -- gets there first.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use canvas_types::error::WebhookError;
use canvas_types::webhook::{action, DeliveryMode, WebhookEnvelope, WebhookOutcome, WebhookResponse};

use super::transport::WebhookTransport;

/// Default resolution window for a dispatched session.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-dispatch knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    /// Resolution window override; falls back to the service default.
    pub timeout: Option<Duration>,
    /// How the session is expected to resolve (see [`DeliveryMode`]).
    pub mode: DeliveryMode,
}

/// A dispatched session awaiting its exactly-once outcome.
pub struct SessionHandle {
    session_id: String,
    rx: oneshot::Receiver<WebhookOutcome>,
}

impl SessionHandle {
    /// The caller-chosen correlation key for this session.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Await the session's resolution.
    ///
    /// Returns `Err(WebhookError::Cancelled)` if the service was cleared
    /// (hard abort) before the session resolved.
    pub async fn outcome(self) -> Result<WebhookOutcome, WebhookError> {
        self.rx.await.map_err(|_| WebhookError::Cancelled)
    }
}

struct PendingEntry {
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
    cancel: CancellationToken,
}

struct Inner<T> {
    transport: T,
    default_timeout: Duration,
    pending: DashMap<String, PendingEntry>,
    handlers: DashMap<String, oneshot::Sender<WebhookOutcome>>,
}

impl<T> Inner<T> {
    /// Claim and resolve a session. Returns false if it was already
    /// resolved (or never dispatched) -- late arrivals are no-ops.
    fn resolve(&self, session_id: &str, outcome: WebhookOutcome) -> bool {
        let Some((_, entry)) = self.pending.remove(session_id) else {
            return false;
        };
        entry.cancel.cancel();
        if let Some((_, tx)) = self.handlers.remove(session_id) {
            // The receiver may have been dropped; that just means nobody
            // is listening for this session anymore.
            let _ = tx.send(outcome);
        }
        true
    }
}

/// Destination-agnostic webhook dispatcher and response correlator.
///
/// Cloning is cheap and shares the underlying maps, mirroring the
/// process-wide service the source exposed as a module singleton.
pub struct WebhookService<T: WebhookTransport> {
    inner: Arc<Inner<T>>,
}

impl<T: WebhookTransport> Clone for WebhookService<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: WebhookTransport + 'static> WebhookService<T> {
    /// Create a service with the 30-second default timeout.
    pub fn new(transport: T) -> Self {
        Self::with_default_timeout(transport, DEFAULT_TIMEOUT)
    }

    /// Create a service with a custom default timeout.
    pub fn with_default_timeout(transport: T, default_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                default_timeout,
                pending: DashMap::new(),
                handlers: DashMap::new(),
            }),
        }
    }

    /// Dispatch an envelope to `url` and register the session for
    /// correlation.
    ///
    /// Registration failures (malformed URL, session id already in flight)
    /// return `Err` without side effects. Everything after registration --
    /// transport failure, non-2xx status, inline JSON response, timeout --
    /// resolves through the returned handle's outcome channel instead.
    pub async fn dispatch(
        &self,
        url: &str,
        envelope: WebhookEnvelope,
        options: DispatchOptions,
    ) -> Result<SessionHandle, WebhookError> {
        // Absolute http(s) URL with a host; "http://" alone parses as an
        // empty-host error and is rejected here rather than at send time.
        let parsed =
            url::Url::parse(url).map_err(|_| WebhookError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(WebhookError::InvalidUrl(url.to_string()));
        }
        let body = serde_json::to_value(&envelope)
            .map_err(|e| WebhookError::Transport(e.to_string()))?;

        let session_id = envelope.session_id.clone();
        let timeout = options.timeout.unwrap_or(self.inner.default_timeout);
        let cancel = CancellationToken::new();

        // At most one pending request per session id.
        match self.inner.pending.entry(session_id.clone()) {
            dashmap::Entry::Occupied(_) => {
                return Err(WebhookError::DuplicateSession(session_id));
            }
            dashmap::Entry::Vacant(slot) => {
                slot.insert(PendingEntry {
                    created_at: Utc::now(),
                    cancel: cancel.clone(),
                });
            }
        }
        let (tx, rx) = oneshot::channel();
        self.inner.handlers.insert(session_id.clone(), tx);

        // Timeout guard: exactly one timer per dispatch. Resolution cancels
        // the token, so a claimed session never sees a stale late fire.
        let inner = Arc::clone(&self.inner);
        let timer_session = session_id.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    if inner.resolve(&timer_session, WebhookOutcome::Timeout) {
                        tracing::warn!(session_id = %timer_session, "webhook timeout");
                    }
                }
            }
        });

        tracing::debug!(
            session_id = %session_id,
            action = %envelope.action,
            url,
            mode = ?options.mode,
            "sending webhook request"
        );

        match self.inner.transport.post_json(url, &body).await {
            Err(e) => {
                let message = e.to_string();
                tracing::error!(session_id = %session_id, error = %message, "webhook send failed");
                self.inner.resolve(&session_id, WebhookOutcome::Error(message));
            }
            Ok(reply) if !reply.is_success() => {
                let message = format!("HTTP {}: {}", reply.status, reply.body);
                tracing::error!(session_id = %session_id, error = %message, "webhook rejected");
                self.inner.resolve(&session_id, WebhookOutcome::Error(message));
            }
            Ok(reply) => match options.mode {
                DeliveryMode::Deferred => {
                    tracing::debug!(session_id = %session_id, "deferred session awaiting out-of-band delivery");
                }
                mode => match serde_json::from_str::<serde_json::Value>(&reply.body) {
                    Ok(data) => {
                        self.inner.resolve(
                            &session_id,
                            WebhookOutcome::Success(WebhookResponse {
                                session_id: session_id.clone(),
                                success: true,
                                data: Some(data),
                                error: None,
                                timestamp: Some(Utc::now()),
                            }),
                        );
                    }
                    Err(_) if mode == DeliveryMode::Inline => {
                        self.inner.resolve(
                            &session_id,
                            WebhookOutcome::Error(
                                "inline delivery expected a JSON response body".to_string(),
                            ),
                        );
                    }
                    Err(_) => {
                        tracing::debug!(
                            session_id = %session_id,
                            "non-JSON reply, awaiting out-of-band delivery"
                        );
                    }
                },
            },
        }

        Ok(SessionHandle { session_id, rx })
    }

    /// Deliver an out-of-band response from the automation side.
    ///
    /// A response for an unknown or already-resolved session is silently
    /// dropped -- duplicates and post-timeout stragglers are expected.
    pub fn deliver_response(&self, response: WebhookResponse) {
        let session_id = response.session_id.clone();
        if self.inner.resolve(&session_id, WebhookOutcome::Success(response)) {
            tracing::debug!(session_id = %session_id, "webhook response delivered");
        } else {
            tracing::debug!(session_id = %session_id, "response for unknown session dropped");
        }
    }

    /// Number of sessions still awaiting resolution.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    /// Hard abort: cancel every outstanding timer and drop every registered
    /// outcome sender without resolving it. Handle holders observe
    /// [`WebhookError::Cancelled`].
    pub fn clear_all(&self) {
        for entry in self.inner.pending.iter() {
            entry.value().cancel.cancel();
        }
        self.inner.pending.clear();
        self.inner.handlers.clear();
    }

    /// Stateless reachability check: POST a synthetic test envelope and
    /// report whether the destination answered 2xx. No correlation
    /// bookkeeping is involved.
    pub async fn probe(&self, url: &str) -> bool {
        let envelope = WebhookEnvelope::new(
            format!("test-{}", Utc::now().timestamp_millis()),
            action::TEST,
            serde_json::json!({ "message": "Webhook connectivity test" }),
        );
        let Ok(body) = serde_json::to_value(&envelope) else {
            return false;
        };
        match self.inner.transport.post_json(url, &body).await {
            Ok(reply) => reply.is_success(),
            Err(e) => {
                tracing::warn!(url, error = %e, "webhook connectivity test failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::transport::TransportReply;

    /// Transport that always answers with a fixed status and body.
    #[derive(Clone)]
    struct ReplyTransport {
        status: u16,
        body: &'static str,
    }

    impl WebhookTransport for ReplyTransport {
        async fn post_json(
            &self,
            _url: &str,
            _body: &serde_json::Value,
        ) -> Result<TransportReply, WebhookError> {
            Ok(TransportReply {
                status: self.status,
                body: self.body.to_string(),
            })
        }
    }

    /// Transport that fails at the network level.
    struct FailingTransport;

    impl WebhookTransport for FailingTransport {
        async fn post_json(
            &self,
            _url: &str,
            _body: &serde_json::Value,
        ) -> Result<TransportReply, WebhookError> {
            Err(WebhookError::Transport("connection refused".to_string()))
        }
    }

    fn envelope(session_id: &str) -> WebhookEnvelope {
        WebhookEnvelope::new(session_id, "generate-project-attributes", serde_json::json!({}))
    }

    #[tokio::test]
    async fn inline_json_response_resolves_success() {
        let service = WebhookService::new(ReplyTransport {
            status: 200,
            body: r#"{"result":"ok"}"#,
        });

        let handle = service
            .dispatch("https://n8n.local/hook", envelope("s1"), DispatchOptions::default())
            .await
            .unwrap();

        // Resolved inline, no waiting on the timeout.
        match handle.outcome().await.unwrap() {
            WebhookOutcome::Success(response) => {
                assert_eq!(response.session_id, "s1");
                assert!(response.success);
                assert_eq!(response.data, Some(serde_json::json!({"result": "ok"})));
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(service.pending_count(), 0);
    }

    #[tokio::test]
    async fn http_error_resolves_error_with_status_and_body() {
        let service = WebhookService::new(ReplyTransport {
            status: 500,
            body: "server error",
        });

        let handle = service
            .dispatch("https://n8n.local/hook", envelope("s1"), DispatchOptions::default())
            .await
            .unwrap();

        assert_eq!(
            handle.outcome().await.unwrap(),
            WebhookOutcome::Error("HTTP 500: server error".to_string())
        );
        assert_eq!(service.pending_count(), 0);
    }

    #[tokio::test]
    async fn transport_failure_resolves_error() {
        let service = WebhookService::new(FailingTransport);

        let handle = service
            .dispatch("https://n8n.local/hook", envelope("s1"), DispatchOptions::default())
            .await
            .unwrap();

        match handle.outcome().await.unwrap() {
            WebhookOutcome::Error(message) => assert!(message.contains("connection refused")),
            other => panic!("expected error, got {other:?}"),
        }
        assert_eq!(service.pending_count(), 0);
    }

    #[tokio::test]
    async fn non_json_body_stays_pending_until_out_of_band_delivery() {
        // n8n acknowledges with plain text when the flow answers later.
        let service = WebhookService::new(ReplyTransport {
            status: 200,
            body: "Workflow was started",
        });

        let handle = service
            .dispatch("https://n8n.local/hook", envelope("s1"), DispatchOptions::default())
            .await
            .unwrap();
        assert_eq!(service.pending_count(), 1);

        service.deliver_response(WebhookResponse {
            session_id: "s1".to_string(),
            success: true,
            data: Some(serde_json::json!({"x": 1})),
            error: None,
            timestamp: None,
        });

        match handle.outcome().await.unwrap() {
            WebhookOutcome::Success(response) => {
                assert_eq!(response.data, Some(serde_json::json!({"x": 1})));
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(service.pending_count(), 0);
    }

    #[tokio::test]
    async fn deferred_mode_ignores_json_body() {
        let service = WebhookService::new(ReplyTransport {
            status: 200,
            body: r#"{"result":"ok"}"#,
        });

        let _handle = service
            .dispatch(
                "https://n8n.local/hook",
                envelope("s1"),
                DispatchOptions {
                    mode: DeliveryMode::Deferred,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(service.pending_count(), 1);
    }

    #[tokio::test]
    async fn inline_mode_rejects_non_json_body() {
        let service = WebhookService::new(ReplyTransport {
            status: 200,
            body: "Workflow was started",
        });

        let handle = service
            .dispatch(
                "https://n8n.local/hook",
                envelope("s1"),
                DispatchOptions {
                    mode: DeliveryMode::Inline,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        match handle.outcome().await.unwrap() {
            WebhookOutcome::Error(message) => assert!(message.contains("JSON")),
            other => panic!("expected error, got {other:?}"),
        }
        assert_eq!(service.pending_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_session_id_is_rejected() {
        let service = WebhookService::new(ReplyTransport {
            status: 200,
            body: "accepted",
        });

        let _first = service
            .dispatch("https://n8n.local/hook", envelope("s1"), DispatchOptions::default())
            .await
            .unwrap();
        assert_eq!(service.pending_count(), 1);

        let second = service
            .dispatch("https://n8n.local/hook", envelope("s1"), DispatchOptions::default())
            .await;
        assert!(matches!(second, Err(WebhookError::DuplicateSession(_))));
        assert_eq!(service.pending_count(), 1);
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_without_side_effects() {
        let service = WebhookService::new(ReplyTransport { status: 200, body: "" });

        for bad in ["not a url", "http://", "https://", "ftp://n8n.local/hook", ""] {
            let result = service
                .dispatch(bad, envelope("s1"), DispatchOptions::default())
                .await;
            assert!(
                matches!(result, Err(WebhookError::InvalidUrl(_))),
                "expected invalid url for {bad:?}"
            );
        }
        assert_eq!(service.pending_count(), 0);
    }

    #[tokio::test]
    async fn timeout_fires_when_nothing_arrives() {
        let service = WebhookService::new(ReplyTransport {
            status: 200,
            body: "accepted",
        });

        let handle = service
            .dispatch(
                "https://n8n.local/hook",
                envelope("s1"),
                DispatchOptions {
                    timeout: Some(Duration::from_millis(100)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(handle.outcome().await.unwrap(), WebhookOutcome::Timeout);
        assert_eq!(service.pending_count(), 0);
    }

    #[tokio::test]
    async fn delivery_after_timeout_is_a_no_op() {
        let service = WebhookService::new(ReplyTransport {
            status: 200,
            body: "accepted",
        });

        let handle = service
            .dispatch(
                "https://n8n.local/hook",
                envelope("s1"),
                DispatchOptions {
                    timeout: Some(Duration::from_millis(50)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(handle.outcome().await.unwrap(), WebhookOutcome::Timeout);

        service.deliver_response(WebhookResponse {
            session_id: "s1".to_string(),
            success: true,
            data: None,
            error: None,
            timestamp: None,
        });
        assert_eq!(service.pending_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_delivery_resolves_at_most_once() {
        let service = WebhookService::new(ReplyTransport {
            status: 200,
            body: "accepted",
        });

        let handle = service
            .dispatch("https://n8n.local/hook", envelope("s1"), DispatchOptions::default())
            .await
            .unwrap();

        let response = WebhookResponse {
            session_id: "s1".to_string(),
            success: true,
            data: Some(serde_json::json!({"first": true})),
            error: None,
            timestamp: None,
        };
        service.deliver_response(response.clone());
        service.deliver_response(response);

        // The single buffered outcome is the first delivery; a second
        // delivery had nowhere to go.
        assert!(matches!(
            handle.outcome().await.unwrap(),
            WebhookOutcome::Success(_)
        ));
        assert_eq!(service.pending_count(), 0);
    }

    #[tokio::test]
    async fn clear_all_cancels_timers_and_drops_handlers() {
        let service = WebhookService::new(ReplyTransport {
            status: 200,
            body: "accepted",
        });

        let handle = service
            .dispatch(
                "https://n8n.local/hook",
                envelope("s1"),
                DispatchOptions {
                    timeout: Some(Duration::from_millis(50)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(service.pending_count(), 1);

        service.clear_all();
        assert_eq!(service.pending_count(), 0);

        // Wait out the original timeout window: the cancelled timer must
        // not deliver anything, so the handle observes the hard abort.
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(matches!(handle.outcome().await, Err(WebhookError::Cancelled)));
    }

    #[tokio::test]
    async fn timeout_racing_delivery_resolves_exactly_once() {
        // Deliberately tight timeout so delivery and the timer race; every
        // iteration must yield exactly one outcome and drain the maps.
        let service = WebhookService::new(ReplyTransport {
            status: 200,
            body: "accepted",
        });

        for i in 0..200 {
            let session = format!("race-{i}");
            let handle = service
                .dispatch(
                    "https://n8n.local/hook",
                    envelope(&session),
                    DispatchOptions {
                        timeout: Some(Duration::from_millis(1)),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();

            service.deliver_response(WebhookResponse {
                session_id: session,
                success: true,
                data: None,
                error: None,
                timestamp: None,
            });

            match handle.outcome().await.unwrap() {
                WebhookOutcome::Success(_) | WebhookOutcome::Timeout => {}
                other => panic!("unexpected outcome {other:?}"),
            }
            assert_eq!(service.pending_count(), 0);
        }
    }

    #[tokio::test]
    async fn probe_reports_reachability() {
        let reachable = WebhookService::new(ReplyTransport { status: 200, body: "ok" });
        assert!(reachable.probe("https://n8n.local/hook").await);
        assert_eq!(reachable.pending_count(), 0);

        let broken = WebhookService::new(ReplyTransport { status: 503, body: "down" });
        assert!(!broken.probe("https://n8n.local/hook").await);

        let dead = WebhookService::new(FailingTransport);
        assert!(!dead.probe("https://n8n.local/hook").await);
    }
}
