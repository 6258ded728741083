use thiserror::Error;

/// Errors from the webhook dispatch and correlation layer.
///
/// Only registration-time failures surface as `Err` from `dispatch`;
/// transport and HTTP failures resolve the session through its outcome
/// channel instead, so nothing is thrown across the async boundary.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid webhook url: '{0}'")]
    InvalidUrl(String),

    #[error("session '{0}' already has a request in flight")]
    DuplicateSession(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("session cancelled before resolution")]
    Cancelled,
}

/// Errors from the project/block store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entity not found")]
    NotFound,

    #[error("backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_error_display() {
        let err = WebhookError::DuplicateSession("abc-123".to_string());
        assert_eq!(
            err.to_string(),
            "session 'abc-123' already has a request in flight"
        );
    }

    #[test]
    fn test_transport_error_display() {
        let err = WebhookError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Serialization("unexpected EOF".to_string());
        assert_eq!(err.to_string(), "serialization error: unexpected EOF");
    }
}
