//! API error types mapping service errors to HTTP status codes.

use axum::response::{IntoResponse, Response};
use canvas_types::error::{StoreError, WebhookError};

use super::response::ApiResponse;

/// Application-level API error, converted from service errors at handler
/// boundaries via `?`.
#[derive(Debug)]
pub enum AppError {
    Store(StoreError),
    Webhook(WebhookError),
    Validation(String),
    Unauthorized(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<WebhookError> for AppError {
    fn from(err: WebhookError) -> Self {
        Self::Webhook(err)
    }
}

impl AppError {
    fn code_and_message(&self) -> (&'static str, String) {
        match self {
            Self::Store(StoreError::NotFound) => ("NOT_FOUND", "entity not found".to_string()),
            Self::Store(err) => ("STORE_ERROR", err.to_string()),
            Self::Webhook(err @ (WebhookError::InvalidUrl(_) | WebhookError::DuplicateSession(_))) => {
                ("VALIDATION_ERROR", err.to_string())
            }
            Self::Webhook(err) => ("WEBHOOK_ERROR", err.to_string()),
            Self::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            Self::Unauthorized(msg) => ("UNAUTHORIZED", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = self.code_and_message();
        let request_id = uuid::Uuid::now_v7().to_string();
        ApiResponse::error(code, &message, request_id).into_response()
    }
}
