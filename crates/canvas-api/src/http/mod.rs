//! HTTP/REST API layer for TheCanvas.
//!
//! Axum-based REST API at `/api/v1/` with envelope response format and CORS
//! support. The inbound webhook-response endpoint is the correlation
//! callback the automation side (n8n) posts to.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
