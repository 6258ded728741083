//! Outbound webhook dispatch and response correlation.
//!
//! The correlator tracks every dispatched session in two process-wide maps
//! (pending requests and outcome senders) and guarantees that each session
//! resolves exactly once: inline from the HTTP reply, out of band via
//! [`service::WebhookService::deliver_response`], or by timeout.

pub mod service;
pub mod transport;

pub use service::{DispatchOptions, SessionHandle, WebhookService, DEFAULT_TIMEOUT};
pub use transport::{TransportReply, WebhookTransport};
