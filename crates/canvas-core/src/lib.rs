//! Business logic and port definitions for TheCanvas.
//!
//! This crate defines the "ports" (the `WebhookTransport` and `StateStore`
//! traits) that the infrastructure layer implements. It depends only on
//! `canvas-types` -- never on `canvas-infra` or any network/database crate.

pub mod agent;
pub mod store;
pub mod webhook;
