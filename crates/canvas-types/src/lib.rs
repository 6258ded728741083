//! Shared domain types for TheCanvas.
//!
//! This crate contains the core domain types used across the workspace:
//! Project, Block, the webhook wire format, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.
//!
//! Wire and persisted types serialize with `camelCase` field names and
//! millisecond epoch timestamps so stored blobs and outbound webhook bodies
//! stay compatible with the layout the n8n side already understands.

pub mod block;
pub mod config;
pub mod error;
pub mod project;
pub mod webhook;
