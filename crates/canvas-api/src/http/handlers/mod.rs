//! REST API request handlers.

pub mod block;
pub mod project;
pub mod webhook;
