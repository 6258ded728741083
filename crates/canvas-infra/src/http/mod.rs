//! Outbound HTTP.

pub mod transport;
