//! Infrastructure layer for TheCanvas.
//!
//! Contains implementations of the ports defined in `canvas-core`:
//! SQLite-backed state storage and the reqwest webhook transport, plus the
//! configuration loader.

pub mod config;
pub mod http;
pub mod sqlite;
