//! SQLite persistence.

pub mod pool;
pub mod state;
