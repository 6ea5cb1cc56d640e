//! Database layer - connection pool, collection setup and the todo repository
//!
//! # Design Principles
//!
//! - Connection pool, one connection checked out per request
//! - Every repository method is exactly one statement
//! - Writes against a missing id report counters, never an error

pub mod pool;
pub mod repos;
pub mod setup;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
pub use setup::SetupOutcome;
