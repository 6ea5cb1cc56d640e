//! Repository implementations for database access
//!
//! Repositories borrow a single connection rather than the pool, so the
//! connection a handler was given is the one every statement runs on.

pub mod todos;

pub use todos::TodoRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}
