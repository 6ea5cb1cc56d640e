//! HTTP server layer
//!
//! Axum server with:
//! - One pooled connection per request (`DbConn` extractor)
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use extractors::DbConn;
pub use server::{build_router, run_server, AppState, ServerConfig};
