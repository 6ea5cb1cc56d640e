//! todos-server: HTTP server for a single collection of JSON todo documents
//!
//! Every `/todos` endpoint acquires one pooled connection for the lifetime of
//! the request, issues exactly one statement against the `todos` collection and
//! returns the result as JSON.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;

pub use config::{DbConfig, TODO_COLLECTION, TODO_DB};
pub use error::{Error, Result};
pub use http::{build_router, run_server, AppState, ServerConfig};
