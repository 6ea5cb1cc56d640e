//! Database connection pool management
//!
//! The pool connects lazily: the server starts even when the database is down,
//! and each request that cannot get a connection is answered with 503.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DbConfig;

/// Default maximum connections for the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a request waits for a connection before giving up.
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a PostgreSQL connection pool for the todo database.
///
/// No connection is opened until the first request needs one.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&DbConfig::from_env()?);
/// ```
pub fn create_pool(config: &DbConfig) -> PgPool {
    create_pool_with_options(config, DEFAULT_MAX_CONNECTIONS, DEFAULT_ACQUIRE_TIMEOUT)
}

/// Create a PostgreSQL connection pool with custom options.
///
/// # Arguments
///
/// * `config` - Connection settings
/// * `max_connections` - Maximum number of connections in the pool
/// * `acquire_timeout` - Upper bound on waiting for a connection
pub fn create_pool_with_options(
    config: &DbConfig,
    max_connections: u32,
    acquire_timeout: Duration,
) -> PgPool {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect_lazy_with(config.connect_options())
}
