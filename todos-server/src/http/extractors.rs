//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sqlx::pool::PoolConnection;
use sqlx::Postgres;

use super::error::ApiError;
use super::server::AppState;

/// A pooled connection scoped to one request.
///
/// Acquired before the handler body runs and returned to the pool when the
/// extractor is dropped, on success, on error and when the request future is
/// cancelled alike.
pub struct DbConn(pub PoolConnection<Postgres>);

impl FromRequestParts<Arc<AppState>> for DbConn {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let conn = state.pool.acquire().await.map_err(|e| {
            tracing::warn!("No database connection could be established: {}", e);
            ApiError::Unavailable
        })?;

        Ok(Self(conn))
    }
}
