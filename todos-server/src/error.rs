//! Error types for todos-server

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::DbError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors from startup paths: configuration, setup and the server loop
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(DbError::Sqlx(e))
    }
}
