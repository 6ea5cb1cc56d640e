//! Database configuration - connection settings and environment loading
//!
//! Configuration is loaded from environment variables:
//! - `DB_HOST`: database host (default: localhost)
//! - `DB_PORT`: database port (default: 5432)
//! - `DB_USER`: role to connect as (default: postgres)
//! - `DB_PASSWORD`: password (default: none)
//!
//! The database and collection names are fixed.

use sqlx::postgres::PgConnectOptions;

/// Database holding the todo collection
pub const TODO_DB: &str = "todoapp";

/// Collection (table) holding todo documents
pub const TODO_COLLECTION: &str = "todos";

/// Database the setup connection uses before `TODO_DB` exists
pub const MAINTENANCE_DB: &str = "postgres";

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_USER: &str = "postgres";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var} value '{value}': expected a port number")]
    InvalidPort { var: &'static str, value: String },
}

/// Connection settings for the todo database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
}

impl DbConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup (for testing)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values fall back to defaults, same as unset ones
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("DB_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort {
                    var: "DB_PORT",
                    value: raw,
                })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: var("DB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            user: var("DB_USER").unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: var("DB_PASSWORD"),
        })
    }

    /// Connect options for the todo database itself
    pub fn connect_options(&self) -> PgConnectOptions {
        self.connect_options_for(TODO_DB)
    }

    /// Connect options for the maintenance database, used to create `TODO_DB`
    pub fn maintenance_options(&self) -> PgConnectOptions {
        self.connect_options_for(MAINTENANCE_DB)
    }

    fn connect_options_for(&self, database: &str) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(database);

        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: None,
        }
    }
}
