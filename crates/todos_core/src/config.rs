//! Environment-driven configuration for picking and opening a store.
//!
//! # Responsibility
//! - Decide between the production database and the fixed local database.
//! - Decide which backend the application layer should hold.
//! - Carry pool and logging settings.
//!
//! # Invariants
//! - Production requires `DATABASE_URL`; there is no silent fallback.
//! - Parsing never touches the filesystem; opening is a separate step.

use crate::db::PoolConfig;
use crate::logging::{default_log_level, normalize_level};
use crate::repo::sqlite_store::SqliteStore;
use crate::repo::store::StoreResult;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Database file used outside production.
pub const LOCAL_DATABASE_PATH: &str = "todos.sqlite3";

pub const ENV_ENVIRONMENT: &str = "TODOS_ENV";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_BACKEND: &str = "TODOS_BACKEND";
pub const ENV_POOL_SIZE: &str = "TODOS_POOL_SIZE";
pub const ENV_LOG_LEVEL: &str = "TODOS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TODOS_LOG_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Which `TodoStore` implementation the application should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Database,
    Session,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVar(key) => write!(f, "missing required environment variable `{key}`"),
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for environment variable `{key}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Resolved configuration for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub environment: Environment,
    pub backend: Backend,
    pub database_path: PathBuf,
    pub pool: PoolConfig,
    pub log_level: &'static str,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let environment = match read(ENV_ENVIRONMENT).as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let database_path = match environment {
            Environment::Production => {
                let url = read(ENV_DATABASE_URL).ok_or(ConfigError::MissingVar(ENV_DATABASE_URL))?;
                PathBuf::from(strip_sqlite_scheme(&url))
            }
            Environment::Development => PathBuf::from(LOCAL_DATABASE_PATH),
        };

        let backend = match read(ENV_BACKEND).as_deref() {
            None | Some("database") => Backend::Database,
            Some("session") => Backend::Session,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: ENV_BACKEND,
                    value: other.to_string(),
                })
            }
        };

        let mut pool = PoolConfig::default();
        if let Some(raw) = read(ENV_POOL_SIZE) {
            pool.max_size = raw
                .parse::<u32>()
                .ok()
                .filter(|size| *size >= 1)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_POOL_SIZE,
                    value: raw,
                })?;
        }

        let log_level = match read(ENV_LOG_LEVEL) {
            Some(raw) => normalize_level(&raw).ok_or(ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                value: raw,
            })?,
            None => default_log_level(),
        };

        Ok(Self {
            environment,
            backend,
            database_path,
            pool,
            log_level,
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        })
    }

    /// Opens the durable store this configuration points at.
    pub fn open_database(&self) -> StoreResult<SqliteStore> {
        SqliteStore::open(&self.database_path, &self.pool)
    }
}

fn strip_sqlite_scheme(url: &str) -> &str {
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url)
}
