use crate::db::error::DbError;
use thiserror::Error;

pub type AppResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Input did not pass validation (client error)
    #[error("validation failed: {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// Record already exists (eg: username taken)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Backing store could not be reached
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Infra(#[from] InfraError),

    #[error(transparent)]
    Password(#[from] password_hash::Error),
}

#[derive(Debug, Error)]
pub enum ConfigErrorKind {
    #[error("failed to read file: {0}")]
    Read(std::io::Error),

    #[error("failed to parse file: {0}")]
    Parse(toml::de::Error),

    #[error("missing environment variable: {0}")]
    MissingEnv(String),

    #[error("invalid environment variable {0}: {1}")]
    InvalidEnv(String, String),
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: std::path::PathBuf,
        #[source]
        source: ConfigErrorKind,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
