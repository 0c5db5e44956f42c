use deadpool_postgres::{BuildError, PoolError};
use std::path::PathBuf;
use thiserror::Error;

// DbError is the lowest level error type, wrapping errors from the storage layer (postgres or the
// file system). It does not wrap any higher level errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Unique constraint violation
    #[error("unique violation")]
    UniqueViolation,

    /// Store root could not be accessed at all
    #[error("store unavailable at {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store root exists but is not a directory
    #[error("store root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Pg(#[from] tokio_postgres::Error),

    #[error(transparent)]
    Migrate(#[from] refinery::Error),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DbError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DbError::Unavailable {
            path: path.into(),
            source,
        }
    }
}
