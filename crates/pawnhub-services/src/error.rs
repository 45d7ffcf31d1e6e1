use thiserror::Error;

/// Failures surfaced by the service layer. None of them are fatal; callers
/// report them and the user can retry.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No user signed in")]
    Unauthenticated,

    #[error("Not allowed")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
