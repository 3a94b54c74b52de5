use thiserror::Error;

/// Failures that end a run. Everything here maps to a nonzero exit code.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("all {0} feed sources failed")]
    FeedsUnavailable(usize),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("notification failed for {id}: {reason}")]
    Notification { id: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
