use std::time::Duration;

use thiserror::Error;

/// Failure talking to the profile/interaction store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(sqlx::Error),
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// A store failure classified by what the feed was doing when it happened.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("fetch failed: {0}")]
    Fetch(#[source] StoreError),
    #[error("write failed: {0}")]
    Write(#[source] StoreError),
}
