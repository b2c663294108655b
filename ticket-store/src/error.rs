use thiserror::Error;

/// Errors surfaced by ticket repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ticket not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}
