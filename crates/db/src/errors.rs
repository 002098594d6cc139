use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DbError {
    /// The underlying store refused or failed the write.
    #[error("tracker store write failed: {0}")]
    WriteFailed(String),

    /// The underlying store failed to read.
    #[error("tracker store read failed: {0}")]
    ReadFailed(String),
}

pub type DbResult<T> = Result<T, DbError>;
