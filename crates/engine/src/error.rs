use std::io;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store is not ready yet")]
    NotReady,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<bincode::error::EncodeError> for StoreError {
    fn from(e: bincode::error::EncodeError) -> Self {
        StoreError::Codec(e.to_string())
    }
}

impl From<bincode::error::DecodeError> for StoreError {
    fn from(e: bincode::error::DecodeError) -> Self {
        StoreError::Codec(e.to_string())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
