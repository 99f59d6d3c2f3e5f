use thiserror::Error;

use crate::domain::BlockId;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid file id {0:?}")]
    InvalidFileId(String),

    #[error("file {0} not found")]
    FileNotFound(String),

    #[error("{block} for file {file_id} not found")]
    BlockNotFound { file_id: String, block: BlockId },

    #[error("config error: {0}")]
    Config(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, StageError>;
