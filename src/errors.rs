use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("directory error: {0}")]
    Directory(String),
    #[error("transfer error: {0}")]
    Io(String),
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("parsing error")]
    Parse,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}
