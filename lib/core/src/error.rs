use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No usable numeric features after schema resolution")]
    NoFeatures,

    #[error("Song not found: {0}")]
    SongNotFound(String),

    #[error("Catalog is empty")]
    EmptyCatalog,

    #[error("Duplicate song id: {0}")]
    DuplicateSong(String),

    #[error("Invalid recommendation count: {0} (must be at least 1)")]
    InvalidCount(usize),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Row index {index} out of range for catalog of {len} songs")]
    RowOutOfRange { index: usize, len: usize },

    #[error("Load error: {0}")]
    Load(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Errors caused by what the caller asked for, as opposed to system faults
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::SongNotFound(_) | Error::InvalidCount(_) | Error::InvalidConfig(_)
        )
    }
}
