use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Classifier has not been trained or loaded")]
    ModelNotTrained,

    #[error("Unsupported model format version {found} (expected {expected})")]
    ModelVersion { found: u32, expected: u32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Errors caused by the caller's input rather than by the environment.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::ModelNotTrained)
    }
}
