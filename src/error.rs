use crate::types::Connotation;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status} for {url}")]
    FetchStatus { status: u16, url: String },

    #[error("Input unavailable: {0}")]
    InputUnavailable(String),

    #[error("Row {row}: invalid field '{field}': {reason}")]
    InvalidRecord {
        row: usize,
        field: &'static str,
        reason: String,
    },

    #[error("Row {row}: invalid year {value}")]
    InvalidYear { row: usize, value: String },

    #[error("Row {row}: duplicate id {id}")]
    DuplicateId { row: usize, id: i64 },

    #[error("Initiative {id} is already classified as {existing}, refusing to add it as {requested}")]
    ConflictingClassification {
        id: i64,
        existing: Connotation,
        requested: Connotation,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Operator input closed")]
    PromptClosed,
}

impl Error {
    /// True for errors raised while validating individual records, as opposed
    /// to errors reading or decoding the dataset as a whole.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidRecord { .. } | Error::InvalidYear { .. } | Error::DuplicateId { .. }
        )
    }
}
