use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorepError {
    #[error("Invalid input in {source_name}: {details}")]
    InvalidInput {
        source_name: String,
        details: String,
    },

    #[error("Invalid mapping table: {0}")]
    InvalidMapping(String),

    #[error("Invalid reporting date {0}: expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CorepError {
    pub fn invalid_input(source_name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidInput {
            source_name: source_name.into(),
            details: details.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CorepError>;
