use thiserror::Error;

/// A record field rejected at the store boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Validation failed for field '{field}': {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: &str) -> Self {
        Self::new(field, "must not be empty")
    }
}

/// Malformed import document. The store is left untouched when this is returned.
#[derive(Error, Debug)]
#[error("Import rejected: {0}")]
pub struct ImportError(#[from] pub serde_json::Error);

#[derive(Error, Debug)]
pub enum LexdeskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Persisted snapshot is unreadable: {0}")]
    CorruptSnapshot(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid payload for '{command}': {message}")]
    InvalidPayload { command: String, message: String },

    #[error("Invalid item type: {0}")]
    InvalidItemType(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<rusqlite::Error> for LexdeskError {
    fn from(e: rusqlite::Error) -> Self {
        LexdeskError::Storage(format!("SQLite error: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, LexdeskError>;
