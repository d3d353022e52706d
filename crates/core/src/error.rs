use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Engine-level failures that are not user interactions to reject.
/// Bad wire data lands here; interaction rejects carry their own types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid schedule entry: {0}")]
    InvalidEntry(String),
    #[error("{0}")]
    Message(String),
}

impl CoreError {
    pub fn invalid_entry(message: impl Into<String>) -> Self {
        Self::InvalidEntry(message.into())
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}
