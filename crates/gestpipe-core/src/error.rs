use thiserror::Error;

/// Failure reported by a remote collaborator (conflict check, batch upload, predictor).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    #[error("Transport Error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed Response: {0}")]
    Decode(String),
}

impl CollaboratorError {
    /// Server-provided text when there is one.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            CollaboratorError::Rejected { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum GestError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Unknown gesture '{0}'")]
    UnknownGesture(String),

    #[error("Busy: {0}")]
    Busy(&'static str),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

pub type GpResult<T> = Result<T, GestError>;
