use thiserror::Error;

/// tgl error types
#[derive(Error, Debug)]
pub enum TglError {
    /// Local SQLite store failed
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A row the caller relied on is absent (e.g. credential before setup)
    #[error("store is missing its {0} record; run 'tgl setup' to rebuild it")]
    MissingRow(&'static str),

    /// Transport-level HTTP failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote service answered with a non-success status
    #[error("remote service rejected the request ({status})")]
    Remote { status: u16, body: String },

    /// A remote rejection reported in the context of a user-facing action
    #[error("{action}. Response: {response}")]
    Rejected {
        action: &'static str,
        response: String,
    },

    /// Menu answer could not be parsed as a number
    #[error("Selection entered was not a valid number.")]
    SelectionNotANumber,

    /// Menu answer is out of range
    #[error("Selection not valid.")]
    InvalidSelection,

    /// Failed to parse a payload or timestamp
    #[error("parse error: {0}")]
    Parse(String),

    /// Interactive prompt failed
    #[error("prompt error: {0}")]
    Prompt(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl TglError {
    /// Attach the user-facing action to a remote rejection, reporting the status code.
    pub fn with_status(self, action: &'static str) -> Self {
        match self {
            TglError::Remote { status, .. } => TglError::Rejected {
                action,
                response: status.to_string(),
            },
            other => other,
        }
    }

    /// Attach the user-facing action to a remote rejection, reporting the response text.
    pub fn with_body(self, action: &'static str) -> Self {
        match self {
            TglError::Remote { body, .. } => TglError::Rejected {
                action,
                response: format!("\"{}\"", body.trim_end_matches('\n')),
            },
            other => other,
        }
    }
}

/// Result type alias for tgl
pub type Result<T> = std::result::Result<T, TglError>;
