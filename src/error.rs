//! Error types for the feature pipeline

use thiserror::Error;

/// Main error type for protloc operations
#[derive(Error, Debug)]
pub enum ProtlocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error at line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("Alphabet violation: symbol '{symbol}' at position {position} ({context})")]
    AlphabetViolation {
        symbol: char,
        position: usize,
        context: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for protloc operations
pub type ProtlocResult<T> = Result<T, ProtlocError>;

impl ProtlocError {
    pub(crate) fn alphabet(symbol: u8, position: usize, context: impl Into<String>) -> Self {
        ProtlocError::AlphabetViolation {
            symbol: symbol as char,
            position,
            context: context.into(),
        }
    }

    /// Attach the offending record's header to alphabet errors
    pub(crate) fn in_record(self, id: &str) -> Self {
        match self {
            ProtlocError::AlphabetViolation {
                symbol,
                position,
                context,
            } => ProtlocError::AlphabetViolation {
                symbol,
                position,
                context: format!("{}, record {}", context, id),
            },
            other => other,
        }
    }
}

impl From<serde_json::Error> for ProtlocError {
    fn from(err: serde_json::Error) -> Self {
        ProtlocError::Serialization(err.to_string())
    }
}
