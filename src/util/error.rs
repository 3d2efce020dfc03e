//! Error types for the scene description layer.

use thiserror::Error;

/// Main error type for ueberman operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Operation needs a defined element type
    #[error("Element type is undefined")]
    UndefinedType,

    /// Buffer kind does not fit the requested element type
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Buffer length is not a whole number of elements
    #[error("Size mismatch: expected a multiple of {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Element index out of bounds
    #[error("Element index {index} out of bounds (count: {count})")]
    IndexOutOfBounds { index: usize, count: usize },

    /// Scene context handle is not open
    #[error("Unknown scene context: {0}")]
    UnknownContext(u64),

    /// Look name was already defined in this session
    #[error("Look already defined: {0}")]
    LookAlreadyDefined(String),

    /// `end_look` without a matching `begin_look`
    #[error("No look block is open")]
    NoOpenLook,

    /// Invalid value passed by the caller
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid value error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }
}

/// Result type alias for ueberman operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::LookAlreadyDefined("chrome".into());
        assert!(e.to_string().contains("chrome"));

        let e = Error::IndexOutOfBounds { index: 5, count: 3 };
        assert!(e.to_string().contains("5"));
        assert!(e.to_string().contains("3"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
