//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur while decoding a mesh file
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        IoError::ParseError {
            message: message.into(),
        }
    }
}

impl From<IoError> for nearpoint_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::FileNotFound { path } => nearpoint_core::Error::FileNotFound(path),
            IoError::InvalidFormat { format } => {
                nearpoint_core::Error::UnreadableMesh(format!("invalid file format: {}", format))
            }
            IoError::ParseError { message } => nearpoint_core::Error::UnreadableMesh(message),
            IoError::Io(e) => nearpoint_core::Error::UnreadableMesh(e.to_string()),
        }
    }
}
