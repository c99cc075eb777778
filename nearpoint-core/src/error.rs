//! Error types for nearpoint

use thiserror::Error;

/// Main error type for nearpoint operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unreadable mesh: {0}")]
    UnreadableMesh(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported strategy '{0}', expected one of: closest_point_pv, kd_tree_scipy, reference")]
    UnsupportedStrategy(String),

    #[error("Point set is empty")]
    EmptyPointSet,

    #[error("Invalid query point: {0}")]
    InvalidQueryPoint(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Visualization error: {0}")]
    Visualization(String),
}

impl Error {
    /// True for failures of the display layer rather than of loading or searching
    pub fn is_visualization(&self) -> bool {
        matches!(self, Error::Visualization(_))
    }
}

/// Result type alias for nearpoint operations
pub type Result<T> = std::result::Result<T, Error>;
