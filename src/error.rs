//! Error types for fixture loading and lookup

use thiserror::Error;

/// Result type alias using the fixture [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Fixture engine errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Test data resource not found: {name}")]
    ResourceNotFound { name: String },

    #[error("Malformed test data document {resource}: {message}")]
    MalformedDocument { resource: String, message: String },

    #[error("Path for test data cannot be empty")]
    InvalidPath,

    #[error("No test data found for root node '{root}'; check the test data file and scope configuration")]
    NoDataFound { root: String },

    #[error("No test data node found for path '{path}'")]
    NodeNotFound { path: String },

    #[error("Test data reader used before initialize()")]
    NotInitialized,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors that mean "the path is not there" rather than a broken setup
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            Error::InvalidPath | Error::NoDataFound { .. } | Error::NodeNotFound { .. }
        )
    }
}
