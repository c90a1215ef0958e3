//! Error types for the EGNN library

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Unrecognized name for a configuration option
    #[error("Unknown {option} option: {value:?}")]
    UnknownOption {
        option: &'static str,
        value: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tensor width or row count does not match what the model expects
    #[error("Shape mismatch in {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Edge refers to a node that does not exist
    #[error("Edge {edge} references node {index}, but the batch has {num_nodes} nodes")]
    EdgeIndexOutOfBounds {
        edge: usize,
        index: usize,
        num_nodes: usize,
    },

    /// Malformed graph batch
    #[error("Invalid graph batch: {0}")]
    InvalidBatch(String),

    /// Array construction error
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn unknown(option: &'static str, value: &str) -> Self {
        Error::UnknownOption {
            option,
            value: value.to_string(),
        }
    }

    pub(crate) fn check_width(what: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Error::ShapeMismatch {
                what,
                expected,
                actual,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_width() {
        assert!(Error::check_width("x", 3, 3).is_ok());
        match Error::check_width("node features", 3, 4) {
            Err(Error::ShapeMismatch { what, expected, actual }) => {
                assert_eq!(what, "node features");
                assert_eq!(expected, 3);
                assert_eq!(actual, 4);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        let err = Error::unknown("activation", "tanh");
        assert_eq!(err.to_string(), "Unknown activation option: \"tanh\"");
    }
}
