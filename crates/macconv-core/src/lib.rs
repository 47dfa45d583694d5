//! Core types shared by every macconv crate
//!
//! This crate provides the foundational pieces used throughout macconv:
//! - [`MacconvError`] - the command-boundary error type
//! - [`ErrorKind`] - coarse classification of failures
//! - [`validate`] - reusable input validators (ports, file paths)
//!
//! ```
//! use macconv_core::{ErrorKind, MacconvError};
//!
//! let err = MacconvError::Validation("port must be a number".to_string());
//! assert_eq!(err.kind(), ErrorKind::Validation);
//! ```

use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub mod validate;

/// Coarse classification of a failure
///
/// Every crate-level error maps onto one of these so the CLI can decide
/// how to report it without knowing each crate's error enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or out-of-range user input
    Validation,
    /// Address or CIDR syntax failure
    Parse,
    /// DNS or connect failure
    Network,
    /// File could not be opened or read
    FileSystem,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation error",
            ErrorKind::Parse => "parse error",
            ErrorKind::Network => "network error",
            ErrorKind::FileSystem => "file system error",
        };
        f.write_str(name)
    }
}

/// Error type returned by every command handler
#[derive(Error, Debug)]
pub enum MacconvError {
    /// Invalid user input
    #[error("{0}")]
    Validation(String),

    /// Input could not be parsed
    #[error("invalid input {input:?}: {reason}")]
    Parse {
        /// The original input string
        input: String,
        /// Why parsing failed
        reason: String,
    },

    /// Network error
    #[error("{0}")]
    Network(String),

    /// File system error
    #[error("{0}")]
    FileSystem(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MacconvError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MacconvError::Validation(_) => ErrorKind::Validation,
            MacconvError::Parse { .. } => ErrorKind::Parse,
            MacconvError::Network(_) => ErrorKind::Network,
            MacconvError::FileSystem(_) | MacconvError::Io(_) => ErrorKind::FileSystem,
        }
    }
}

/// Result type alias for macconv operations
pub type Result<T> = std::result::Result<T, MacconvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(
            MacconvError::Validation("bad".to_string()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            MacconvError::Parse {
                input: "x".to_string(),
                reason: "y".to_string()
            }
            .kind(),
            ErrorKind::Parse
        );
        assert_eq!(
            MacconvError::Network("refused".to_string()).kind(),
            ErrorKind::Network
        );
        assert_eq!(
            MacconvError::FileSystem("missing".to_string()).kind(),
            ErrorKind::FileSystem
        );
    }

    #[test]
    fn test_io_error_is_file_system() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MacconvError = io.into();
        assert_eq!(err.kind(), ErrorKind::FileSystem);
        assert_eq!(format!("{}", err), "I/O error: gone");
    }

    #[test]
    fn test_error_display() {
        let err = MacconvError::Parse {
            input: "10.0.0.0/33".to_string(),
            reason: "prefix length 33 out of range".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "invalid input \"10.0.0.0/33\": prefix length 33 out of range"
        );
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Network.to_string(), "network error");
        assert_eq!(ErrorKind::FileSystem.to_string(), "file system error");
    }

    #[test]
    fn test_error_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::FileSystem).expect("serialization failed");
        assert_eq!(json, "\"file_system\"");
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<u16> {
            Ok(22)
        }

        assert_eq!(returns_result().unwrap(), 22);
    }
}
