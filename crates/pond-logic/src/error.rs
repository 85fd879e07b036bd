//! Top-level error type for the pond core.

use std::error::Error;
use std::fmt;

use crate::config::ConfigError;
use crate::manager::PoolError;

/// Result type for fallible pond operations.
pub type Result<T> = std::result::Result<T, PondError>;

/// Errors surfaced to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum PondError {
    /// The tuning document failed validation. Carries every problem found.
    Config(Vec<ConfigError>),
    /// Lifecycle misuse of the fish pool.
    Pool(PoolError),
    /// The tuning document could not be parsed.
    Parse(String),
    /// The tuning document could not be read.
    Io(String),
}

impl fmt::Display for PondError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PondError::Config(errors) => {
                write!(f, "invalid configuration ({} problems)", errors.len())?;
                for e in errors {
                    write!(f, "; {}", e)?;
                }
                Ok(())
            }
            PondError::Pool(e) => write!(f, "pool error: {}", e),
            PondError::Parse(msg) => write!(f, "parse error: {}", msg),
            PondError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl Error for PondError {}

impl From<PoolError> for PondError {
    fn from(e: PoolError) -> Self {
        PondError::Pool(e)
    }
}

impl From<std::io::Error> for PondError {
    fn from(e: std::io::Error) -> Self {
        PondError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for PondError {
    fn from(e: serde_json::Error) -> Self {
        PondError::Parse(e.to_string())
    }
}
