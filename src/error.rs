//! Error types for scenefx.
//!
//! The simulation itself never fails: unknown presets, malformed colors and
//! zero emission rates all degrade to safe defaults. Errors only surface at
//! the edges, when scene or catalog files are loaded, or when a caller asks
//! for strict color validation.

use std::path::PathBuf;
use thiserror::Error;

/// A hex color string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Wrong number of hex digits (only 6 or 8 are accepted).
    #[error("expected 6 or 8 hex digits, got {0}")]
    Length(usize),
    /// A character outside `[0-9a-fA-F]`.
    #[error("invalid hex digit in {0:?}")]
    Digit(String),
}

/// Errors raised while loading or saving scene and preset files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the file.
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid JSON for the expected type.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The file parsed but describes an unusable configuration.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}
