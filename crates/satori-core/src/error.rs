//! # Error Types
//!
//! Errors raised at the text boundary. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.

use std::path::PathBuf;

use thiserror::Error;

/// Error loading or rendering configuration text.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The text is not well-formed YAML.
    #[error("parse error: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// A value could not be rendered as YAML text.
    #[error("render error: {0}")]
    Render(#[source] serde_yaml::Error),

    /// A value could not be rendered as JSON text.
    #[error("json render error: {0}")]
    RenderJson(#[from] serde_json::Error),

    /// A file could not be read.
    #[error("io error for '{}': {source}", path.display())]
    Io {
        /// The file that failed to load.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },

    /// A file was read but does not parse.
    #[error("cannot parse '{}': {source}", path.display())]
    File {
        /// The file that failed to parse.
        path: PathBuf,
        /// Underlying YAML failure.
        #[source]
        source: serde_yaml::Error,
    },
}
