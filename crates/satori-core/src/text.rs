//! # Text Boundary
//!
//! Parses configuration text into the primitive value tree and renders
//! values back to canonical text.
//!
//! Rendering is stable: mapping keys come out in insertion order, which is
//! the order the schema engine builds specifications in.

use std::path::Path;

use serde_yaml::Value;

use crate::error::CoreError;

/// Parse YAML text into a value tree.
///
/// Empty or whitespace-only input parses to `Value::Null`.
///
/// # Errors
///
/// Returns `CoreError::Parse` if the text is not valid YAML.
pub fn parse(text: &str) -> Result<Value, CoreError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(text).map_err(CoreError::Parse)
}

/// Render a value tree as canonical YAML text.
///
/// # Errors
///
/// Returns `CoreError::Render` if the value cannot be serialized.
pub fn render(value: &Value) -> Result<String, CoreError> {
    serde_yaml::to_string(value).map_err(CoreError::Render)
}

/// Render a value tree as pretty-printed JSON.
///
/// Mapping keys must be scalars; tags are dropped.
pub fn render_json(value: &Value) -> Result<String, CoreError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Read and parse a YAML file.
///
/// # Errors
///
/// Returns `CoreError::Io` if the file cannot be read and `CoreError::File`
/// if its content does not parse.
pub fn load_file(path: &Path) -> Result<Value, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(&content).map_err(|source| CoreError::File {
        path: path.to_path_buf(),
        source,
    })
}
