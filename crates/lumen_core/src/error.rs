//! Error types for mesh loading and configuration.

use thiserror::Error;

/// Errors that can occur while reading a binary STL file.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Truncated mesh: header declares {expected} triangles, only {found} present")]
    Truncated { expected: u32, found: u32 },
}

/// Result type for mesh loading.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur while loading or validating render settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
