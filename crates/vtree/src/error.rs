#![forbid(unsafe_code)]

//! Error types.
//!
//! The engine itself never fails: invalid patterns and stale ids degrade to
//! empty results. Errors only arise when loading configuration.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Failure to load or validate a [`crate::config::TreeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
