//! Error types for configuration and collection bundle loading.
//!
//! Provides a unified error type covering I/O, serialization, configuration
//! validation, missing collections and matching failures.

use collection_match_core::MatchError;
use thiserror::Error;

/// Errors that can occur while loading configuration or collections.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Configuration parsed but is not usable (e.g. empty version).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A binding names a collection the store does not hold.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    /// All configured store sources failed.
    #[error("no collection sources available")]
    NoSourcesAvailable,

    /// Type parsing or matching failure.
    #[error(transparent)]
    Match(#[from] MatchError),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
