//! Core error types for nessus-queue.
//!
//! Configuration problems are fatal before any scan work starts, so they get
//! their own type. Everything else that the core crate can reject is a
//! validation error.

use thiserror::Error;

/// Central error type for core operations.
#[derive(Error, Debug)]
pub enum NessusError {
    /// Configuration errors (missing variables, file loading, parsing)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors (operator input, malformed identifiers)
    #[error("validation error: {0}")]
    Validation(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// A required environment variable is unset or empty
    #[error("the environment variable '{var}' is not set")]
    Missing {
        /// Name of the variable
        var: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `NessusError`.
pub type Result<T> = std::result::Result<T, NessusError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
