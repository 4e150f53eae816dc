//! # Store Error Types
//!
//! Configuration errors are the only recoverable errors this crate surfaces.
//! Everything else follows the store's error policy:
//!
//! - Load failures on open fall back to an empty cart (logged)
//! - Save failures are logged and counted, never surfaced to mutation calls
//! - Using a store after shutdown is a caller bug and panics

use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration value fails validation.
    #[error("Invalid store configuration: {0}")]
    Invalid(String),

    /// The config file could not be read or written.
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized for saving.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No config file path was given and no platform default exists.
    #[error("No config path available")]
    NoPath,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
