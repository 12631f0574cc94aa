//! Error types for configuration and registry handling.

use thiserror::Error;

/// Errors raised while loading configuration or parsing registry values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The role name is not one of the closed set.
    #[error("unknown role: {0} (expected one of developer, designer, marketing, pm)")]
    UnknownRole(String),

    /// The environment name is not recognised.
    #[error("unknown environment: {0} (expected development or production)")]
    UnknownEnvironment(String),

    /// An explicitly named configuration file does not exist.
    #[error("configuration file not found: {0}")]
    NotFound(String),

    /// Failed to parse the YAML configuration.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// IO error while reading the configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
