//! Centralized error types for the pylink CLI

use pylink_config::{ConfigError, VenvPathError};
use pylink_python::{BridgeError, DiscoveryError};
use std::io;
use thiserror::Error;

/// Errors surfaced by CLI command handlers
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Venv error: {0}")]
    Venv(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<DiscoveryError> for CliError {
    fn from(e: DiscoveryError) -> Self {
        CliError::Bridge(BridgeError::from(e))
    }
}

impl From<VenvPathError> for CliError {
    fn from(e: VenvPathError) -> Self {
        CliError::Venv(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = CliError::Config("bad toml".to_string());
        assert_eq!(err.to_string(), "Config error: bad toml");
    }

    #[test]
    fn test_bridge_error_passthrough() {
        let err = CliError::from(BridgeError::MissingEntryPoint("hello".to_string()));
        assert!(err.to_string().contains("hello"));
        assert!(err.to_string().contains("main"));
    }
}
