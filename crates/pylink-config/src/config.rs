//! Persisted configuration file handling

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::{NO_WARNING_ENV, VIRTUAL_ENV};

/// Errors from loading or saving the config file
#[derive(Debug)]
pub enum ConfigError {
    /// Could not determine a config directory for this platform
    NoConfigDir,
    /// IO failure reading or writing the file
    Io(std::io::Error),
    /// The file exists but is not valid TOML
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "Could not determine config directory"),
            ConfigError::Io(e) => write!(f, "Config IO error: {}", e),
            ConfigError::Parse(msg) => write!(f, "Failed to parse config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// Persisted pylink settings
///
/// All fields are optional; an absent file behaves like `Config::default()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fallback virtual environment path used when `VIRTUAL_ENV` is not set
    pub venv_path: Option<String>,
    /// Explicit Python interpreter to probe instead of the venv/system one
    pub python: Option<String>,
    /// Silence advisory warnings (same effect as `PYLINK_NO_WARNING=true`)
    pub suppress_warnings: Option<bool>,
}

impl Config {
    /// Path to the config file
    ///
    /// `PYLINK_CONFIG` overrides the default location; integration tests use
    /// this to route the CLI at fixture configs.
    pub fn path() -> PathBuf {
        if let Some(path) = env::var_os("PYLINK_CONFIG") {
            return PathBuf::from(path);
        }
        default_config_dir().join("pylink.toml")
    }

    /// Load the config, treating a missing file as defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save the config, creating parent directories as needed
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path();
        let parent = path.parent().ok_or(ConfigError::NoConfigDir)?;
        fs::create_dir_all(parent)?;

        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Resolve the active virtual environment, if any
    ///
    /// `VIRTUAL_ENV` (set by `source .venv/bin/activate`) wins; the config
    /// file's `venv_path` is the fallback. `None` means no venv is active and
    /// the caller should warn and fall back to default interpreter discovery.
    pub fn active_venv(&self) -> Option<PathBuf> {
        if let Some(venv) = env::var_os(VIRTUAL_ENV) {
            if !venv.is_empty() {
                return Some(PathBuf::from(venv));
            }
        }
        self.venv_path.as_ref().map(PathBuf::from)
    }

    /// Whether advisory warnings should be printed
    pub fn warnings_enabled(&self) -> bool {
        if env::var(NO_WARNING_ENV).as_deref() == Ok("true") {
            return false;
        }
        !self.suppress_warnings.unwrap_or(false)
    }
}

fn default_config_dir() -> PathBuf {
    #[cfg(not(target_os = "windows"))]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("pylink")
    }

    #[cfg(target_os = "windows")]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pylink")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_empty() {
        let config = Config::default();
        assert!(config.venv_path.is_none());
        assert!(config.python.is_none());
        assert!(config.suppress_warnings.is_none());
    }

    #[test]
    fn test_roundtrip_toml() {
        let config = Config {
            venv_path: Some("/tmp/.venv".to_string()),
            python: None,
            suppress_warnings: Some(true),
        };
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.venv_path.as_deref(), Some("/tmp/.venv"));
        assert_eq!(parsed.suppress_warnings, Some(true));
    }

    #[test]
    fn test_parse_partial_config() {
        let parsed: Config = toml::from_str("venv_path = \"/opt/venv\"\n").unwrap();
        assert_eq!(parsed.venv_path.as_deref(), Some("/opt/venv"));
        assert!(parsed.python.is_none());
    }

    #[test]
    fn test_load_missing_then_save_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pylink.toml");
        std::env::set_var("PYLINK_CONFIG", &path);

        // Missing file loads as defaults
        let config = Config::load().unwrap();
        assert!(config.venv_path.is_none());

        let config = Config {
            venv_path: Some("/srv/project/.venv".to_string()),
            python: None,
            suppress_warnings: Some(true),
        };
        config.save().unwrap();

        let reloaded = Config::load().unwrap();
        std::env::remove_var("PYLINK_CONFIG");

        assert!(path.exists());
        assert_eq!(reloaded.venv_path.as_deref(), Some("/srv/project/.venv"));
        assert_eq!(reloaded.suppress_warnings, Some(true));
    }

    #[test]
    fn test_warnings_suppression() {
        std::env::remove_var(NO_WARNING_ENV);

        assert!(Config::default().warnings_enabled());
        let suppressed = Config {
            suppress_warnings: Some(true),
            ..Config::default()
        };
        assert!(!suppressed.warnings_enabled());
        let explicit = Config {
            suppress_warnings: Some(false),
            ..Config::default()
        };
        assert!(explicit.warnings_enabled());

        std::env::set_var(NO_WARNING_ENV, "true");
        assert!(!Config::default().warnings_enabled());
        // Only the literal "true" suppresses
        std::env::set_var(NO_WARNING_ENV, "false");
        assert!(Config::default().warnings_enabled());
        std::env::remove_var(NO_WARNING_ENV);
    }

    #[test]
    fn test_config_venv_fallback() {
        let config = Config {
            venv_path: Some("/srv/project/.venv".to_string()),
            ..Config::default()
        };
        // When VIRTUAL_ENV is unset, the config fallback applies
        if std::env::var_os(VIRTUAL_ENV).is_none() {
            assert_eq!(
                config.active_venv(),
                Some(PathBuf::from("/srv/project/.venv"))
            );
        }
    }
}
