//! Configuration and virtual environment resolution for pylink
//!
//! Two concerns live here:
//! 1. The persisted TOML config file (`~/.config/pylink/pylink.toml`)
//! 2. Path resolution inside Python virtual environments (site-packages,
//!    interpreter executable), which differs between Unix and Windows

mod config;
mod venv;

pub use config::{Config, ConfigError};
pub use venv::{
    resolve_python_exe, resolve_site_packages, VenvPathError, PYTHON_BIN_DIR, PYTHON_LIB_DIR,
    SITE_PACKAGES,
};

/// Environment variable naming the active virtual environment.
///
/// Set by `source .venv/bin/activate` (and by uv, virtualenv, etc.).
pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";

/// Environment variable that silences pylink's advisory warnings when set to "true".
pub const NO_WARNING_ENV: &str = "PYLINK_NO_WARNING";
