//! Python interpreter and shared library discovery
//!
//! Locates the interpreter to embed by asking a real Python process where its
//! shared library lives. The probe goes through `sysconfig` so the answer
//! reflects the interpreter that created the active venv, not whatever
//! happens to be first on PATH at build time.

use crate::errors::BridgeError;
use pylink_config::{resolve_python_exe, Config};
use pylink_logger as logger;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The `python -c` snippet that reports the shared library location.
///
/// `LIBDIR` is the directory holding libpython, `INSTSONAME` the soname of
/// the installed library (e.g. `libpython3.12.so.1.0`).
const LIB_PROBE: &str = "import sysconfig, os; print(os.path.join(sysconfig.get_config_var('LIBDIR'), sysconfig.get_config_var('INSTSONAME')))";

/// Discovered interpreter with the paths needed to embed it
#[derive(Debug, Clone)]
pub struct InterpreterInfo {
    /// Path to the Python executable that was probed
    pub executable: PathBuf,
    /// Path to the shared library (libpython3.X.so/dylib/dll)
    pub lib_path: PathBuf,
    /// Installation prefix, exported as PYTHONHOME
    pub home: PathBuf,
}

/// Errors during interpreter discovery
#[derive(Debug)]
pub enum DiscoveryError {
    /// No Python interpreter found to probe
    NoPython(String),
    /// The probe subprocess failed or produced no usable output
    ProbeFailed(String),
    /// Could not locate the shared library
    NoSharedLibrary(String),
    /// IO error during discovery
    Io(std::io::Error),
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryError::NoPython(msg) => write!(f, "No Python found: {}", msg),
            DiscoveryError::ProbeFailed(msg) => {
                write!(f, "Failed to query interpreter paths: {}", msg)
            }
            DiscoveryError::NoSharedLibrary(msg) => {
                write!(f, "Could not locate Python shared library: {}", msg)
            }
            DiscoveryError::Io(e) => write!(f, "IO error during discovery: {}", e),
        }
    }
}

impl std::error::Error for DiscoveryError {}

impl From<std::io::Error> for DiscoveryError {
    fn from(e: std::io::Error) -> Self {
        DiscoveryError::Io(e)
    }
}

impl From<DiscoveryError> for BridgeError {
    fn from(e: DiscoveryError) -> Self {
        BridgeError::Discovery(e.to_string())
    }
}

impl InterpreterInfo {
    /// Probe an interpreter for its shared library and installation prefix
    ///
    /// The prefix (PYTHONHOME) is the grandparent of the reported library
    /// path: `<prefix>/lib/libpython3.X.so` → `<prefix>`.
    pub fn discover(executable: &Path) -> Result<Self, DiscoveryError> {
        logger::debug(&format!("Probing Python at: {}", executable.display()));

        let output = Command::new(executable).args(["-c", LIB_PROBE]).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DiscoveryError::ProbeFailed(format!(
                "{} exited with {:?}: {}",
                executable.display(),
                output.status.code(),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reported = stdout.trim();
        if reported.is_empty() {
            return Err(DiscoveryError::ProbeFailed(format!(
                "{} reported an empty library path",
                executable.display()
            )));
        }

        let mut lib_path = PathBuf::from(reported);
        let home = lib_path
            .parent()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                DiscoveryError::ProbeFailed(format!("Cannot derive prefix from {}", reported))
            })?;

        if !lib_path.exists() {
            logger::debug(&format!(
                "Reported library missing, scanning prefix: {}",
                lib_path.display()
            ));
            lib_path = find_shared_library(&home).ok_or_else(|| {
                DiscoveryError::NoSharedLibrary(format!(
                    "{} does not exist and no libpython found under {}",
                    reported,
                    home.display()
                ))
            })?;
        }

        logger::debug(&format!(
            "Found Python library {} (home {})",
            lib_path.display(),
            home.display()
        ));

        Ok(InterpreterInfo {
            executable: executable.to_path_buf(),
            lib_path,
            home,
        })
    }
}

/// Pick the interpreter executable to probe
///
/// Order: explicit `python` override in the config, then the venv's own
/// interpreter, then `python3`/`python` from PATH.
pub fn select_interpreter(config: &Config, venv_path: &Path) -> Result<PathBuf, DiscoveryError> {
    if let Some(ref override_path) = config.python {
        let path = PathBuf::from(override_path);
        if path.exists() {
            logger::debug(&format!("Using configured Python: {}", path.display()));
            return Ok(path);
        }
        logger::warn(&format!(
            "Configured Python does not exist, ignoring: {}",
            override_path
        ));
    }

    match resolve_python_exe(venv_path) {
        Ok(path) => return Ok(path),
        Err(e) => logger::debug(&format!("No venv interpreter: {}", e)),
    }

    for name in ["python3", "python"] {
        if let Ok(path) = which::which(name) {
            logger::debug(&format!("Using {} from PATH: {}", name, path.display()));
            return Ok(path);
        }
    }

    Err(DiscoveryError::NoPython(
        "no interpreter in the venv and neither python3 nor python is on PATH".to_string(),
    ))
}

/// Scan `<prefix>/lib` (and `lib64`) for a libpython shared object
fn find_shared_library(prefix: &Path) -> Option<PathBuf> {
    for lib_dir_name in ["lib", "lib64"] {
        let lib_dir = prefix.join(lib_dir_name);
        if !lib_dir.is_dir() {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&lib_dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with("libpython")
                    && (name.contains(".so") || name.ends_with(".dylib"))
                {
                    return Some(path);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discovery_error_display() {
        let err = DiscoveryError::NoPython("test".to_string());
        assert!(err.to_string().contains("No Python found"));

        let err = DiscoveryError::NoSharedLibrary("/opt/python".to_string());
        assert!(err.to_string().contains("shared library"));
    }

    #[test]
    fn test_probe_nonexistent_interpreter() {
        let result = InterpreterInfo::discover(Path::new("/nonexistent/python3"));
        assert!(matches!(result, Err(DiscoveryError::Io(_))));
    }

    #[test]
    fn test_find_shared_library_scan() {
        let prefix = TempDir::new().unwrap();
        let lib_dir = prefix.path().join("lib");
        fs::create_dir_all(&lib_dir).unwrap();
        fs::write(lib_dir.join("libpython3.12.so.1.0"), "").unwrap();

        let found = find_shared_library(prefix.path()).unwrap();
        assert!(found.ends_with("lib/libpython3.12.so.1.0"));
    }

    #[test]
    fn test_find_shared_library_empty_prefix() {
        let prefix = TempDir::new().unwrap();
        assert!(find_shared_library(prefix.path()).is_none());
    }

    #[test]
    fn test_lib_probe_uses_sysconfig() {
        assert!(LIB_PROBE.contains("LIBDIR"));
        assert!(LIB_PROBE.contains("INSTSONAME"));
    }
}
