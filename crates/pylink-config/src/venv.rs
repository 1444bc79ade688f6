//! Path resolution inside Python virtual environments
//!
//! Platform-specific lookups for the site-packages directory and the Python
//! executable of a venv. Used by both pylink-python and the CLI.

use std::fs;
use std::path::{Path, PathBuf};

/// The name of the library directory in a Python venv
/// "Lib" on Windows, "lib" on Unix
#[cfg(windows)]
pub const PYTHON_LIB_DIR: &str = "Lib";
#[cfg(not(windows))]
pub const PYTHON_LIB_DIR: &str = "lib";

/// The name of the binaries/scripts directory in a Python venv
/// "Scripts" on Windows, "bin" on Unix
#[cfg(windows)]
pub const PYTHON_BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
pub const PYTHON_BIN_DIR: &str = "bin";

/// The subdirectory name for site-packages within the lib directory
pub const SITE_PACKAGES: &str = "site-packages";

/// Candidate executable names in a venv
#[cfg(not(windows))]
const PYTHON_EXE_CANDIDATES: &[&str] = &["python3", "python"];
#[cfg(windows)]
const PYTHON_EXE_CANDIDATES: &[&str] = &["python.exe", "python3.exe"];

/// Error type for venv path resolution
#[derive(Debug, Clone)]
pub enum VenvPathError {
    /// The venv path does not exist or is not a directory
    VenvNotFound(PathBuf),
    /// The venv lib directory has no subdirectories to derive site-packages from
    EmptyLibDir(PathBuf),
    /// Failed to find a required directory or file
    PathResolution(String),
}

impl std::fmt::Display for VenvPathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VenvPathError::VenvNotFound(path) => {
                write!(f, "Virtual environment not found: {}", path.display())
            }
            VenvPathError::EmptyLibDir(path) => {
                write!(f, "No packages found in {}", path.display())
            }
            VenvPathError::PathResolution(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for VenvPathError {}

/// Resolve the site-packages path for a Python virtual environment
///
/// # Platform differences
///
/// - **Unix/macOS**: `<venv>/lib/<first subdirectory>/site-packages`
/// - **Windows**: `<venv>/Lib/site-packages`
///
/// On Unix the lookup takes the first subdirectory of `<venv>/lib` (in
/// practice the only one, `python3.X`) rather than pinning a version name.
pub fn resolve_site_packages(venv_path: &Path) -> Result<PathBuf, VenvPathError> {
    if !venv_path.is_dir() {
        return Err(VenvPathError::VenvNotFound(venv_path.to_path_buf()));
    }

    #[cfg(windows)]
    {
        let site_packages = venv_path.join(PYTHON_LIB_DIR).join(SITE_PACKAGES);
        if !site_packages.is_dir() {
            return Err(VenvPathError::PathResolution(format!(
                "site-packages not found: {}",
                site_packages.display()
            )));
        }
        Ok(site_packages)
    }

    #[cfg(not(windows))]
    {
        let lib_dir = venv_path.join(PYTHON_LIB_DIR);
        if !lib_dir.is_dir() {
            return Err(VenvPathError::PathResolution(format!(
                "lib directory not found: {}",
                lib_dir.display()
            )));
        }

        let first_subdir = fs::read_dir(&lib_dir)
            .map_err(|e| VenvPathError::PathResolution(format!("Failed to read lib dir: {}", e)))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .find(|p| p.is_dir())
            .ok_or(VenvPathError::EmptyLibDir(lib_dir))?;

        Ok(first_subdir.join(SITE_PACKAGES))
    }
}

/// Resolve the Python executable path for a virtual environment
///
/// # Platform differences
///
/// - **Unix/macOS**: `<venv>/bin/python3` or `<venv>/bin/python`
/// - **Windows**: `<venv>/Scripts/python.exe`
pub fn resolve_python_exe(venv_path: &Path) -> Result<PathBuf, VenvPathError> {
    if !venv_path.is_dir() {
        return Err(VenvPathError::VenvNotFound(venv_path.to_path_buf()));
    }

    let bin_dir = venv_path.join(PYTHON_BIN_DIR);
    if !bin_dir.is_dir() {
        return Err(VenvPathError::PathResolution(format!(
            "bin directory not found: {}",
            bin_dir.display()
        )));
    }

    for exe in PYTHON_EXE_CANDIDATES {
        let candidate = bin_dir.join(exe);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    // Fallback: any python-like executable in the bin dir
    if let Ok(entries) = fs::read_dir(&bin_dir) {
        if let Some(candidate) = entries.filter_map(|e| e.ok()).map(|e| e.path()).find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.contains("python"))
                && p.is_file()
        }) {
            return Ok(candidate);
        }
    }

    Err(VenvPathError::PathResolution(format!(
        "Python executable not found in {}",
        bin_dir.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(not(windows))]
    fn create_mock_venv_unix(python_version: &str) -> Option<TempDir> {
        let temp_dir = TempDir::new().ok()?;
        let venv_path = temp_dir.path();

        let site_packages = venv_path.join("lib").join(python_version).join("site-packages");
        fs::create_dir_all(&site_packages).ok()?;

        let bin_dir = venv_path.join("bin");
        fs::create_dir_all(&bin_dir).ok()?;
        fs::write(bin_dir.join("python3"), "").ok()?;

        Some(temp_dir)
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_site_packages_unix() {
        let Some(temp_venv) = create_mock_venv_unix("python3.12") else {
            return;
        };
        let result = resolve_site_packages(temp_venv.path());
        assert!(result.is_ok_and(|p| p.ends_with("lib/python3.12/site-packages")));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_site_packages_takes_first_subdir() {
        let Some(temp_venv) = create_mock_venv_unix("pypy3.10") else {
            return;
        };
        let result = resolve_site_packages(temp_venv.path()).unwrap();
        assert!(result.ends_with("lib/pypy3.10/site-packages"));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_empty_lib_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("lib")).unwrap();
        let result = resolve_site_packages(temp_dir.path());
        assert!(matches!(result, Err(VenvPathError::EmptyLibDir(_))));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_python_exe_unix() {
        let Some(temp_venv) = create_mock_venv_unix("python3.12") else {
            return;
        };
        let result = resolve_python_exe(temp_venv.path());
        assert!(result.is_ok_and(|p| p.ends_with("bin/python3")));
    }

    #[test]
    fn test_venv_not_found() {
        let non_existent = PathBuf::from("/tmp/non_existent_venv_12345");
        let result = resolve_site_packages(&non_existent);
        assert!(matches!(result, Err(VenvPathError::VenvNotFound(_))));
    }

    #[test]
    fn test_platform_constants() {
        #[cfg(not(windows))]
        {
            assert_eq!(PYTHON_LIB_DIR, "lib");
            assert_eq!(PYTHON_BIN_DIR, "bin");
        }
        #[cfg(windows)]
        {
            assert_eq!(PYTHON_LIB_DIR, "Lib");
            assert_eq!(PYTHON_BIN_DIR, "Scripts");
        }
    }
}
