//! Dynamic loading of the Python shared library
//!
//! The library named by the discovery step is loaded with dlopen (Unix) or
//! LoadLibrary (Windows) before the interpreter is initialized, and the
//! handle is held for the lifetime of the process.

use crate::errors::BridgeError;
use pylink_logger as logger;
use std::path::Path;

/// Errors during library loading
#[derive(Debug)]
pub enum LoadError {
    /// Failed to load the library
    LoadFailed(String),
    /// Library path doesn't exist
    NotFound(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::LoadFailed(msg) => write!(f, "Failed to load Python library: {}", msg),
            LoadError::NotFound(path) => write!(f, "Python library not found: {}", path),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<LoadError> for BridgeError {
    fn from(e: LoadError) -> Self {
        BridgeError::Initialization(e.to_string())
    }
}

/// Loaded libpython handle
///
/// Dropping this would unload the library, so the bridge keeps it alive for
/// as long as the interpreter may run.
pub struct LibPython {
    _library: libloading::Library,
}

impl LibPython {
    /// Load the Python shared library
    ///
    /// On Unix this uses RTLD_NOW | RTLD_GLOBAL so symbols are resolved
    /// immediately and visible to Python extension modules loaded later.
    pub fn load(lib_path: &Path) -> Result<Self, LoadError> {
        if !lib_path.exists() {
            return Err(LoadError::NotFound(lib_path.display().to_string()));
        }

        logger::debug(&format!(
            "Loading Python shared library: {}",
            lib_path.display()
        ));

        #[cfg(unix)]
        {
            Self::load_unix(lib_path)
        }

        #[cfg(windows)]
        {
            Self::load_windows(lib_path)
        }
    }

    #[cfg(unix)]
    fn load_unix(lib_path: &Path) -> Result<Self, LoadError> {
        use libloading::os::unix::Library;

        // RTLD_GLOBAL is required for Python extension modules to resolve
        // interpreter symbols
        let flags = libc::RTLD_NOW | libc::RTLD_GLOBAL;

        let library = unsafe {
            Library::open(Some(lib_path), flags)
                .map_err(|e| LoadError::LoadFailed(format!("{}: {}", lib_path.display(), e)))?
        };

        logger::debug("Python library loaded with RTLD_GLOBAL");

        Ok(Self {
            _library: library.into(),
        })
    }

    #[cfg(windows)]
    fn load_windows(lib_path: &Path) -> Result<Self, LoadError> {
        // Add the DLL's directory to the search path so dependent DLLs resolve
        if let Some(parent) = lib_path.parent() {
            unsafe {
                use std::os::windows::ffi::OsStrExt;
                let wide: Vec<u16> = parent
                    .as_os_str()
                    .encode_wide()
                    .chain(std::iter::once(0))
                    .collect();

                extern "system" {
                    fn SetDllDirectoryW(lpPathName: *const u16) -> i32;
                }
                SetDllDirectoryW(wide.as_ptr());
            }
        }

        let library = unsafe {
            libloading::Library::new(lib_path)
                .map_err(|e| LoadError::LoadFailed(format!("{}: {}", lib_path.display(), e)))?
        };

        logger::debug("Python library loaded");

        Ok(Self { _library: library })
    }
}

impl std::fmt::Debug for LibPython {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibPython").field("loaded", &true).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display() {
        let err = LoadError::LoadFailed("test error".to_string());
        assert!(err.to_string().contains("Failed to load"));

        let err = LoadError::NotFound("/path/to/lib".to_string());
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_nonexistent() {
        let result = LibPython::load(Path::new("/nonexistent/libpython.so"));
        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }
}
