use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during Python bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Python error: {0}")]
    Python(String),

    #[error("Failed to import module '{0}': {1}")]
    Import(String, String),

    #[error("Module '{0}' has no callable 'main' entry point")]
    MissingEntryPoint(String),

    #[error("Python venv not found or invalid at: {0}")]
    VenvNotFound(PathBuf),

    #[error("Failed to discover Python interpreter: {0}")]
    Discovery(String),

    #[error("Failed to initialize Python interpreter: {0}")]
    Initialization(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Generic conversion from PyErr to BridgeError.
///
/// NOTE: This conversion loses the Python traceback. For errors where the
/// traceback matters (the user's `main()` raising), use
/// `format_python_error()` from the bridge module instead.
impl From<pyo3::PyErr> for BridgeError {
    fn from(err: pyo3::PyErr) -> Self {
        BridgeError::Python(format!("{}", err))
    }
}
