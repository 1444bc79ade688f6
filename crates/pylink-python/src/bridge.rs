//! Memoized Python bridge
//!
//! Lazy, once-per-process initialization of the embedded interpreter. The
//! environment (PYLINK_PYTHON_LIB, PYTHONHOME, PYTHONPATH) is configured and
//! libpython is loaded before pyo3 touches the interpreter; afterwards the
//! current directory and the venv's site-packages are appended to `sys.path`
//! so user modules import the way they would under `python` itself.

use crate::discovery::{select_interpreter, InterpreterInfo};
use crate::errors::BridgeError;
use crate::loader::LibPython;
use once_cell::sync::OnceCell;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyModule};
use pylink_config::{resolve_site_packages, Config, VenvPathError};
use pylink_logger as logger;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable naming the shared library handed to the FFI layer
pub const PYTHON_LIB_ENV: &str = "PYLINK_PYTHON_LIB";

const VENV_WARNING: &str = "\
`VIRTUAL_ENV` is not set. To use pylink as recommended, activate a virtual
environment in your shell first:

    source .venv/bin/activate

If you are using a different venv path:

    source {MY_PYTHON_PROJECT_PATH}/.venv/bin/activate

We recommend uv (https://docs.astral.sh/uv/) to create the environment:

    uv init
    uv sync
    source .venv/bin/activate

Disable this warning by setting PYLINK_NO_WARNING=true";

/// The embedded Python interface
pub struct Bridge {
    site_packages: Option<PathBuf>,
    // Keeps libpython mapped for the lifetime of the process
    _lib: Option<LibPython>,
}

/// Global bridge singleton
static BRIDGE_INSTANCE: OnceCell<Result<Bridge, BridgeError>> = OnceCell::new();

impl Bridge {
    /// Get or initialize the bridge singleton
    ///
    /// The first caller pays the full initialization cost; every later call
    /// returns the cached interface.
    pub fn get() -> Result<&'static Bridge, BridgeError> {
        match BRIDGE_INSTANCE.get_or_init(Bridge::initialize) {
            Ok(bridge) => Ok(bridge),
            Err(e) => Err(BridgeError::Initialization(format!("{}", e))),
        }
    }

    /// Initialize the interpreter and configure its environment
    ///
    /// This performs:
    /// 1. Resolve the active venv (warn and fall back when none is active)
    /// 2. Probe the interpreter for its shared library and prefix
    /// 3. Export PYLINK_PYTHON_LIB / PYTHONHOME / PYTHONPATH
    /// 4. dlopen libpython and initialize pyo3
    /// 5. Append cwd and site-packages to sys.path
    fn initialize() -> Result<Bridge, BridgeError> {
        let config = Config::load()
            .map_err(|e| BridgeError::Initialization(format!("Failed to load config: {}", e)))?;

        let Some(venv_path) = config.active_venv() else {
            if config.warnings_enabled() {
                logger::warn(VENV_WARNING);
            }
            // No venv to wire up; let pyo3 auto-initialize against the
            // system interpreter
            pyo3::Python::initialize();
            let bridge = Bridge {
                site_packages: None,
                _lib: None,
            };
            bridge.extend_sys_path()?;
            return Ok(bridge);
        };

        if !venv_path.is_dir() {
            return Err(BridgeError::VenvNotFound(venv_path));
        }

        let python_exe = select_interpreter(&config, &venv_path)?;
        let interpreter = InterpreterInfo::discover(&python_exe)?;

        let site_packages = match resolve_site_packages(&venv_path) {
            Ok(path) => Some(path),
            Err(VenvPathError::EmptyLibDir(dir)) => {
                if config.warnings_enabled() {
                    logger::warn(&format!("No packages found in {}", dir.display()));
                }
                None
            }
            Err(VenvPathError::VenvNotFound(path)) => {
                return Err(BridgeError::VenvNotFound(path));
            }
            Err(e) => return Err(BridgeError::Initialization(e.to_string())),
        };

        env::set_var(PYTHON_LIB_ENV, &interpreter.lib_path);
        env::set_var("PYTHONHOME", &interpreter.home);
        env::set_var(
            "PYTHONPATH",
            pythonpath_value(site_packages.as_deref(), env::var_os("PYTHONPATH")),
        );
        logger::debug(&format!(
            "Set PYTHONHOME={} {}={}",
            interpreter.home.display(),
            PYTHON_LIB_ENV,
            interpreter.lib_path.display()
        ));

        let lib = LibPython::load(&interpreter.lib_path)?;

        logger::debug("Initializing Python interpreter...");
        pyo3::Python::initialize();

        let bridge = Bridge {
            site_packages,
            _lib: Some(lib),
        };
        bridge.extend_sys_path()?;

        Ok(bridge)
    }

    /// Append the current directory and site-packages to sys.path
    fn extend_sys_path(&self) -> Result<(), BridgeError> {
        let cwd = env::current_dir()?;

        pyo3::Python::attach(|py| {
            let sys = PyModule::import(py, "sys")
                .map_err(|e| BridgeError::Python(format!("Failed to import sys module: {}", e)))?;
            let path = sys.getattr("path")?;

            path.call_method1("append", (cwd.to_string_lossy().into_owned(),))?;
            if let Some(ref site_packages) = self.site_packages {
                path.call_method1("append", (site_packages.to_string_lossy().into_owned(),))?;
            }

            Ok::<(), BridgeError>(())
        })
    }

    /// The site-packages directory wired into the interpreter, if any
    pub fn site_packages(&self) -> Option<&Path> {
        self.site_packages.as_deref()
    }

    /// Import a module and call its `main()` function, returning `str(result)`
    pub fn run_module_main(&self, module_name: &str) -> Result<String, BridgeError> {
        pyo3::Python::attach(|py| {
            let module = PyModule::import(py, module_name)
                .map_err(|e| BridgeError::Import(module_name.to_string(), format!("{}", e)))?;

            if !module.hasattr("main")? {
                return Err(BridgeError::MissingEntryPoint(module_name.to_string()));
            }
            let main = module.getattr("main")?;

            logger::debug(&format!("Calling {}.main()", module_name));
            let result = main
                .call0()
                .map_err(|e| BridgeError::Python(format_python_error(py, &e)))?;

            Ok(result.str()?.extract::<String>()?)
        })
    }

    /// Import a module, call its `main()`, and serialize the result through
    /// Python's `json.dumps`
    pub fn run_module_main_json(&self, module_name: &str) -> Result<String, BridgeError> {
        pyo3::Python::attach(|py| {
            let module = PyModule::import(py, module_name)
                .map_err(|e| BridgeError::Import(module_name.to_string(), format!("{}", e)))?;

            if !module.hasattr("main")? {
                return Err(BridgeError::MissingEntryPoint(module_name.to_string()));
            }

            let result = module
                .getattr("main")?
                .call0()
                .map_err(|e| BridgeError::Python(format_python_error(py, &e)))?;

            let json = PyModule::import(py, "json")
                .map_err(|e| BridgeError::Import("json".to_string(), format!("{}", e)))?;
            let dumped = json
                .getattr("dumps")?
                .call1((result,))
                .map_err(|e| BridgeError::Python(format_python_error(py, &e)))?;

            Ok(dumped.extract::<String>()?)
        })
    }

    /// Run the `main` module as a script, mirroring `python -m main`
    pub fn run_default(&self) -> Result<(), BridgeError> {
        pyo3::Python::attach(|py| {
            let runpy = PyModule::import(py, "runpy")
                .map_err(|e| BridgeError::Import("runpy".to_string(), format!("{}", e)))?;

            let kwargs = PyDict::new(py);
            kwargs.set_item("run_name", "__main__")?;
            runpy
                .call_method("run_module", ("main",), Some(&kwargs))
                .map_err(|e| BridgeError::Python(format_python_error(py, &e)))?;

            Ok::<(), BridgeError>(())
        })
    }
}

/// Build the PYTHONPATH value: site-packages first, then any pre-existing
/// entries; empty when no site-packages was found (matching the venv-less
/// fallback behavior)
fn pythonpath_value(site_packages: Option<&Path>, existing: Option<OsString>) -> OsString {
    let Some(site_packages) = site_packages else {
        return OsString::new();
    };

    let mut paths = vec![site_packages.to_path_buf()];
    if let Some(existing) = existing {
        if !existing.is_empty() {
            paths.extend(env::split_paths(&existing));
        }
    }

    env::join_paths(paths).unwrap_or_else(|_| site_packages.as_os_str().to_os_string())
}

/// Render a Python exception with its traceback
///
/// `PyErr`'s `Display` drops the traceback; user `main()` failures are far
/// easier to act on with the frames included.
fn format_python_error(py: Python<'_>, err: &PyErr) -> String {
    let traceback = err
        .traceback(py)
        .and_then(|tb| tb.format().ok())
        .unwrap_or_default();
    format!("{}{}", traceback, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pythonpath_value_no_site_packages() {
        assert_eq!(pythonpath_value(None, None), OsString::new());
        assert_eq!(
            pythonpath_value(None, Some(OsString::from("/existing"))),
            OsString::new()
        );
    }

    #[test]
    fn test_pythonpath_value_prepends_site_packages() {
        let value = pythonpath_value(
            Some(Path::new("/venv/lib/python3.12/site-packages")),
            Some(OsString::from("/existing")),
        );
        let parts: Vec<PathBuf> = env::split_paths(&value).collect();
        assert_eq!(
            parts,
            vec![
                PathBuf::from("/venv/lib/python3.12/site-packages"),
                PathBuf::from("/existing")
            ]
        );
    }

    #[test]
    fn test_pythonpath_value_empty_existing() {
        let value = pythonpath_value(Some(Path::new("/sp")), Some(OsString::new()));
        let parts: Vec<PathBuf> = env::split_paths(&value).collect();
        assert_eq!(parts, vec![PathBuf::from("/sp")]);
    }

    #[test]
    fn test_venv_warning_mentions_activation() {
        assert!(VENV_WARNING.contains("VIRTUAL_ENV"));
        assert!(VENV_WARNING.contains("source .venv/bin/activate"));
        assert!(VENV_WARNING.contains("PYLINK_NO_WARNING"));
    }

    #[test]
    fn test_python_lib_env_name() {
        assert_eq!(PYTHON_LIB_ENV, "PYLINK_PYTHON_LIB");
    }
}
