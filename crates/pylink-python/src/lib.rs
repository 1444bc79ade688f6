//! Embedded Python bridge for pylink
//!
//! Wires an activated virtual environment into an in-process CPython:
//! 1. Discover the interpreter's shared library via a `sysconfig` probe
//! 2. Export PYLINK_PYTHON_LIB, PYTHONHOME, and PYTHONPATH
//! 3. dlopen libpython and initialize pyo3, once per process
//!
//! The marshaling, proxying, and memory management of Python objects are
//! pyo3's concern; this crate only bootstraps the environment around it.

mod bridge;
mod discovery;
pub mod errors;
mod loader;

pub use bridge::{Bridge, PYTHON_LIB_ENV};
pub use discovery::{select_interpreter, DiscoveryError, InterpreterInfo};
pub use errors::BridgeError;
pub use loader::{LibPython, LoadError};
