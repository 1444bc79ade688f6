//! The `run` command: import a module and call its `main()` entry point

use crate::common::GlobalOpts;
use crate::errors::CliError;
use clap::Parser;
use pylink_config::Config;
use pylink_logger as logger;
use pylink_python::Bridge;

#[derive(Parser, Debug)]
pub struct RunCommand {
    /// Python module to import; its main() is called and the result printed
    pub module: Option<String>,

    /// Serialize the result through json.dumps and pretty-print it
    #[arg(long)]
    pub json: bool,
}

const USAGE_WARNING: &str = "\
No module provided, running the `main` module (if it exists)

Usage:

    pylink run <python_module>

The module is imported inside the active virtual environment and its main()
function is called; the result is printed to stdout.

Disable this warning by setting PYLINK_NO_WARNING=true";

pub fn handle_run(cmd: RunCommand, _opts: GlobalOpts) -> Result<(), CliError> {
    logger::debug("Starting run command");

    match cmd.module {
        Some(module) => run_module(&module, cmd.json),
        None => run_default(),
    }
}

/// Initialize the bridge behind a spinner; first run can take a moment
fn bridge() -> Result<&'static Bridge, CliError> {
    logger::spinner_start("Initializing Python...");
    match Bridge::get() {
        Ok(bridge) => {
            logger::spinner_stop();
            Ok(bridge)
        }
        Err(e) => {
            logger::spinner_error("Python initialization failed");
            Err(e.into())
        }
    }
}

fn run_module(module: &str, json: bool) -> Result<(), CliError> {
    let bridge = bridge()?;

    if json {
        let raw = bridge.run_module_main_json(module)?;
        println!("{}", render_json(&raw));
    } else {
        let result = bridge.run_module_main(module)?;
        println!("{}", result);
    }

    Ok(())
}

/// Pretty-print json.dumps output when it parses, passing anything else
/// through untouched
fn render_json(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}

fn run_default() -> Result<(), CliError> {
    let config = Config::load()?;
    if config.warnings_enabled() {
        logger::warn(USAGE_WARNING);
    }

    let bridge = bridge()?;
    bridge.run_default()?;
    Ok(())
}
