//! Inspect the persisted pylink configuration

use crate::common::GlobalOpts;
use crate::errors::CliError;
use clap::Subcommand;
use colored::Colorize;
use pylink_config::Config;
use pylink_logger as logger;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the current configuration values
    Show,
    /// Print the config file path
    Path,
}

pub fn handle_config(action: ConfigAction, _opts: GlobalOpts) -> Result<(), CliError> {
    match action {
        ConfigAction::Show => handle_show(),
        ConfigAction::Path => {
            println!("{}", Config::path().display());
            Ok(())
        }
    }
}

fn handle_show() -> Result<(), CliError> {
    logger::debug("Handling config show command");
    let config = Config::load()?;

    println!("{}", "Configuration:".bold().green());
    println!(
        "  venv_path: {}",
        config.venv_path.as_deref().unwrap_or("not set")
    );
    println!(
        "  python: {}",
        config.python.as_deref().unwrap_or("not set")
    );
    println!(
        "  suppress_warnings: {}",
        config
            .suppress_warnings
            .map_or("not set".to_string(), |v| v.to_string())
    );
    println!("  file: {}", Config::path().display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_action() {
        let opts = GlobalOpts {
            quiet: false,
            verbose: 0,
        };
        assert!(handle_config(ConfigAction::Path, opts).is_ok());
    }
}
