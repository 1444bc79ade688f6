use clap::{Parser, Subcommand};
use pylink::{
    commands::{
        config::{self, ConfigAction},
        python::{self, PythonAction},
        run,
    },
    common::GlobalOpts,
};
use pylink_logger as logger;

#[derive(Parser)]
#[command(name = "pylink")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Run Python through an activated virtual environment",
    long_about = "pylink embeds the Python interpreter behind the active virtual environment \
(VIRTUAL_ENV) and runs a module's main() entry point, printing the result."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a Python module and call its main() entry point
    Run(run::RunCommand),
    /// Inspect the Python interpreter that would be embedded
    Python {
        #[command(subcommand)]
        action: PythonAction,
    },
    /// Inspect the pylink configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    let result = match cli.command {
        Commands::Run(cmd) => run::handle_run(cmd, cli.global),
        Commands::Python { action } => python::handle_python(action, cli.global),
        Commands::Config { action } => config::handle_config(action, cli.global),
    };

    if let Err(e) = result {
        logger::error(&format!("{}", e));
        std::process::exit(1);
    }
}
