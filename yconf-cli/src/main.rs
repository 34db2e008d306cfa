//! Main entry point for the yconf demo CLI.
//!
//! Manages the configuration file of a small mail fetcher:
//! - `show`: Print the current configuration
//! - `get` / `set`: Read or change one value
//! - `validate`: Check a file against the schema
//! - `defaults` / `reset`: Print or restore the defaults
//! - `edit`: Open the file in an editor

use clap::Parser;
use yconf_cli::cli::{Cli, Command};
use yconf_cli::demo::DemoConfig;
use yconf_cli::GlobalOptions;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    yconf::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
    };

    // Execute the command
    let result = match cli.command {
        Command::Config(cmd) => cmd.execute::<DemoConfig>(&global),
        Command::Completions(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
