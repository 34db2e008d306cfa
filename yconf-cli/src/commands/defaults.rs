//! Command to print the default configuration document.

use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::Args;
use yconf::{ConfigFile, Schema};

/// Print the commented default configuration.
#[derive(Args)]
pub struct DefaultsCommand {}

impl DefaultsCommand {
    /// Execute the defaults command.
    pub fn execute<S: Schema>(self, _global: &GlobalOptions) -> Result<(), CliError> {
        println!("{}", ConfigFile::<S>::default_yaml()?);
        Ok(())
    }
}
