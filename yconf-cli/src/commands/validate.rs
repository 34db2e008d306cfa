//! Command to validate a configuration file.

use crate::error::CliError;
use crate::utils::{resolve_config_path, GlobalOptions};
use clap::Args;
use std::path::PathBuf;
use yconf::{ConfigFile, EnvironmentConfig, Schema};

/// Validate a configuration file against the schema.
#[derive(Args)]
pub struct ValidateCommand {
    /// File to validate (defaults to the configuration file)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

impl ValidateCommand {
    /// Execute the validate command.
    pub fn execute<S: Schema>(self, global: &GlobalOptions) -> Result<(), CliError> {
        let path = match self.path {
            Some(path) => EnvironmentConfig::resolve(&path)?,
            None => resolve_config_path(global)?,
        };
        if !path.exists() {
            return Err(CliError::InvalidArguments(format!(
                "File not found: {}",
                path.display()
            )));
        }

        ConfigFile::<S>::read(&path)?;
        if !global.quiet {
            println!("Configuration is valid");
        }
        Ok(())
    }
}
