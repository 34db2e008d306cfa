//! Command to restore the default configuration.

use crate::error::CliError;
use crate::utils::{resolve_config_path, GlobalOptions};
use clap::Args;
use yconf::{ConfigFile, Schema};

/// Overwrite the configuration file with the defaults.
#[derive(Args)]
pub struct ResetCommand {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl ResetCommand {
    /// Execute the reset command.
    pub fn execute<S: Schema>(self, global: &GlobalOptions) -> Result<(), CliError> {
        let path = resolve_config_path(global)?;

        if path.exists() && !self.force {
            return Err(CliError::InvalidArguments(format!(
                "{} already exists. Use --force to overwrite it.",
                path.display()
            )));
        }
        ConfigFile::<S>::reset_at(&path)?;

        if !global.quiet {
            eprintln!("Reset {}", path.display());
        }
        Ok(())
    }
}
