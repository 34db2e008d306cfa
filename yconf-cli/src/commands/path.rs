//! Command to show the configuration file location.

use crate::error::CliError;
use crate::utils::{resolve_config_path, GlobalOptions};
use clap::Args;

/// Print the resolved configuration file path.
#[derive(Args)]
pub struct PathCommand {}

impl PathCommand {
    /// Execute the path command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let path = resolve_config_path(global)?;
        println!("{}", path.display());
        Ok(())
    }
}
