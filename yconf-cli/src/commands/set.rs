//! Command to change one configuration value.

use crate::error::CliError;
use crate::utils::{open_config, parse_value, partial_update, GlobalOptions};
use clap::Args;
use yconf::Schema;

/// Set the value at a dotted key and save the file.
#[derive(Args)]
pub struct SetCommand {
    /// Dotted key, e.g. `transport.port`
    #[arg(value_name = "KEY")]
    pub key: String,

    /// New value, parsed as YAML (`143`, `true`, `null`, `[a, b]`)
    #[arg(value_name = "VALUE", allow_hyphen_values = true)]
    pub value: String,
}

impl SetCommand {
    /// Execute the set command.
    pub fn execute<S: Schema>(self, global: &GlobalOptions) -> Result<(), CliError> {
        let partial = partial_update(&self.key, parse_value(&self.value))?;
        let mut file = open_config::<S>(global)?;
        file.update(&partial)?;

        if !global.quiet {
            eprintln!("Set {} = {}", self.key, self.value);
        }
        Ok(())
    }
}
