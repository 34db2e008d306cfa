//! Command to print one configuration value.

use crate::error::CliError;
use crate::utils::{open_config, to_yaml_text, GlobalOptions};
use clap::Args;
use yconf::{Error, Schema};

/// Print the value at a dotted key.
#[derive(Args)]
pub struct GetCommand {
    /// Dotted key, e.g. `transport.port`
    #[arg(value_name = "KEY")]
    pub key: String,
}

impl GetCommand {
    /// Execute the get command.
    pub fn execute<S: Schema>(self, global: &GlobalOptions) -> Result<(), CliError> {
        let file = open_config::<S>(global)?;
        let value = match file.config().get(&self.key) {
            Ok(lookup) => lookup.to_data(),
            Err(e @ (Error::UnknownKey { .. } | Error::AliasRequired { .. })) => {
                return Err(CliError::InvalidArguments(e.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        println!("{}", to_yaml_text(&value)?);
        Ok(())
    }
}
