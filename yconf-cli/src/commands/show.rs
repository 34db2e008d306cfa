//! Command to print the current configuration.

use crate::error::CliError;
use crate::utils::{open_config, to_json, GlobalOptions};
use clap::{Args, ValueEnum};
use yconf::Schema;

/// Print the current configuration.
#[derive(Args)]
pub struct ShowCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "yaml", ignore_case = true)]
    pub format: OutputFormat,
}

/// Output format for the show command.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Commented YAML document
    Yaml,
    /// JSON object
    Json,
    /// Indented key/value listing
    Text,
}

impl ShowCommand {
    /// Execute the show command.
    pub fn execute<S: Schema>(self, global: &GlobalOptions) -> Result<(), CliError> {
        let file = open_config::<S>(global)?;
        let config = file.config();

        let output = match self.format {
            OutputFormat::Yaml => config.to_yaml()?,
            OutputFormat::Json => serde_json::to_string_pretty(&to_json(&config.to_data()))
                .map_err(|e| CliError::Output(e.to_string()))?,
            OutputFormat::Text => config.to_string(),
        };
        println!("{output}");
        Ok(())
    }
}
