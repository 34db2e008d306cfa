//! CLI command implementations.
//!
//! [`ConfigCommand`] groups the configuration management commands:
//! - `show`: Print the current configuration
//! - `get`: Print one value
//! - `set`: Change one value
//! - `path`: Print the configuration file location
//! - `validate`: Check a file against the schema
//! - `defaults`: Print the defaults document
//! - `reset`: Restore the defaults
//! - `edit`: Open the configuration file in an editor
//!
//! `completions` lives outside the group since it needs the binary's
//! top-level [`Cli`](crate::Cli).

pub mod completions;
pub mod defaults;
pub mod edit;
pub mod get;
pub mod path;
pub mod reset;
pub mod set;
pub mod show;
pub mod validate;

pub use completions::CompletionsCommand;
pub use defaults::DefaultsCommand;
pub use edit::EditCommand;
pub use get::GetCommand;
pub use path::PathCommand;
pub use reset::ResetCommand;
pub use set::SetCommand;
pub use show::ShowCommand;
pub use validate::ValidateCommand;

use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::Subcommand;
use yconf::Schema;

/// Configuration management commands, generic over the schema at run time.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the current configuration
    Show(ShowCommand),

    /// Print the value at a dotted key
    Get(GetCommand),

    /// Set the value at a dotted key
    Set(SetCommand),

    /// Print the configuration file location
    Path(PathCommand),

    /// Validate a configuration file
    Validate(ValidateCommand),

    /// Print the default configuration document
    Defaults(DefaultsCommand),

    /// Restore the default configuration
    Reset(ResetCommand),

    /// Open the configuration file in an editor
    Edit(EditCommand),
}

impl ConfigCommand {
    /// Execute the command against schema `S`.
    pub fn execute<S: Schema>(self, global: &GlobalOptions) -> Result<(), CliError> {
        match self {
            ConfigCommand::Show(cmd) => cmd.execute::<S>(global),
            ConfigCommand::Get(cmd) => cmd.execute::<S>(global),
            ConfigCommand::Set(cmd) => cmd.execute::<S>(global),
            ConfigCommand::Path(cmd) => cmd.execute(global),
            ConfigCommand::Validate(cmd) => cmd.execute::<S>(global),
            ConfigCommand::Defaults(cmd) => cmd.execute::<S>(global),
            ConfigCommand::Reset(cmd) => cmd.execute::<S>(global),
            ConfigCommand::Edit(cmd) => cmd.execute::<S>(global),
        }
    }
}
