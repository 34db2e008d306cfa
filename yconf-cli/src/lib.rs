//! Library exports for yconf-cli.
//!
//! [`ConfigCommand`] is a set of configuration management subcommands that
//! any application can mount for its own [`yconf::Schema`]. The `yconf-demo`
//! binary mounts it for [`demo::DemoConfig`]; the build script uses the
//! same structure to generate a man page.

pub mod cli;
pub mod commands;
pub mod demo;
pub mod error;
pub mod utils;

pub use cli::Cli;
pub use commands::ConfigCommand;
pub use error::CliError;
pub use utils::GlobalOptions;
