//! Command to edit the configuration file.

use crate::error::CliError;
use crate::utils::{resolve_config_path, GlobalOptions};
use clap::Args;
use std::env;
use std::path::Path;
use std::process::Command;
use yconf::{ConfigFile, Schema};

/// Open the configuration file in an editor, then validate it.
#[derive(Args)]
pub struct EditCommand {
    /// Editor command (defaults to $VISUAL, then $EDITOR)
    #[arg(long, value_name = "COMMAND")]
    pub editor: Option<String>,
}

impl EditCommand {
    /// Execute the edit command.
    pub fn execute<S: Schema>(self, global: &GlobalOptions) -> Result<(), CliError> {
        let path = resolve_config_path(global)?;
        if !path.exists() {
            ConfigFile::<S>::open_at(&path)?;
        }

        let editor = self.editor.or_else(configured_editor);
        let status = editor_command(editor.as_deref(), &path)?.status()?;
        if !status.success() {
            return Err(CliError::Config(format!("editor exited with {status}")));
        }

        ConfigFile::<S>::read(&path)?;
        if !global.quiet {
            eprintln!("Configuration is valid");
        }
        Ok(())
    }
}

fn configured_editor() -> Option<String> {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// Build the process that opens `path`.
///
/// Falls back to the platform's file opener when no editor is configured.
fn editor_command(editor: Option<&str>, path: &Path) -> Result<Command, CliError> {
    let mut command = match editor {
        Some(editor) => {
            let mut parts = editor.split_whitespace();
            let program = parts
                .next()
                .ok_or_else(|| CliError::InvalidArguments("empty editor command".to_string()))?;
            let mut command = Command::new(program);
            command.args(parts);
            command
        }
        None if cfg!(target_os = "macos") => {
            let mut command = Command::new("open");
            command.arg("-W");
            command
        }
        None if cfg!(windows) => Command::new("notepad"),
        None => Command::new("xdg-open"),
    };
    command.arg(path);
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_command_splits_arguments() {
        let command = editor_command(Some("code --wait"), Path::new("/tmp/config.yaml")).unwrap();
        assert_eq!(command.get_program(), "code");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, ["--wait", "/tmp/config.yaml"]);
    }

    #[test]
    fn test_blank_editor_is_rejected() {
        assert!(matches!(
            editor_command(Some("  "), Path::new("config.yaml")),
            Err(CliError::InvalidArguments(_))
        ));
    }
}
