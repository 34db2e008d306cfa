//! CLI-specific error types with exit codes.
//!
//! This module defines error types specific to the CLI layer,
//! wrapping library errors and providing appropriate exit codes.

use std::fmt;
use yconf::Error as LibError;

/// CLI-specific error type with exit code mapping.
#[derive(Debug)]
pub enum CliError {
    /// Library error (wrapped).
    Library(LibError),

    /// Invalid command-line arguments.
    InvalidArguments(String),

    /// I/O error.
    Io(std::io::Error),

    /// Configuration error that did not come from the library.
    Config(String),

    /// Output could not be produced in the requested format.
    Output(String),
}

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: Validation or update failure
    /// - 4: Invalid arguments
    /// - 5: I/O error
    /// - 6: Other library error
    /// - 7: Configuration or schema error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Library(lib_err) => match lib_err {
                LibError::Validation(_) | LibError::Merge(_) => 1,
                LibError::Io(_) => 5,
                LibError::Schema(_) | LibError::Yaml(_) | LibError::InvalidPath { .. } => 7,
                _ => 6,
            },
            CliError::InvalidArguments(_) => 4,
            CliError::Io(_) => 5,
            CliError::Output(_) => 6,
            CliError::Config(_) => 7,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Library(LibError::Validation(report)) => {
                write!(f, "Configuration is invalid:\n{report}")
            }
            CliError::Library(e) => write!(f, "{e}"),
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
            CliError::Config(msg) => write!(f, "Configuration error: {msg}"),
            CliError::Output(msg) => write!(f, "Output error: {msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Library(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibError> for CliError {
    fn from(e: LibError) -> Self {
        CliError::Library(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yconf::validate::{ErrorKind, FieldPath, ValidationError, ValidationReport};

    fn report() -> ValidationReport {
        ValidationReport::from(vec![ValidationError::new(
            FieldPath::root().child("port"),
            ErrorKind::TypeMismatch,
            "'x' is not of type 'integer'",
        )])
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Library(LibError::Validation(report())).exit_code(), 1);
        assert_eq!(CliError::Library(LibError::Merge(report())).exit_code(), 1);
        assert_eq!(
            CliError::Library(LibError::UnknownKey {
                key: "x".to_string()
            })
            .exit_code(),
            6
        );
        assert_eq!(CliError::InvalidArguments(String::new()).exit_code(), 4);
        assert_eq!(
            CliError::Io(std::io::Error::from(std::io::ErrorKind::NotFound)).exit_code(),
            5
        );
        assert_eq!(CliError::Config(String::new()).exit_code(), 7);
    }

    #[test]
    fn test_validation_display_lists_errors() {
        let err = CliError::Library(LibError::Validation(report()));
        assert_eq!(
            err.to_string(),
            "Configuration is invalid:\n'x' is not of type 'integer' in section 'port'"
        );
    }
}
