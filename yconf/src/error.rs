//! Error types for the yconf library.
//!
//! This module provides the error hierarchy for every stage of the
//! configuration pipeline, using `thiserror` for ergonomic error handling.
//! Schema problems are programmer errors and surface as [`SchemaError`];
//! problems with user data surface as a [`ValidationReport`] carried by
//! [`Error::Validation`] or [`Error::Merge`].

use std::path::PathBuf;

use thiserror::Error;

use crate::validate::ValidationReport;

/// Result type alias for operations that may fail with a yconf error.
///
/// # Examples
///
/// ```
/// use yconf::{Error, Result};
///
/// fn example_operation() -> Result<u16> {
///     Ok(993)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the yconf library.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema declaration is malformed.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Loaded data does not conform to the schema.
    #[error("{0}")]
    Validation(ValidationReport),

    /// A partial update does not conform to the schema once applied.
    #[error("invalid update: {0}")]
    Merge(ValidationReport),

    /// Data could not be turned into a record tree.
    ///
    /// Only raised when unvalidated data is handed to the instantiator.
    #[error("cannot instantiate '{path}': {message}")]
    Instantiation {
        /// Dotted path of the offending value.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// Dict-style access used the internal name of an aliased field.
    #[error("field '{key}' has an alias; use ['{alias}'] instead of ['{key}']")]
    AliasRequired {
        /// The key that was used.
        key: String,
        /// The alias that must be used instead.
        alias: String,
    },

    /// The requested key is neither a field nor a tracked extra field.
    #[error("unknown configuration key '{key}'")]
    UnknownKey {
        /// The key that was not found.
        key: String,
    },

    /// The record tree could not be converted into the requested Rust type.
    #[error("cannot convert configuration into typed value: {0}")]
    TypedConversion(#[source] serde_yaml::Error),

    /// YAML text could not be parsed or produced.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An invalid filesystem path was provided.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
        /// The reason the path is invalid.
        reason: String,
    },
}

impl Error {
    /// Returns the validation report if this error carries one.
    ///
    /// # Examples
    ///
    /// ```
    /// use yconf::Error;
    ///
    /// let err = Error::UnknownKey { key: "nope".into() };
    /// assert!(err.report().is_none());
    /// ```
    #[must_use]
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Validation(report) | Self::Merge(report) => Some(report),
            _ => None,
        }
    }

    /// Check if error was caused by user data rather than the schema or I/O.
    #[must_use]
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Merge(_) | Self::Yaml(_) | Self::TypedConversion(_)
        )
    }
}

/// A malformed schema declaration.
///
/// Raised while introspecting or compiling a schema; never recoverable by
/// changing the data being validated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A declared field type is not one of the supported kinds.
    #[error("unsupported type for field '{field}': {reason}")]
    Unsupported {
        /// Qualified field name (`Composite.field`).
        field: String,
        /// Why the type is unsupported.
        reason: String,
    },

    /// A composite nests itself, directly or transitively.
    #[error("composite '{name}' refers to itself ({chain})")]
    Recursive {
        /// The composite that closes the cycle.
        name: String,
        /// The chain of composites forming the cycle.
        chain: String,
    },

    /// Two fields of one composite share a name or an effective key.
    #[error("key '{key}' is declared more than once in '{composite}'")]
    DuplicateKey {
        /// The composite declaring the fields.
        composite: String,
        /// The colliding name or key.
        key: String,
    },

    /// A union was declared without alternatives.
    #[error("union for field '{field}' has no alternatives")]
    EmptyUnion {
        /// Qualified field name.
        field: String,
    },

    /// A literal set is empty or holds a non-scalar value.
    #[error("literal for field '{field}' is invalid: {reason}")]
    InvalidLiteral {
        /// Qualified field name.
        field: String,
        /// Why the literal is invalid.
        reason: String,
    },

    /// A keyed container uses a key type other than str, int or bool.
    #[error("keyed container for field '{field}' has unsupported key type '{key}'")]
    UnsupportedKey {
        /// Qualified field name.
        field: String,
        /// The rejected key type.
        key: String,
    },

    /// A default value does not match its field's declared type.
    #[error("default for field '{field}' is invalid: {reason}")]
    InvalidDefault {
        /// Qualified field name.
        field: String,
        /// Why the default is invalid.
        reason: String,
    },

    /// A field has no default and none can be derived from its type.
    #[error("field '{field}' has no default value; declare one to generate a default document")]
    MissingDefault {
        /// Qualified field name.
        field: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{ErrorKind, FieldPath, ValidationError};

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::Recursive {
            name: "Node".to_string(),
            chain: "Node -> Node".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("Node"));
        assert!(display.contains("refers to itself"));
    }

    #[test]
    fn test_schema_error_conversion() {
        let err: Error = SchemaError::EmptyUnion {
            field: "Root.mode".to_string(),
        }
        .into();
        let display = format!("{err}");
        assert!(display.starts_with("schema error"));
        assert!(display.contains("Root.mode"));
    }

    #[test]
    fn test_validation_error_display() {
        let report = ValidationReport::from(vec![ValidationError::new(
            FieldPath::root().child("transport"),
            ErrorKind::MissingRequired,
            "'use_ssl' is a required property",
        )]);
        let err = Error::Validation(report);
        assert_eq!(
            format!("{err}"),
            "'use_ssl' is a required property in section 'transport'"
        );
        assert!(err.report().is_some());
        assert!(err.is_data_error());
    }

    #[test]
    fn test_alias_required_error() {
        let err = Error::AliasRequired {
            key: "import_".to_string(),
            alias: "import".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("['import']"));
        assert!(display.contains("['import_']"));
        assert!(!err.is_data_error());
    }

    #[test]
    fn test_invalid_path_error() {
        let err = Error::InvalidPath {
            path: PathBuf::from("~other/config.yaml"),
            reason: "~user syntax is not supported".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("invalid path"));
        assert!(display.contains("~other"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(format!("{err}").contains("I/O error"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<u16> {
            Err(Error::UnknownKey {
                key: "missing".to_string(),
            })
        }

        assert!(returns_result().is_err());
    }
}
