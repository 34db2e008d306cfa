#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # yconf
//!
//! Schema-driven YAML configuration.
//!
//! A configuration type declares its fields once. yconf turns that
//! declaration into a validation graph, checks YAML data against it with
//! readable error messages, builds an immutable record tree, applies
//! partial updates atomically and writes commented YAML documents.
//!
//! ## Core Types
//!
//! - [`Schema`], [`CompositeDecl`] and [`FieldDecl`]: declaring a schema
//! - [`Config`] and [`ConfigBuilder`]: a validated configuration
//! - [`ConfigFile`]: a configuration stored in a YAML file
//! - [`Record`] and [`Item`]: the instantiated record tree
//! - [`ValidationReport`]: every failure found in one pass
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use yconf::{CompositeDecl, Config, FieldDecl, Schema};
//!
//! struct Mail;
//!
//! impl Schema for Mail {
//!     fn declare() -> CompositeDecl {
//!         CompositeDecl::new("Mail")
//!             .doc("Mail fetcher settings.")
//!             .field(FieldDecl::new::<String>("host").default("imap.example.com"))
//!             .field(FieldDecl::new::<bool>("use_ssl").default(true))
//!     }
//! }
//!
//! let config = Config::<Mail>::new().unwrap();
//! assert_eq!(
//!     config.to_yaml().unwrap(),
//!     "# Mail fetcher settings.\n\nhost: imap.example.com\nuse_ssl: true"
//! );
//!
//! let err = Config::<Mail>::from_data(serde_yaml::from_str("host: mail\nuse_ssl: maybe").unwrap())
//!     .unwrap_err();
//! assert_eq!(err.to_string(), "'maybe' is not of type 'boolean' in section 'use_ssl'");
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod instance;
pub mod logging;
pub mod schema;
pub mod validate;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigBuilder, ConfigFile, EnvironmentConfig};
pub use error::{Error, Result, SchemaError};
pub use instance::{Item, Lookup, Record};
pub use logging::{init_logger, LogLevel, Logger};
pub use schema::{
    CompileOptions, CompositeDecl, Describe, FieldDecl, Requiredness, Schema, TypeDecl,
};
pub use validate::{ErrorKind, FieldPath, ValidationError, ValidationReport};
