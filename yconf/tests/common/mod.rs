//! Common test utilities for integration tests.
//!
//! Provides a small mail-fetcher schema shared by the integration suites.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use yconf::schema::{CompositeDecl, Describe, FieldDecl, Schema, TypeDecl};

/// Connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    pub host: String,
    pub port: i64,
    pub use_ssl: bool,
}

impl Schema for Transport {
    fn declare() -> CompositeDecl {
        CompositeDecl::new("Transport")
            .doc("How to reach the mail server.")
            .field(
                FieldDecl::new::<String>("host")
                    .doc("Server host name.")
                    .default("imap.example.com"),
            )
            .field(FieldDecl::new::<i64>("port").default(993))
            .field(FieldDecl::new::<bool>("use_ssl").default(false))
    }
}

impl Describe for Transport {
    fn describe() -> TypeDecl {
        TypeDecl::composite::<Self>()
    }
}

/// One mailbox folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub path: String,
    pub enabled: bool,
}

impl Schema for Folder {
    fn declare() -> CompositeDecl {
        CompositeDecl::new("Folder")
            .field(FieldDecl::new::<String>("path").default("INBOX"))
            .field(FieldDecl::new::<bool>("enabled").default(true))
    }
}

impl Describe for Folder {
    fn describe() -> TypeDecl {
        TypeDecl::composite::<Self>()
    }
}

/// Root schema of the fixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailSettings {
    pub transport: Transport,
    pub backup: Transport,
    pub import_: Option<String>,
    pub mode: String,
    pub folders: BTreeMap<String, Folder>,
}

impl Schema for MailSettings {
    fn declare() -> CompositeDecl {
        CompositeDecl::new("MailSettings")
            .doc("Mail fetcher settings.")
            .field(FieldDecl::new::<Transport>("transport"))
            .field(FieldDecl::new::<Transport>("backup"))
            .field(
                FieldDecl::new::<Option<String>>("import_")
                    .alias("import")
                    .doc("Settings file to import first."),
            )
            .field(
                FieldDecl::with_type("mode", TypeDecl::literal(["fetch", "sync"]))
                    .default("fetch"),
            )
            .field(FieldDecl::new::<BTreeMap<String, Folder>>("folders"))
    }
}

/// Parses a YAML snippet.
#[allow(dead_code)]
pub fn yaml(text: &str) -> Value {
    serde_yaml::from_str(text).expect("fixture YAML should parse")
}

/// A complete, valid document for [`MailSettings`].
#[allow(dead_code)]
pub const FULL_DOCUMENT: &str = "\
transport: {host: mail.local, port: 143, use_ssl: true}
backup: {host: backup.local, port: 993, use_ssl: false}
import: base.yaml
mode: sync
folders:
  work: {path: Work, enabled: true}
  spam: {path: Junk, enabled: false}
";
