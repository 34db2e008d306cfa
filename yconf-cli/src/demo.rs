//! Schema of the demo mail fetcher.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use yconf::{CompositeDecl, Describe, FieldDecl, Schema, TypeDecl};

/// How to reach the mail server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Use an encrypted connection.
    pub use_ssl: bool,
    /// Connection timeout in seconds.
    pub timeout: Option<f64>,
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
            .field(FieldDecl::new::<u16>("port").default(993))
            .field(
                FieldDecl::new::<bool>("use_ssl")
                    .doc("Use an encrypted connection.")
                    .default(true),
            )
            .field(
                FieldDecl::new::<Option<f64>>("timeout")
                    .doc("Connection timeout in seconds; null waits forever."),
            )
    }
}

impl Describe for Transport {
    fn describe() -> TypeDecl {
        TypeDecl::composite::<Self>()
    }
}

/// What a fetch run does with remote messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Download new messages.
    Fetch,
    /// Keep local and remote state in step.
    Sync,
    /// Copy the remote mailbox exactly.
    Mirror,
}

impl Describe for Mode {
    fn describe() -> TypeDecl {
        TypeDecl::literal(["fetch", "sync", "mirror"])
    }
}

/// One mailbox folder to process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    /// Folder path on the server.
    pub path: String,
    /// Whether the folder is processed.
    pub enabled: bool,
}

impl Schema for Folder {
    fn declare() -> CompositeDecl {
        CompositeDecl::new("Folder")
            .field(FieldDecl::new::<String>("path").doc("Folder path on the server."))
            .field(FieldDecl::new::<bool>("enabled").default(true))
            .requiredness(yconf::Requiredness::Defaults)
    }
}

impl Describe for Folder {
    fn describe() -> TypeDecl {
        TypeDecl::composite::<Self>()
    }
}

/// Root settings of the demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Connection settings.
    pub transport: Transport,
    /// Processing mode.
    pub mode: Mode,
    /// Settings file imported before this one.
    pub import_: Option<String>,
    /// Folders by name.
    pub folders: BTreeMap<String, Folder>,
}

impl Schema for DemoConfig {
    fn declare() -> CompositeDecl {
        CompositeDecl::new("DemoConfig")
            .doc("Settings of the yconf demo mail fetcher.")
            .field(FieldDecl::new::<Transport>("transport"))
            .field(
                FieldDecl::new::<Mode>("mode")
                    .doc("One of fetch, sync or mirror.")
                    .default_serialized(&Mode::Fetch),
            )
            .field(
                FieldDecl::new::<Option<String>>("import_")
                    .alias("import")
                    .doc("Settings file imported before this one."),
            )
            .field(
                FieldDecl::new::<BTreeMap<String, Folder>>("folders")
                    .doc("Folders to process, by name."),
            )
    }
}
