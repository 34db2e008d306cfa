//! Common test utilities for CLI integration tests.
//!
//! Provides an isolated configuration file location per test and command
//! builders that point the binary at it.

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test environment with an isolated configuration file.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path of the configuration file (not created yet)
    pub config_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("settings").join("demo.yaml");
        Self {
            temp_dir,
            config_path,
        }
    }

    /// Get a bare command builder without pre-configured flags.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("yconf-demo").expect("Failed to find yconf-demo binary");
        cmd.env_remove("YCONF_CONFIG_FILE").env_remove("YCONF_LOG_MODE");
        cmd
    }

    /// Get a command builder with `--config` pointing at the test file.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--config").arg(&self.config_path);
        cmd
    }

    /// Write the configuration file.
    pub fn write_config(&self, contents: &str) {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create config dir");
        }
        std::fs::write(&self.config_path, contents).expect("Failed to write config");
    }

    /// Read the configuration file.
    pub fn read_config(&self) -> String {
        std::fs::read_to_string(&self.config_path).expect("Failed to read config")
    }
}

/// A valid document for the demo schema.
#[allow(dead_code)]
pub const VALID_CONFIG: &str = "\
transport:
  host: mail.local
  port: 143
  use_ssl: false
  timeout: 30.0
mode: sync
import: base.yaml
folders:
  work:
    path: Work
    enabled: true
";
