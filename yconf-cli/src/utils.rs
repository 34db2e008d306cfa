//! Utility functions for CLI operations.
//!
//! This module provides common helpers used across CLI commands: config
//! path resolution, loading the file wrapper and turning `key=value` style
//! arguments into partial updates.

use crate::error::CliError;
use serde_yaml::{Mapping, Value};
use std::path::PathBuf;
use yconf::{ConfigFile, EnvironmentConfig, Schema};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the configuration file location.
    pub config: Option<PathBuf>,
}

/// Resolve the configuration file path from global options.
///
/// Priority: `--config` (or `YCONF_CONFIG_FILE` through clap) > library
/// default.
pub fn resolve_config_path(global: &GlobalOptions) -> Result<PathBuf, CliError> {
    let path = match &global.config {
        Some(path) => EnvironmentConfig::resolve(path)?,
        None => EnvironmentConfig::config_file()?,
    };
    Ok(path)
}

/// Open the configuration file, creating it from defaults when missing.
pub fn open_config<S: Schema>(global: &GlobalOptions) -> Result<ConfigFile<S>, CliError> {
    let path = resolve_config_path(global)?;
    Ok(ConfigFile::open_at(path)?)
}

/// Parse a command-line value as YAML.
///
/// Text that is not valid YAML is taken as a plain string.
pub fn parse_value(raw: &str) -> Value {
    serde_yaml::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Build a partial update from a dotted key and a value.
///
/// `transport.port` and `143` become `{transport: {port: 143}}`.
pub fn partial_update(key: &str, value: Value) -> Result<Value, CliError> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(CliError::InvalidArguments(format!("invalid key: '{key}'")));
    }

    let mut current = value;
    for segment in segments.into_iter().rev() {
        let mut mapping = Mapping::new();
        mapping.insert(Value::from(segment), current);
        current = Value::Mapping(mapping);
    }
    Ok(current)
}

/// Convert a YAML value into JSON.
///
/// Mapping keys that are not strings are written in their YAML spelling, so
/// `{1: a}` becomes `{"1": "a"}`. Non-finite floats become `null`.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into()
            } else if let Some(u) = n.as_u64() {
                u.into()
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number)
            }
        }
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Sequence(items) => items.iter().map(to_json).collect(),
        Value::Mapping(map) => serde_json::Value::Object(
            map.iter().map(|(k, v)| (json_key(k), to_json(v))).collect(),
        ),
        Value::Tagged(tagged) => to_json(&tagged.value),
    }
}

fn json_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Render a value as YAML without the trailing newline.
pub fn to_yaml_text(value: &Value) -> Result<String, CliError> {
    let text = serde_yaml::to_string(value).map_err(|e| CliError::Output(e.to_string()))?;
    Ok(text.trim_end().to_string())
}
