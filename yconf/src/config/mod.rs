//! Typed configuration objects.
//!
//! [`Config`] holds one validated record tree for a schema type and keeps
//! it consistent: every replacement (update, overwrite, reset) is validated
//! as a whole and only swapped in when it succeeds. [`ConfigFile`] adds a
//! YAML file on disk.
//!
//! # Examples
//!
//! ```
//! use yconf::config::Config;
//! use yconf::schema::{CompositeDecl, FieldDecl, Schema};
//!
//! struct Settings;
//!
//! impl Schema for Settings {
//!     fn declare() -> CompositeDecl {
//!         CompositeDecl::new("Settings")
//!             .field(FieldDecl::new::<String>("host").default("localhost"))
//!             .field(FieldDecl::new::<u16>("port").default(8080))
//!     }
//! }
//!
//! let mut config = Config::<Settings>::new().unwrap();
//! config.update(&serde_yaml::from_str("port: 9090").unwrap()).unwrap();
//! assert_eq!(config.data().get("port").unwrap().as_i64(), Some(9090));
//! assert_eq!(config.data().get("host").unwrap().as_str(), Some("localhost"));
//! ```

pub mod environment;
pub mod file;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use environment::{EnvironmentConfig, CONFIG_FILE_ENV, DEFAULT_CONFIG_FILE};
pub use file::ConfigFile;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::Value;

use crate::document::{render, ValueSource};
use crate::error::{Error, Result};
use crate::instance::{externalize, instantiate, merge, Lookup, Record};
use crate::schema::{compiled, CompileOptions, CompiledSchema, Schema};
use crate::validate::validate;

enum Source {
    Defaults,
    Data(Value),
    Typed(std::result::Result<Value, serde_yaml::Error>),
}

/// Builder for [`Config`].
///
/// # Examples
///
/// ```
/// use yconf::config::ConfigBuilder;
/// use yconf::schema::{CompositeDecl, FieldDecl, Schema};
///
/// struct Settings;
///
/// impl Schema for Settings {
///     fn declare() -> CompositeDecl {
///         CompositeDecl::new("Settings").field(FieldDecl::new::<bool>("debug").default(false))
///     }
/// }
///
/// let config = ConfigBuilder::<Settings>::new()
///     .with_data(serde_yaml::from_str("debug: true\ntheme: dark").unwrap())
///     .track_extra_fields(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.data().extra().get("theme").and_then(|v| v.as_str()), Some("dark"));
/// ```
pub struct ConfigBuilder<S: Schema> {
    source: Source,
    track_extra: bool,
    marker: PhantomData<fn() -> S>,
}

impl<S: Schema> Default for ConfigBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Schema> ConfigBuilder<S> {
    /// Starts a builder that uses the schema's defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: Source::Defaults,
            track_extra: false,
            marker: PhantomData,
        }
    }

    /// Uses `data` (external keys) as the initial configuration.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.source = Source::Data(data);
        self
    }

    /// Uses a serializable Rust value (internal names) as the initial
    /// configuration.
    #[must_use]
    pub fn with_typed<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.source = Source::Typed(serde_yaml::to_value(value));
        self
    }

    /// Enables or disables extra-field tracking.
    #[must_use]
    pub fn track_extra_fields(mut self, track: bool) -> Self {
        self.track_extra = track;
        self
    }

    /// Validates the initial data and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for a malformed schema, [`Error::Validation`]
    /// when the data does not conform and [`Error::TypedConversion`] when a
    /// typed value cannot be serialized.
    pub fn build(self) -> Result<Config<S>> {
        let options = CompileOptions {
            track_extra: self.track_extra,
        };
        let schema = compiled::<S>(options)?;
        let data = match self.source {
            Source::Defaults => crate::document::default_data(schema.descriptor())?,
            Source::Data(data) => data,
            Source::Typed(value) => {
                externalize(value.map_err(Error::TypedConversion)?, schema.graph().root())
            }
        };
        let record = load(&schema, &data)?;
        Ok(Config {
            schema,
            record,
            marker: PhantomData,
        })
    }
}

/// A validated configuration for schema `S`.
pub struct Config<S: Schema> {
    schema: Arc<CompiledSchema>,
    record: Record,
    marker: PhantomData<fn() -> S>,
}

impl<S: Schema> Clone for Config<S> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            record: self.record.clone(),
            marker: PhantomData,
        }
    }
}

impl<S: Schema> fmt::Debug for Config<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("schema", &self.schema.descriptor().name)
            .field("data", &self.record.to_data())
            .finish()
    }
}

impl<S: Schema> Config<S> {
    /// Builds a configuration from the schema's defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the schema is malformed or lacks defaults.
    pub fn new() -> Result<Self> {
        ConfigBuilder::new().build()
    }

    /// Builds a configuration from data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the data does not conform.
    pub fn from_data(data: Value) -> Result<Self> {
        ConfigBuilder::new().with_data(data).build()
    }

    /// Starts a [`ConfigBuilder`].
    #[must_use]
    pub fn builder() -> ConfigBuilder<S> {
        ConfigBuilder::new()
    }

    /// Returns the root record.
    #[must_use]
    pub fn data(&self) -> &Record {
        &self.record
    }

    /// Looks up a value by dotted path of external keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownKey`] or [`Error::AliasRequired`].
    pub fn get(&self, path: &str) -> Result<Lookup<'_>> {
        self.record.field_path(path)
    }

    /// Converts the configuration into the schema's Rust type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypedConversion`] when the type does not match.
    pub fn typed(&self) -> Result<S>
    where
        S: DeserializeOwned,
    {
        self.record.to_typed()
    }

    /// Returns the declared fields keyed by external key.
    #[must_use]
    pub fn schema_data(&self) -> Value {
        self.record.schema_data()
    }

    /// Returns the tracked extra fields.
    #[must_use]
    pub fn extra_data(&self) -> Value {
        self.record.extra_data()
    }

    /// Returns everything that would be persisted.
    #[must_use]
    pub fn to_data(&self) -> Value {
        self.record.to_data()
    }

    /// Renders the current values as a commented YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error only if rendering fails.
    pub fn to_yaml(&self) -> Result<String> {
        render(self.schema.descriptor(), ValueSource::Instance(&self.record))
    }

    /// Renders the schema's defaults as a commented YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] when a field has no default.
    pub fn default_yaml() -> Result<String> {
        let schema = compiled::<S>(CompileOptions::default())?;
        render(schema.descriptor(), ValueSource::Defaults)
    }

    /// Validates arbitrary data against this configuration's schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] with every failure found.
    pub fn validate(&self, data: &Value) -> Result<()> {
        validate(data, self.schema.graph()).map_err(Error::Validation)
    }

    /// Merges a partial update. On failure nothing changes.
    ///
    /// Every composite named in `partial`, and always the root, gets a fresh
    /// set of tracked extra fields made of the unknown keys `partial` gives
    /// it. Tracked extras the update does not repeat are dropped. Untouched
    /// nested composites keep theirs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Merge`] when the merged data does not conform.
    pub fn update(&mut self, partial: &Value) -> Result<()> {
        self.record = merge(partial, &self.record, self.schema.graph())?;
        Ok(())
    }

    /// Replaces the whole configuration. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `data` does not conform.
    pub fn overwrite(&mut self, data: &Value) -> Result<()> {
        self.record = load(&self.schema, data)?;
        Ok(())
    }

    /// Restores the schema's defaults, dropping extra fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] when a field has no default.
    pub fn reset(&mut self) -> Result<()> {
        let defaults = crate::document::default_data(self.schema.descriptor())?;
        self.record = load(&self.schema, &defaults)?;
        Ok(())
    }

    /// Returns the compiled schema.
    #[must_use]
    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }
}

impl<S: Schema> fmt::Display for Config<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        pretty_lines(&self.record.to_data(), 0, &mut lines);
        let indented: Vec<String> = lines.iter().map(|line| format!("  {line}")).collect();
        write!(f, "{}", indented.join("\n"))
    }
}

/// Validates then instantiates; the single path into a record tree.
fn load(schema: &CompiledSchema, data: &Value) -> Result<Record> {
    validate(data, schema.graph()).map_err(Error::Validation)?;
    instantiate(data, schema.graph())
}

fn pretty_lines(data: &Value, indent: usize, lines: &mut Vec<String>) {
    let Value::Mapping(map) = data else {
        return;
    };
    let pad = " ".repeat(indent);
    for (key, value) in map {
        let key = crate::validate::key_text(key);
        match value {
            Value::Mapping(_) => {
                lines.push(format!("{pad}{key}:"));
                pretty_lines(value, indent + 4, lines);
            }
            other => lines.push(format!("{pad}{key}: {}", inline(other))),
        }
    }
}

fn inline(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(inline).collect();
            format!("[{}]", items.join(", "))
        }
        other => crate::validate::repr(other),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Deserialize;

    use super::*;
    use crate::schema::{CompositeDecl, Describe, FieldDecl, TypeDecl};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Transport {
        host: String,
        port: u16,
    }

    impl Schema for Transport {
        fn declare() -> CompositeDecl {
            CompositeDecl::new("Transport")
                .field(FieldDecl::new::<String>("host").default("imap.example.com"))
                .field(FieldDecl::new::<u16>("port").default(993))
        }
    }

    impl Describe for Transport {
        fn describe() -> TypeDecl {
            TypeDecl::composite::<Self>()
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Settings {
        transport: Transport,
        import_: Option<String>,
        limits: BTreeMap<String, i64>,
    }

    impl Schema for Settings {
        fn declare() -> CompositeDecl {
            CompositeDecl::new("Settings")
                .doc("Test settings.")
                .field(FieldDecl::new::<Transport>("transport"))
                .field(FieldDecl::new::<Option<String>>("import_").alias("import"))
                .field(FieldDecl::new::<BTreeMap<String, i64>>("limits"))
        }
    }

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::<Settings>::new().unwrap();
        assert_eq!(
            config.to_data(),
            yaml("transport: {host: imap.example.com, port: 993}\nimport: null\nlimits: {}")
        );
        assert_eq!(config.get("transport.port").unwrap().to_data(), Value::from(993));
    }

    #[test]
    fn test_typed_round_trip() {
        let typed = Settings {
            transport: Transport {
                host: "mail.local".to_string(),
                port: 143,
            },
            import_: Some("base".to_string()),
            limits: BTreeMap::from([("inbox".to_string(), 10)]),
        };
        let config = Config::<Settings>::builder().with_typed(&typed).build().unwrap();
        assert_eq!(config.data().get("import").unwrap().as_str(), Some("base"));
        assert_eq!(config.typed().unwrap(), typed);
    }

    #[test]
    fn test_invalid_data_is_rejected() {
        let err = Config::<Settings>::from_data(yaml("transport: {host: x}\nlimits: {}"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "'port' is a required property in section 'transport'"
        );
    }

    #[test]
    fn test_update_is_atomic() {
        let mut config = Config::<Settings>::new().unwrap();
        let before = config.to_data();
        assert!(config.update(&yaml("transport: {port: -1}")).is_err());
        assert!(config.update(&yaml("transport: {port: 70000}")).is_err());
        assert_eq!(config.to_data(), before);
        assert_eq!(config.typed().unwrap().transport.port, 993);

        config.update(&yaml("transport: {host: other}")).unwrap();
        assert_eq!(config.get("transport.host").unwrap().to_data(), Value::from("other"));
        assert_eq!(config.get("transport.port").unwrap().to_data(), Value::from(993));
    }

    #[test]
    fn test_overwrite_and_reset() {
        let mut config = Config::<Settings>::new().unwrap();
        config
            .overwrite(&yaml("transport: {host: a, port: 1}\nimport: x\nlimits: {a: 1}"))
            .unwrap();
        assert_eq!(config.get("limits.a").unwrap().to_data(), Value::from(1));

        assert!(config.overwrite(&yaml("{}")).is_err());
        assert_eq!(config.get("import").unwrap().to_data(), Value::from("x"));

        config.reset().unwrap();
        assert_eq!(config.to_data(), Config::<Settings>::new().unwrap().to_data());
    }

    #[test]
    fn test_extra_fields() {
        let config = Config::<Settings>::builder()
            .with_data(yaml(
                "transport: {host: a, port: 1, tls: true}\nimport: null\nlimits: {}\ntheme: dark",
            ))
            .track_extra_fields(true)
            .build()
            .unwrap();
        assert_eq!(config.extra_data(), yaml("theme: dark\ntransport: {tls: true}"));
        assert!(config.schema_data().get("theme").is_none());
        assert_eq!(config.get("theme").unwrap().to_data(), Value::from("dark"));
    }

    #[test]
    fn test_update_replaces_extras_of_touched_composites() {
        let mut config = Config::<Settings>::builder()
            .with_data(yaml(
                "transport: {host: a, port: 1, tls: true}\nimport: null\nlimits: {}\ntheme: dark",
            ))
            .track_extra_fields(true)
            .build()
            .unwrap();

        config.update(&yaml("import: base")).unwrap();
        assert_eq!(config.extra_data(), yaml("transport: {tls: true}"));

        config.update(&yaml("transport: {port: 2}\nlang: en")).unwrap();
        assert_eq!(config.extra_data(), yaml("lang: en"));
    }

    #[test]
    fn test_yaml_output() {
        let config = Config::<Settings>::new().unwrap();
        let text = config.to_yaml().unwrap();
        assert_eq!(text, Config::<Settings>::default_yaml().unwrap());
        assert!(text.starts_with("# Test settings.\n\ntransport:\n"));
    }

    #[test]
    fn test_display() {
        let config = Config::<Settings>::new().unwrap();
        assert_eq!(
            config.to_string(),
            "  transport:\n      host: imap.example.com\n      port: 993\n  import: null\n  limits:"
        );
    }
}
