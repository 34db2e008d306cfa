//! Commented YAML document generation.
//!
//! A [`Document`] is built from a composite descriptor and a data tree and
//! rendered to text: fields appear in declaration order under their
//! external keys, each preceded by its documentation as `#` comments, and a
//! composite's own documentation opens its block. Keyed containers follow
//! the insertion order of the data. Rendering is deterministic.

mod defaults;

pub use defaults::default_data;

use std::borrow::Cow;
use std::fmt;

use serde_yaml::{Mapping, Value};

use crate::error::Result;
use crate::instance::Record;
use crate::schema::{CompositeDescriptor, TypeDescriptor};

/// Column at which comment text is wrapped.
const WRAP_WIDTH: usize = 80;

/// Where the rendered values come from.
#[derive(Debug, Clone, Copy)]
pub enum ValueSource<'a> {
    /// Declared or derived defaults.
    Defaults,
    /// The current values of a record tree, extra fields included.
    Instance(&'a Record),
    /// An arbitrary data tree.
    Data(&'a Value),
}

/// Renders a composite and a value source into YAML text.
///
/// Lines are joined with `\n`; there is no trailing newline.
///
/// # Errors
///
/// Returns [`SchemaError::MissingDefault`](crate::SchemaError::MissingDefault)
/// when rendering defaults for a field that has none.
///
/// # Examples
///
/// ```
/// use yconf::document::{render, ValueSource};
/// use yconf::schema::{introspect_decl, CompositeDecl, FieldDecl};
///
/// let descriptor = introspect_decl(
///     CompositeDecl::new("Root")
///         .field(FieldDecl::new::<String>("import_").alias("import").doc("Module to load.").default("base")),
/// )
/// .unwrap();
/// let text = render(&descriptor, ValueSource::Defaults).unwrap();
/// assert_eq!(text, "# Module to load.\nimport: base");
/// ```
pub fn render(descriptor: &CompositeDescriptor, source: ValueSource<'_>) -> Result<String> {
    let data: Cow<'_, Value> = match source {
        ValueSource::Defaults => Cow::Owned(default_data(descriptor)?),
        ValueSource::Instance(record) => Cow::Owned(record.to_data()),
        ValueSource::Data(value) => Cow::Borrowed(value),
    };
    let text = Document::new(descriptor, &data).to_string();
    log::debug!(
        "Rendered document for '{}' ({} line(s))",
        descriptor.name,
        text.lines().count()
    );
    Ok(text)
}

/// An ordered, commented block of entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Comment lines opening the block.
    pub docs: Vec<String>,
    /// Entries in output order.
    pub entries: Vec<Entry>,
}

/// One `key: value` entry of a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Rendered key text.
    pub key: String,
    /// Comment lines placed above the key.
    pub comments: Vec<String>,
    /// The value.
    pub value: Rendered,
}

/// The value side of an [`Entry`].
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// Inline text after the key.
    Scalar(String),
    /// A nested block, one level deeper.
    Block(Document),
    /// A block sequence, one level deeper.
    List(Vec<Rendered>),
}

impl Document {
    /// Builds the document for `data` shaped by `descriptor`.
    ///
    /// Declared fields come first in declaration order; undeclared keys
    /// follow without comments. A non-mapping `data` yields an empty body.
    #[must_use]
    pub fn new(descriptor: &CompositeDescriptor, data: &Value) -> Self {
        match data {
            Value::Mapping(map) => composite(descriptor, map),
            _ => Self {
                docs: descriptor.docs.clone(),
                entries: Vec::new(),
            },
        }
    }

    fn write(&self, indent: usize, out: &mut Lines) {
        for doc in &self.docs {
            out.comment(indent, doc);
        }
        if !self.docs.is_empty() {
            out.blank();
        }

        for entry in &self.entries {
            for comment in &entry.comments {
                out.comment(indent, comment);
            }
            match &entry.value {
                Rendered::Scalar(text) => out.push(indent, &format!("{}: {text}", entry.key)),
                Rendered::Block(block) => {
                    out.push(indent, &format!("{}:", entry.key));
                    block.write(indent + 1, out);
                    out.blank();
                }
                Rendered::List(items) => {
                    out.push(indent, &format!("{}:", entry.key));
                    write_items(items, indent + 1, out);
                }
            }
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = Lines::default();
        self.write(0, &mut out);
        write!(f, "{}", out.finish())
    }
}

fn write_items(items: &[Rendered], indent: usize, out: &mut Lines) {
    for item in items {
        match item {
            Rendered::Scalar(text) => out.push(indent, &format!("- {text}")),
            Rendered::Block(block) => {
                out.push(indent, "-");
                block.write(indent + 1, out);
            }
            Rendered::List(inner) => {
                out.push(indent, "-");
                write_items(inner, indent + 1, out);
            }
        }
    }
}

/// Output buffer that never emits two blank lines in a row.
#[derive(Default)]
struct Lines {
    lines: Vec<String>,
}

impl Lines {
    fn push(&mut self, indent: usize, text: &str) {
        self.lines.push(format!("{}{text}", "  ".repeat(indent)));
    }

    fn comment(&mut self, indent: usize, text: &str) {
        let width = WRAP_WIDTH.saturating_sub(indent * 2 + 2).max(20);
        for line in text.lines() {
            let wrapped = wrap(line.trim(), width);
            if wrapped.is_empty() {
                self.push(indent, "#");
            }
            for part in wrapped {
                self.push(indent, &format!("# {part}"));
            }
        }
        if text.is_empty() {
            self.push(indent, "#");
        }
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| !line.is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn finish(mut self) -> String {
        while self.lines.last().is_some_and(String::is_empty) {
            self.lines.pop();
        }
        self.lines.join("\n")
    }
}

/// Greedy word wrap; a single word longer than `width` gets its own line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn composite(descriptor: &CompositeDescriptor, map: &Mapping) -> Document {
    let mut entries = Vec::with_capacity(map.len());
    for field in &descriptor.fields {
        if let Some(value) = map.get(field.key()) {
            entries.push(Entry {
                key: scalar(&Value::from(field.key())),
                comments: field.docs.clone(),
                value: shaped(value, &field.ty),
            });
        }
    }
    for (key, value) in map {
        let declared = key
            .as_str()
            .is_some_and(|k| descriptor.field_by_key(k).is_some());
        if !declared {
            entries.push(Entry {
                key: scalar(key),
                comments: Vec::new(),
                value: plain(value),
            });
        }
    }
    Document {
        docs: descriptor.docs.clone(),
        entries,
    }
}

fn shaped(value: &Value, ty: &TypeDescriptor) -> Rendered {
    match (ty, value) {
        (TypeDescriptor::Optional(inner), value) if !value.is_null() => shaped(value, inner),
        (TypeDescriptor::Composite(descriptor), Value::Mapping(map)) => {
            block(composite(descriptor, map))
        }
        (TypeDescriptor::Keyed { value: inner, .. }, Value::Mapping(map)) => block(Document {
            docs: Vec::new(),
            entries: map
                .iter()
                .map(|(k, v)| Entry {
                    key: scalar(k),
                    comments: Vec::new(),
                    value: shaped(v, inner),
                })
                .collect(),
        }),
        (TypeDescriptor::Sequence(element), Value::Sequence(items)) => {
            list(items.iter().map(|item| shaped(item, element)).collect())
        }
        (TypeDescriptor::Union(alternatives), value) => {
            match alternatives.iter().find(|alt| fits(alt, value)) {
                Some(alternative) => shaped(value, alternative),
                None => plain(value),
            }
        }
        (_, value) => plain(value),
    }
}

/// Check whether a value has the outer shape of a type.
fn fits(ty: &TypeDescriptor, value: &Value) -> bool {
    match (ty.unwrap_optional(), value) {
        (TypeDescriptor::Any, _)
        | (TypeDescriptor::Composite(_) | TypeDescriptor::Keyed { .. }, Value::Mapping(_))
        | (TypeDescriptor::Sequence(_), Value::Sequence(_)) => true,
        (TypeDescriptor::Primitive(_) | TypeDescriptor::Literal(_), value) => {
            !value.is_mapping() && !value.is_sequence()
        }
        (TypeDescriptor::Union(alternatives), value) => {
            alternatives.iter().any(|alt| fits(alt, value))
        }
        _ => false,
    }
}

fn plain(value: &Value) -> Rendered {
    match value {
        Value::Mapping(map) => block(Document {
            docs: Vec::new(),
            entries: map
                .iter()
                .map(|(k, v)| Entry {
                    key: scalar(k),
                    comments: Vec::new(),
                    value: plain(v),
                })
                .collect(),
        }),
        Value::Sequence(items) => list(items.iter().map(plain).collect()),
        other => Rendered::Scalar(scalar(other)),
    }
}

fn block(document: Document) -> Rendered {
    if document.entries.is_empty() {
        Rendered::Scalar("{}".to_string())
    } else {
        Rendered::Block(document)
    }
}

fn list(items: Vec<Rendered>) -> Rendered {
    if items.is_empty() {
        Rendered::Scalar("[]".to_string())
    } else {
        Rendered::List(items)
    }
}

/// Inline YAML text of a scalar, quoted where plain text would not parse
/// back to the same value.
fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.contains(['\n', '\r']) => double_quoted(s),
        Value::Sequence(items) if items.is_empty() => "[]".to_string(),
        Value::Mapping(map) if map.is_empty() => "{}".to_string(),
        other => match serde_yaml::to_string(other) {
            Ok(text) if !text.trim_end().contains('\n') => text.trim_end().to_string(),
            _ => match other {
                Value::String(s) => double_quoted(s),
                _ => crate::validate::repr(other),
            },
        },
    }
}

fn double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::schema::{introspect_decl, CompositeDecl, Describe, FieldDecl, Schema, TypeDecl};

    struct Transport;

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

    fn root() -> std::sync::Arc<CompositeDescriptor> {
        introspect_decl(
            CompositeDecl::new("Root")
                .doc("Mail fetcher settings.")
                .field(FieldDecl::new::<Transport>("transport"))
                .field(FieldDecl::new::<Option<String>>("import_").alias("import"))
                .field(FieldDecl::new::<BTreeMap<String, i64>>("limits"))
                .field(FieldDecl::new::<Vec<String>>("tags").default_serialized(&["a", "b"])),
        )
        .unwrap()
    }

    #[test]
    fn test_render_defaults() {
        let text = render(&root(), ValueSource::Defaults).unwrap();
        let expected = "\
# Mail fetcher settings.

transport:
  # How to reach the mail server.

  # Server host name.
  host: imap.example.com
  port: 993
  use_ssl: false

import: null
limits: {}
tags:
  - a
  - b";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_is_idempotent() {
        let descriptor = root();
        let first = render(&descriptor, ValueSource::Defaults).unwrap();
        let second = render(&descriptor, ValueSource::Defaults).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_keyed_follows_data_order() {
        let data: Value = serde_yaml::from_str(
            "transport: {host: h, port: 1, use_ssl: true}\nimport: x\nlimits: {zeta: 1, alpha: 2}\ntags: []",
        )
        .unwrap();
        let text = render(&root(), ValueSource::Data(&data)).unwrap();
        assert!(text.contains("limits:\n  zeta: 1\n  alpha: 2"));
        assert!(text.contains("tags: []"));
        assert!(text.contains("import: x"));
    }

    #[test]
    fn test_extras_render_after_fields() {
        let data: Value = serde_yaml::from_str(
            "transport: {host: h, port: 1, use_ssl: true, color: red}\nimport: null\nlimits: {}\ntags: [a]\ntheme: {dark: true}",
        )
        .unwrap();
        let text = render(&root(), ValueSource::Data(&data)).unwrap();
        assert!(text.contains("  use_ssl: true\n  color: red"));
        assert!(text.ends_with("tags:\n  - a\ntheme:\n  dark: true"));
    }

    #[test]
    fn test_scalars_that_need_quoting() {
        assert_eq!(scalar(&Value::from("true")), "'true'");
        assert_eq!(scalar(&Value::from("42")), "'42'");
        assert_eq!(scalar(&Value::from("")), "''");
        assert_eq!(scalar(&Value::from("two\nlines")), "\"two\\nlines\"");
        assert_eq!(scalar(&Value::from("plain")), "plain");
        assert_eq!(scalar(&Value::from(1.5)), "1.5");

        for text in ["true", "42", "", "a: b", "two\nlines", "- item", "# note"] {
            let rendered = format!("key: {}", scalar(&Value::from(text)));
            let parsed: Value = serde_yaml::from_str(&rendered).unwrap();
            assert_eq!(parsed.get("key"), Some(&Value::from(text)), "{rendered}");
        }
    }

    #[test]
    fn test_long_comments_wrap() {
        let long = "word ".repeat(40);
        let lines = wrap(long.trim(), 78);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| line.len() <= 78));
        assert_eq!(lines.join(" "), long.trim());
    }

    #[test]
    fn test_sequence_of_composites() {
        let descriptor = introspect_decl(
            CompositeDecl::new("Root").field(FieldDecl::new::<Vec<Transport>>("servers")),
        )
        .unwrap();
        let data: Value = serde_yaml::from_str(
            "servers: [{host: a, port: 1, use_ssl: true}, {host: b, port: 2, use_ssl: false}]",
        )
        .unwrap();
        let text = render(&descriptor, ValueSource::Data(&data)).unwrap();
        let reparsed: Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(reparsed, data);
        assert!(text.starts_with("servers:\n  -\n    # How to reach the mail server."));
    }
}
