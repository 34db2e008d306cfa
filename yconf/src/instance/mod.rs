//! Typed record trees built from validated data.
//!
//! A [`Record`] is the materialized form of one composite. It exposes its
//! fields both by internal name ([`Record::attr`]) and by external key
//! ([`Record::get`]), backed by the same field table, and carries an
//! [`ExtraFields`] map for keys the schema does not declare.

mod build;
mod merge;

pub use build::instantiate;
pub use merge::merge;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::schema::{CompositeDescriptor, CompositeNode, Node};
use crate::validate::key_text;

/// The value of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A scalar, a null or a value of type `Any`.
    Value(Value),
    /// A nested composite.
    Record(Record),
    /// A list.
    Sequence(Vec<Item>),
    /// A keyed container in insertion order.
    Keyed(Vec<(Value, Item)>),
}

impl Item {
    /// Returns the plain value, if this item is one.
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the nested record, if this item is one.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the list items, if this item is a list.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Item]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries, if this item is a keyed container.
    #[must_use]
    pub fn as_keyed(&self) -> Option<&[(Value, Item)]> {
        match self {
            Self::Keyed(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the string value, if this item is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Returns the integer value, if this item is one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    /// Returns the float value, if this item is a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    /// Returns the boolean value, if this item is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_bool)
    }

    /// Check whether the item is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    /// Returns the entry of a keyed container whose key renders as `key`.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&Item> {
        self.as_keyed()?
            .iter()
            .find(|(k, _)| key_text(k) == key)
            .map(|(_, item)| item)
    }

    /// Returns the data form of the item, including extra fields.
    #[must_use]
    pub fn to_data(&self) -> Value {
        self.snapshot(Snapshot::Data)
    }

    fn snapshot(&self, kind: Snapshot) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Record(record) => record.snapshot(kind),
            Self::Sequence(items) => {
                Value::Sequence(items.iter().map(|item| item.snapshot(kind)).collect())
            }
            Self::Keyed(entries) => Value::Mapping(
                entries
                    .iter()
                    .map(|(k, item)| (k.clone(), item.snapshot(kind)))
                    .collect(),
            ),
        }
    }

    fn extra_snapshot(&self) -> Option<Value> {
        match self {
            Self::Record(record) => {
                let extra = record.extra_mapping();
                (!extra.is_empty()).then_some(Value::Mapping(extra))
            }
            Self::Keyed(entries) => {
                let nested: Mapping = entries
                    .iter()
                    .filter_map(|(k, item)| Some((k.clone(), item.extra_snapshot()?)))
                    .collect();
                (!nested.is_empty()).then_some(Value::Mapping(nested))
            }
            Self::Value(_) | Self::Sequence(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Snapshot {
    /// External keys, declared fields only.
    Schema,
    /// External keys, declared fields and every extra key.
    Data,
    /// Internal names, declared fields only.
    Internal,
}

/// Keys present in data but not declared by a composite.
///
/// Untracked extras are kept so that persisting the record does not lose
/// them, but the accessors only expose tracked extras.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraFields {
    entries: Mapping,
    tracked: bool,
}

impl ExtraFields {
    pub(crate) fn new(entries: Mapping, tracked: bool) -> Self {
        Self { entries, tracked }
    }

    /// Check whether extras are exposed through the accessors.
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        self.tracked
    }

    /// Returns the tracked extra value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        if self.tracked {
            self.entries.get(key)
        } else {
            None
        }
    }

    /// Returns a nested tracked extra value by dotted path.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = step_value(current, segment)?;
        }
        Some(current)
    }

    /// Returns the number of tracked extras.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.tracked {
            self.entries.len()
        } else {
            0
        }
    }

    /// Check whether there are no tracked extras.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the tracked extras.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().filter(|_| self.tracked)
    }

    /// Returns every undeclared key, tracked or not.
    #[must_use]
    pub fn raw(&self) -> &Mapping {
        &self.entries
    }
}

/// The result of a key lookup on a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// A declared field.
    Field(&'a Item),
    /// A tracked extra value.
    Extra(&'a Value),
}

impl Lookup<'_> {
    /// Returns the data form of the looked-up value.
    #[must_use]
    pub fn to_data(&self) -> Value {
        match self {
            Self::Field(item) => item.to_data(),
            Self::Extra(value) => (*value).clone(),
        }
    }
}

/// One materialized composite.
#[derive(Debug, Clone)]
pub struct Record {
    node: Arc<CompositeNode>,
    values: Vec<Item>,
    extra: ExtraFields,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.node, &other.node) || self.node.name() == other.node.name())
            && self.values == other.values
            && self.extra == other.extra
    }
}

impl Record {
    pub(crate) fn new(node: Arc<CompositeNode>, values: Vec<Item>, extra: ExtraFields) -> Self {
        Self {
            node,
            values,
            extra,
        }
    }

    /// Returns the composite's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.node.name()
    }

    /// Returns the descriptor of the composite.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<CompositeDescriptor> {
        self.node.descriptor()
    }

    /// Returns the compiled composite node.
    #[must_use]
    pub fn node(&self) -> &Arc<CompositeNode> {
        &self.node
    }

    /// Attribute-style access by internal field name.
    ///
    /// # Examples
    ///
    /// ```
    /// use yconf::instance::instantiate;
    /// use yconf::schema::{compile, introspect_decl, CompileOptions, CompositeDecl, FieldDecl};
    ///
    /// let descriptor = introspect_decl(
    ///     CompositeDecl::new("Root").field(FieldDecl::new::<String>("import_").alias("import")),
    /// )
    /// .unwrap();
    /// let graph = compile(&descriptor, CompileOptions::default()).unwrap();
    /// let record = instantiate(&serde_yaml::from_str("import: base").unwrap(), &graph).unwrap();
    ///
    /// assert_eq!(record.attr("import_").and_then(|i| i.as_str()), Some("base"));
    /// assert!(record.attr("import").is_none());
    /// ```
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&Item> {
        self.node.index_of_name(name).map(|i| &self.values[i])
    }

    /// Dict-style access by external key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AliasRequired`] when `key` is the internal name of
    /// an aliased field, and [`Error::UnknownKey`] when no field matches.
    pub fn get(&self, key: &str) -> Result<&Item> {
        if let Some(index) = self.node.index_of_key(key) {
            return Ok(&self.values[index]);
        }
        if let Some(field) = self.node.field_by_name(key) {
            return Err(Error::AliasRequired {
                key: key.to_string(),
                alias: field.key.clone(),
            });
        }
        Err(Error::UnknownKey {
            key: key.to_string(),
        })
    }

    /// Dict-style access that falls back to tracked extra fields.
    ///
    /// # Errors
    ///
    /// Same as [`Record::get`], when no tracked extra matches either.
    pub fn lookup(&self, key: &str) -> Result<Lookup<'_>> {
        match self.get(key) {
            Ok(item) => Ok(Lookup::Field(item)),
            Err(err @ Error::AliasRequired { .. }) => Err(err),
            Err(err) => self.extra.get(key).map(Lookup::Extra).ok_or(err),
        }
    }

    /// Walks a dotted path of external keys through nested records, keyed
    /// containers, sequences and extra values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownKey`] naming the unresolved prefix, or
    /// [`Error::AliasRequired`] when a segment uses an internal name.
    pub fn field_path(&self, path: &str) -> Result<Lookup<'_>> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut current = self.lookup(first)?;
        let mut walked = first.to_string();

        for segment in segments {
            walked.push('.');
            walked.push_str(segment);
            let unknown = || Error::UnknownKey {
                key: walked.clone(),
            };
            current = match current {
                Lookup::Field(Item::Record(record)) => match record.lookup(segment) {
                    Ok(next) => next,
                    Err(Error::UnknownKey { .. }) => return Err(unknown()),
                    Err(err) => return Err(err),
                },
                Lookup::Field(item @ Item::Keyed(_)) => {
                    Lookup::Field(item.entry(segment).ok_or_else(unknown)?)
                }
                Lookup::Field(Item::Sequence(items)) => Lookup::Field(
                    segment
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| items.get(i))
                        .ok_or_else(unknown)?,
                ),
                Lookup::Field(Item::Value(value)) => {
                    Lookup::Extra(step_value(value, segment).ok_or_else(unknown)?)
                }
                Lookup::Extra(value) => {
                    Lookup::Extra(step_value(value, segment).ok_or_else(unknown)?)
                }
            };
        }
        Ok(current)
    }

    /// Returns the extra fields of this composite.
    #[must_use]
    pub fn extra(&self) -> &ExtraFields {
        &self.extra
    }

    /// Iterate over `(field key, item)` pairs in declaration order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &Item)> {
        self.node
            .fields()
            .iter()
            .zip(&self.values)
            .map(|(field, item)| (field.key.as_str(), item))
    }

    /// Returns the declared fields keyed by external key.
    #[must_use]
    pub fn schema_data(&self) -> Value {
        self.snapshot(Snapshot::Schema)
    }

    /// Returns the tracked extra fields, nested under the keys of the
    /// composites that own them.
    #[must_use]
    pub fn extra_data(&self) -> Value {
        Value::Mapping(self.extra_mapping())
    }

    /// Returns the declared fields and every extra field, as persisted.
    #[must_use]
    pub fn to_data(&self) -> Value {
        self.snapshot(Snapshot::Data)
    }

    /// Returns the declared fields keyed by internal name.
    #[must_use]
    pub fn to_internal(&self) -> Value {
        self.snapshot(Snapshot::Internal)
    }

    /// Converts the record into a Rust value through serde.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypedConversion`] when `T` does not match the data.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T> {
        serde_yaml::from_value(self.to_internal()).map_err(Error::TypedConversion)
    }

    fn extra_mapping(&self) -> Mapping {
        let mut mapping: Mapping = self
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (field, item) in self.node.fields().iter().zip(&self.values) {
            if let Some(nested) = item.extra_snapshot() {
                mapping.insert(Value::from(field.key.as_str()), nested);
            }
        }
        mapping
    }

    fn snapshot(&self, kind: Snapshot) -> Value {
        let mut mapping = Mapping::new();
        for (field, item) in self.node.fields().iter().zip(&self.values) {
            let key = match kind {
                Snapshot::Internal => field.name.as_str(),
                Snapshot::Schema | Snapshot::Data => field.key.as_str(),
            };
            mapping.insert(Value::from(key), item.snapshot(kind));
        }
        if kind == Snapshot::Data {
            for (k, v) in self.extra.raw() {
                mapping.insert(k.clone(), v.clone());
            }
        }
        Value::Mapping(mapping)
    }
}

/// Maps internal field names in `value` to external keys, following
/// `node`. Keys that match no field are left untouched.
///
/// Used to turn a serialized Rust value into schema data.
#[must_use]
pub fn externalize(value: Value, node: &CompositeNode) -> Value {
    let Value::Mapping(map) = value else {
        return value;
    };
    let mut out = Mapping::new();
    for (k, v) in map {
        match k.as_str().and_then(|name| node.field_by_name(name)) {
            Some(field) => {
                let v = externalize_node(v, &field.node);
                out.insert(Value::from(field.key.as_str()), v);
            }
            None => {
                out.insert(k, v);
            }
        }
    }
    Value::Mapping(out)
}

fn externalize_node(value: Value, node: &Node) -> Value {
    match (node, value) {
        (Node::Composite(composite), value) => externalize(value, composite),
        (Node::Optional(inner), value) => externalize_node(value, inner),
        (Node::Sequence(element), Value::Sequence(items)) => Value::Sequence(
            items
                .into_iter()
                .map(|item| externalize_node(item, element))
                .collect(),
        ),
        (Node::Keyed { value: inner, .. }, Value::Mapping(map)) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (k, externalize_node(v, inner)))
                .collect(),
        ),
        (Node::Union(alternatives), value) => {
            match alternatives.iter().find_map(|alt| alt.as_composite()) {
                Some(composite) if value.is_mapping() => externalize(value, composite),
                _ => value,
            }
        }
        (_, value) => value,
    }
}

fn step_value<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Mapping(map) => map
            .iter()
            .find(|(k, _)| key_text(k) == segment)
            .map(|(_, v)| v),
        Value::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
