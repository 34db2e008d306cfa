//! Instantiation of validated data into record trees.

use std::sync::Arc;

use serde_yaml::{Mapping, Value};

use super::{ExtraFields, Item, Record};
use crate::error::{Error, Result};
use crate::schema::{AdditionalPolicy, CompiledField, CompositeNode, Node, ValidationGraph};
use crate::validate::{key_text, repr, validate_node, FieldPath};

/// Builds a record tree from data that has passed validation.
///
/// Absent fields are filled from their default, then with null when the
/// field is optional. Undeclared keys land in the owning record's
/// [`ExtraFields`](super::ExtraFields).
///
/// # Errors
///
/// Fails fast with [`Error::Instantiation`] on the first value that does not
/// fit the graph, which only happens for data that skipped validation.
pub fn instantiate(data: &Value, graph: &ValidationGraph) -> Result<Record> {
    let record = build_record(data, graph.root(), &FieldPath::root())?;
    log::debug!("Instantiated record tree for '{}'", record.name());
    Ok(record)
}

fn build_record(data: &Value, node: &Arc<CompositeNode>, path: &FieldPath) -> Result<Record> {
    let Value::Mapping(map) = data else {
        return Err(failure(path, format!("{} is not a mapping", repr(data))));
    };

    let mut values = Vec::with_capacity(node.fields().len());
    for field in node.fields() {
        let field_path = path.child(&field.key);
        let item = match map.get(field.key.as_str()) {
            Some(value) => build_item(value, &field.node, &field_path)?,
            None => absent(field, &field_path)?,
        };
        values.push(item);
    }

    let mut extra = Mapping::new();
    for (key, value) in map {
        let declared = key
            .as_str()
            .is_some_and(|k| node.index_of_key(k).is_some());
        if declared {
            continue;
        }
        if node.policy() == AdditionalPolicy::Reject {
            return Err(failure(
                path,
                format!("unexpected field {} in '{}'", repr(key), node.name()),
            ));
        }
        extra.insert(key.clone(), value.clone());
    }

    let tracked = node.policy() == AdditionalPolicy::AllowTracked;
    Ok(Record::new(
        Arc::clone(node),
        values,
        ExtraFields::new(extra, tracked),
    ))
}

fn absent(field: &CompiledField, path: &FieldPath) -> Result<Item> {
    if let Some(default) = &field.default {
        return build_item(default, &field.node, path);
    }
    if field.required {
        return Err(failure(path, "required field is missing".to_string()));
    }
    Ok(match &field.node {
        Node::Composite(composite) => {
            Item::Record(build_record(&Value::Mapping(Mapping::new()), composite, path)?)
        }
        Node::Keyed { .. } => Item::Keyed(Vec::new()),
        Node::Sequence(_) => Item::Sequence(Vec::new()),
        _ => Item::Value(Value::Null),
    })
}

fn build_item(value: &Value, node: &Node, path: &FieldPath) -> Result<Item> {
    match node {
        Node::Any => Ok(Item::Value(value.clone())),
        Node::Primitive(primitive) => match primitive.mismatch(value) {
            None => Ok(Item::Value(value.clone())),
            Some(message) => Err(failure(path, message)),
        },
        Node::Literal(allowed) => {
            if allowed.contains(value) {
                Ok(Item::Value(value.clone()))
            } else {
                Err(failure(path, format!("{} is not an allowed value", repr(value))))
            }
        }
        Node::Optional(inner) => {
            if value.is_null() {
                Ok(Item::Value(Value::Null))
            } else {
                build_item(value, inner, path)
            }
        }
        Node::Union(alternatives) => {
            let chosen = alternatives
                .iter()
                .find(|alternative| validate_node(value, alternative, path).is_empty())
                .ok_or_else(|| failure(path, format!("{} matches no alternative", repr(value))))?;
            build_item(value, chosen, path)
        }
        Node::Composite(composite) => Ok(Item::Record(build_record(value, composite, path)?)),
        Node::Sequence(element) => {
            let Value::Sequence(items) = value else {
                return Err(failure(path, format!("{} is not a list", repr(value))));
            };
            items
                .iter()
                .enumerate()
                .map(|(index, item)| build_item(item, element, &path.index(index)))
                .collect::<Result<Vec<_>>>()
                .map(Item::Sequence)
        }
        Node::Keyed { key, value: inner } => {
            let Value::Mapping(map) = value else {
                return Err(failure(path, format!("{} is not a mapping", repr(value))));
            };
            let mut entries = Vec::with_capacity(map.len());
            for (k, v) in map {
                if let Some(message) = key.mismatch(k) {
                    return Err(failure(path, format!("key {message}")));
                }
                entries.push((k.clone(), build_item(v, inner, &path.child(key_text(k)))?));
            }
            Ok(Item::Keyed(entries))
        }
    }
}

fn failure(path: &FieldPath, message: String) -> Error {
    Error::Instantiation {
        path: path.to_string(),
        message,
    }
}
