//! Partial updates over an existing record tree.

use serde_yaml::{Mapping, Value};

use super::{instantiate, Record};
use crate::error::{Error, Result};
use crate::schema::{AdditionalPolicy, CompositeNode, Node, ValidationGraph};
use crate::validate::{repr, validate, ErrorKind, FieldPath, ValidationError, ValidationReport};

/// Applies `partial` over `existing` and returns the resulting record.
///
/// Only keys present in `partial` change. Nested composites are merged key
/// by key; every other value, keyed containers and lists included, is
/// replaced as a whole. A touched composite that tracks extra fields keeps
/// only the undeclared keys of `partial`. `existing` is never modified.
///
/// # Errors
///
/// Returns [`Error::Merge`] when `partial` is not a mapping where a
/// composite is addressed, or when the merged tree fails validation.
pub fn merge(partial: &Value, existing: &Record, graph: &ValidationGraph) -> Result<Record> {
    let mut merged = existing.to_data();
    overlay(&mut merged, partial, graph.root(), &FieldPath::root())
        .map_err(|error| Error::Merge(ValidationReport::from(vec![error])))?;

    validate(&merged, graph).map_err(Error::Merge)?;
    let record = instantiate(&merged, graph)?;
    log::debug!("Merged partial update into '{}'", record.name());
    Ok(record)
}

fn overlay(
    base: &mut Value,
    partial: &Value,
    node: &CompositeNode,
    path: &FieldPath,
) -> std::result::Result<(), ValidationError> {
    let Value::Mapping(updates) = partial else {
        return Err(ValidationError::new(
            path.clone(),
            ErrorKind::TypeMismatch,
            format!("{} is not of type 'object'", repr(partial)),
        ));
    };
    if !base.is_mapping() {
        *base = Value::Mapping(Mapping::new());
    }
    let Value::Mapping(target) = base else {
        return Ok(());
    };

    if node.policy() == AdditionalPolicy::AllowTracked {
        target.retain(|key, _| {
            key.as_str()
                .is_some_and(|k| node.index_of_key(k).is_some())
        });
    }

    for (key, value) in updates {
        let field = key.as_str().and_then(|k| node.field_by_key(k));
        let nested = field
            .and_then(|f| composite_target(&f.node))
            .filter(|_| value.is_mapping());
        if let Some(composite) = nested {
            if let Some(current) = target.get_mut(key).filter(|v| v.is_mapping()) {
                let key_path = path.child(key.as_str().unwrap_or_default());
                overlay(current, value, composite, &key_path)?;
                continue;
            }
        }
        target.insert(key.clone(), value.clone());
    }
    Ok(())
}

fn composite_target(node: &Node) -> Option<&CompositeNode> {
    node.as_composite().map(|composite| &**composite)
}
