//! Structural validation of data trees against a compiled schema.
//!
//! The validator never stops at the first problem: every field of every
//! composite is checked and all failures are collected into one
//! [`ValidationReport`].

mod report;

pub use report::{repr, ErrorKind, FieldPath, Segment, ValidationError, ValidationReport};

use serde_yaml::Value;

use crate::schema::{AdditionalPolicy, CompositeNode, Node, ValidationGraph};

/// Validates `data` against the root of `graph`.
///
/// # Errors
///
/// Returns the full [`ValidationReport`] when the data does not conform.
///
/// # Examples
///
/// ```
/// use yconf::schema::{compile, introspect_decl, CompileOptions, CompositeDecl, FieldDecl};
/// use yconf::validate::{validate, ErrorKind};
///
/// let descriptor = introspect_decl(
///     CompositeDecl::new("Root")
///         .field(FieldDecl::new::<String>("host"))
///         .field(FieldDecl::new::<i64>("port")),
/// )
/// .unwrap();
/// let graph = compile(&descriptor, CompileOptions::default()).unwrap();
///
/// let data = serde_yaml::from_str("port: x\nextra: 1").unwrap();
/// let report = validate(&data, &graph).unwrap_err();
/// assert_eq!(report.len(), 3);
/// assert_eq!(report.count(ErrorKind::MissingRequired), 1);
/// ```
pub fn validate(data: &Value, graph: &ValidationGraph) -> Result<(), ValidationReport> {
    let mut errors = Vec::new();
    check_composite(data, graph.root(), &FieldPath::root(), &mut errors);

    if errors.is_empty() {
        return Ok(());
    }

    log::error!(
        "Configuration for '{}' is invalid ({} error(s))",
        graph.root().name(),
        errors.len()
    );
    log::debug!(
        "Rejected data: {}",
        serde_yaml::to_string(data).unwrap_or_else(|_| repr(data))
    );
    Err(ValidationReport::from(errors))
}

/// Validates a value against a single node, returning every failure.
///
/// `path` is the location of `value` and prefixes every reported path.
#[must_use]
pub fn validate_node(value: &Value, node: &Node, path: &FieldPath) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check(value, node, path, &mut errors);
    errors
}

/// Returns the text used for a mapping key in paths and documents.
pub(crate) fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => repr(other),
    }
}

fn check(value: &Value, node: &Node, path: &FieldPath, errors: &mut Vec<ValidationError>) {
    match node {
        Node::Any => {}
        Node::Primitive(primitive) => {
            if let Some(message) = primitive.mismatch(value) {
                errors.push(ValidationError::new(
                    path.clone(),
                    ErrorKind::TypeMismatch,
                    message,
                ));
            }
        }
        Node::Literal(allowed) => {
            if !allowed.contains(value) {
                let choices: Vec<String> = allowed.iter().map(repr).collect();
                errors.push(ValidationError::new(
                    path.clone(),
                    ErrorKind::TypeMismatch,
                    format!("{} is not one of [{}]", repr(value), choices.join(", ")),
                ));
            }
        }
        Node::Optional(inner) => {
            if !value.is_null() {
                check(value, inner, path, errors);
            }
        }
        Node::Union(alternatives) => check_union(value, alternatives, path, errors),
        Node::Composite(composite) => check_composite(value, composite, path, errors),
        Node::Sequence(element) => match value {
            Value::Sequence(items) => {
                for (index, item) in items.iter().enumerate() {
                    check(item, element, &path.index(index), errors);
                }
            }
            other => errors.push(type_mismatch(other, "array", path)),
        },
        Node::Keyed { key, value: inner } => match value {
            Value::Mapping(map) => {
                for (k, v) in map {
                    if let Some(message) = key.mismatch(k) {
                        errors.push(ValidationError::new(
                            path.clone(),
                            ErrorKind::TypeMismatch,
                            format!("key {message}"),
                        ));
                    }
                    check(v, inner, &path.child(key_text(k)), errors);
                }
            }
            other => errors.push(type_mismatch(other, "object", path)),
        },
    }
}

fn check_union(
    value: &Value,
    alternatives: &[Node],
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) {
    let mut reasons = Vec::with_capacity(alternatives.len());
    for alternative in alternatives {
        let failures = validate_node(value, alternative, path);
        if failures.is_empty() {
            return;
        }
        let reason: Vec<String> = failures
            .iter()
            .map(|failure| {
                if failure.path == *path {
                    failure.message.clone()
                } else {
                    failure.to_string()
                }
            })
            .collect();
        reasons.push(reason.join(", "));
    }

    errors.push(ValidationError::new(
        path.clone(),
        ErrorKind::NoMatchingAlternative,
        format!(
            "{} is not valid under any of the given schemas: {}",
            repr(value),
            reasons.join("; ")
        ),
    ));
}

fn check_composite(
    value: &Value,
    node: &CompositeNode,
    path: &FieldPath,
    errors: &mut Vec<ValidationError>,
) {
    let Value::Mapping(map) = value else {
        errors.push(type_mismatch(value, "object", path));
        return;
    };

    for field in node.fields() {
        match map.get(field.key.as_str()) {
            Some(present) => check(present, &field.node, &path.child(&field.key), errors),
            None if field.required => errors.push(ValidationError::new(
                path.clone(),
                ErrorKind::MissingRequired,
                format!("'{}' is a required property", field.key),
            )),
            None => {}
        }
    }

    if node.policy() == AdditionalPolicy::Reject {
        for key in map.keys() {
            let declared = key
                .as_str()
                .is_some_and(|k| node.index_of_key(k).is_some());
            if !declared {
                errors.push(ValidationError::new(
                    path.clone(),
                    ErrorKind::UnexpectedField,
                    format!(
                        "Additional properties are not allowed ({} was unexpected)",
                        repr(key)
                    ),
                ));
            }
        }
    }
}

fn type_mismatch(value: &Value, type_name: &str, path: &FieldPath) -> ValidationError {
    ValidationError::new(
        path.clone(),
        ErrorKind::TypeMismatch,
        format!("{} is not of type '{type_name}'", repr(value)),
    )
}
