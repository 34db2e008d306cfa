//! Turns schema declarations into descriptor trees.
//!
//! Introspection fails fast: the first malformed declaration aborts the walk
//! with a [`SchemaError`].

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_yaml::Value;

use super::declare::{CompositeDecl, CompositeRef, Schema, TypeDecl};
use super::descriptor::{CompositeDescriptor, FieldDescriptor, Primitive, TypeDescriptor};
use crate::error::SchemaError;

/// Introspects the composite declared by `S`.
///
/// # Errors
///
/// Returns a [`SchemaError`] when the declaration is malformed, including
/// when a composite is reachable from itself.
///
/// # Examples
///
/// ```
/// use yconf::schema::{introspect, CompositeDecl, FieldDecl, Schema};
///
/// struct Settings;
///
/// impl Schema for Settings {
///     fn declare() -> CompositeDecl {
///         CompositeDecl::new("Settings").field(FieldDecl::new::<i64>("retries").default(3))
///     }
/// }
///
/// let descriptor = introspect::<Settings>().unwrap();
/// assert_eq!(descriptor.fields[0].name, "retries");
/// ```
pub fn introspect<S: Schema>() -> Result<Arc<CompositeDescriptor>, SchemaError> {
    Introspector::default().composite(CompositeRef::of::<S>())
}

/// Introspects a composite declaration that is not attached to a type.
///
/// # Errors
///
/// Returns a [`SchemaError`] when the declaration is malformed.
pub fn introspect_decl(decl: CompositeDecl) -> Result<Arc<CompositeDescriptor>, SchemaError> {
    Introspector::default().build(decl)
}

#[derive(Default)]
struct Introspector {
    /// Composites currently being expanded, outermost first.
    stack: Vec<(TypeId, String)>,
    memo: HashMap<TypeId, Arc<CompositeDescriptor>>,
}

impl Introspector {
    fn composite(&mut self, reference: CompositeRef) -> Result<Arc<CompositeDescriptor>, SchemaError> {
        if let Some(descriptor) = self.memo.get(&reference.id) {
            return Ok(Arc::clone(descriptor));
        }

        let decl = (reference.declare)();
        if let Some(start) = self.stack.iter().position(|(id, _)| *id == reference.id) {
            let mut chain: Vec<&str> = self.stack[start..]
                .iter()
                .map(|(_, name)| name.as_str())
                .collect();
            chain.push(&decl.name);
            return Err(SchemaError::Recursive {
                name: decl.name.clone(),
                chain: chain.join(" -> "),
            });
        }

        self.stack.push((reference.id, decl.name.clone()));
        let result = self.build(decl);
        self.stack.pop();

        let descriptor = result?;
        self.memo.insert(reference.id, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    fn build(&mut self, decl: CompositeDecl) -> Result<Arc<CompositeDescriptor>, SchemaError> {
        let mut names = HashSet::new();
        let mut keys = HashSet::new();
        let mut fields = Vec::with_capacity(decl.fields.len());

        for field in decl.fields {
            let qualified = format!("{}.{}", decl.name, field.name);
            let key = field.alias.clone().unwrap_or_else(|| field.name.clone());

            if !names.insert(field.name.clone()) {
                return Err(SchemaError::DuplicateKey {
                    composite: decl.name.clone(),
                    key: field.name,
                });
            }
            if !keys.insert(key.clone()) {
                return Err(SchemaError::DuplicateKey {
                    composite: decl.name.clone(),
                    key,
                });
            }

            let ty = self.resolve(&qualified, field.ty)?;
            let default = field
                .default
                .transpose()
                .map_err(|reason| SchemaError::InvalidDefault {
                    field: qualified.clone(),
                    reason,
                })?;

            fields.push(FieldDescriptor {
                name: field.name,
                ty,
                default,
                alias: field.alias,
                docs: field.docs,
            });
        }

        log::debug!(
            "Introspected composite '{}' with {} field(s)",
            decl.name,
            fields.len()
        );

        Ok(Arc::new(CompositeDescriptor {
            name: decl.name,
            docs: decl.docs,
            fields,
            allow_additional: decl.allow_additional,
            requiredness: decl.requiredness,
        }))
    }

    fn resolve(&mut self, field: &str, ty: TypeDecl) -> Result<TypeDescriptor, SchemaError> {
        match ty {
            TypeDecl::Any => Ok(TypeDescriptor::Any),
            TypeDecl::Primitive(primitive) => Ok(TypeDescriptor::Primitive(primitive)),
            TypeDecl::Composite(reference) => {
                Ok(TypeDescriptor::Composite(self.composite(reference)?))
            }
            TypeDecl::Optional(inner) => Ok(optional(self.resolve(field, *inner)?)),
            TypeDecl::Union(alternatives) => self.union(field, alternatives),
            TypeDecl::Literal(values) => literal(field, values),
            TypeDecl::Sequence(element) => Ok(TypeDescriptor::Sequence(Box::new(
                self.resolve(field, *element)?,
            ))),
            TypeDecl::Keyed(key, value) => {
                let key = match self.resolve(field, *key)? {
                    TypeDescriptor::Primitive(
                        primitive @ (Primitive::Str | Primitive::Int(_) | Primitive::Bool),
                    ) => primitive,
                    other => {
                        return Err(SchemaError::UnsupportedKey {
                            field: field.to_string(),
                            key: other.to_string(),
                        })
                    }
                };
                Ok(TypeDescriptor::Keyed {
                    key,
                    value: Box::new(self.resolve(field, *value)?),
                })
            }
            TypeDecl::Unsupported(reason) => Err(SchemaError::Unsupported {
                field: field.to_string(),
                reason,
            }),
        }
    }

    /// Flattens nested unions and moves null alternatives into an `Optional`.
    fn union(
        &mut self,
        field: &str,
        alternatives: Vec<TypeDecl>,
    ) -> Result<TypeDescriptor, SchemaError> {
        if alternatives.is_empty() {
            return Err(SchemaError::EmptyUnion {
                field: field.to_string(),
            });
        }

        let mut nullable = false;
        let mut flat = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let mut pending = vec![self.resolve(field, alternative)?];
            while let Some(resolved) = pending.pop() {
                match resolved {
                    TypeDescriptor::Primitive(Primitive::Null) => nullable = true,
                    TypeDescriptor::Optional(inner) => {
                        nullable = true;
                        pending.push(*inner);
                    }
                    TypeDescriptor::Union(nested) => pending.extend(nested.into_iter().rev()),
                    other => flat.push(other),
                }
            }
        }

        let resolved = match flat.len() {
            0 => return Ok(TypeDescriptor::Primitive(Primitive::Null)),
            1 => flat.remove(0),
            _ => TypeDescriptor::Union(flat),
        };
        Ok(if nullable { optional(resolved) } else { resolved })
    }
}

fn optional(inner: TypeDescriptor) -> TypeDescriptor {
    match inner {
        TypeDescriptor::Optional(_) => inner,
        other => TypeDescriptor::Optional(Box::new(other)),
    }
}

fn literal(field: &str, values: Vec<Value>) -> Result<TypeDescriptor, SchemaError> {
    if values.is_empty() {
        return Err(SchemaError::InvalidLiteral {
            field: field.to_string(),
            reason: "no values given".to_string(),
        });
    }
    if let Some(value) = values
        .iter()
        .find(|v| matches!(v, Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_)))
    {
        return Err(SchemaError::InvalidLiteral {
            field: field.to_string(),
            reason: format!("{} is not a scalar", crate::validate::repr(value)),
        });
    }
    Ok(TypeDescriptor::Literal(values))
}
