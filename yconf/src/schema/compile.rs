//! Compiles descriptor trees into validation graphs.
//!
//! A [`ValidationGraph`] mirrors the descriptor tree but resolves everything
//! the validator and the instantiator need per composite: which fields are
//! required, the external key of every field, key lookup tables in both
//! directions, and the effective additional-properties policy.

use std::collections::HashMap;
use std::sync::Arc;

use serde_yaml::Value;

use super::descriptor::{CompositeDescriptor, Primitive, TypeDescriptor};
use crate::error::SchemaError;
use crate::validate::{self, FieldPath};

/// Options that influence compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CompileOptions {
    /// Collect undeclared keys into an Extra Fields Map where allowed.
    pub track_extra: bool,
}

impl CompileOptions {
    /// Options with extra-field tracking enabled.
    #[must_use]
    pub const fn tracking() -> Self {
        Self { track_extra: true }
    }
}

/// What a composite does with keys it does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdditionalPolicy {
    /// Undeclared keys are validation errors.
    Reject,
    /// Undeclared keys are accepted and kept, but not exposed as extras.
    AllowUntracked,
    /// Undeclared keys are accepted and exposed through the Extra Fields Map.
    AllowTracked,
}

impl AdditionalPolicy {
    /// Resolves the policy from the declared flag and the compile options.
    ///
    /// # Examples
    ///
    /// ```
    /// use yconf::schema::{AdditionalPolicy, CompileOptions};
    ///
    /// let plain = CompileOptions::default();
    /// let tracked = CompileOptions::tracking();
    /// assert_eq!(AdditionalPolicy::resolve(None, plain), AdditionalPolicy::Reject);
    /// assert_eq!(AdditionalPolicy::resolve(None, tracked), AdditionalPolicy::AllowTracked);
    /// assert_eq!(AdditionalPolicy::resolve(Some(false), tracked), AdditionalPolicy::Reject);
    /// assert_eq!(AdditionalPolicy::resolve(Some(true), plain), AdditionalPolicy::AllowUntracked);
    /// ```
    #[must_use]
    pub fn resolve(declared: Option<bool>, options: CompileOptions) -> Self {
        match (declared, options.track_extra) {
            (Some(false), _) | (None, false) => Self::Reject,
            (Some(true), false) => Self::AllowUntracked,
            (_, true) => Self::AllowTracked,
        }
    }

    /// Check whether undeclared keys are accepted.
    #[must_use]
    pub fn allows_additional(self) -> bool {
        !matches!(self, Self::Reject)
    }
}

/// Compiled counterpart of a [`TypeDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Any value.
    Any,
    /// A scalar.
    Primitive(Primitive),
    /// A nested record.
    Composite(Arc<CompositeNode>),
    /// The inner node or null.
    Optional(Box<Node>),
    /// Alternatives, tried in order.
    Union(Vec<Node>),
    /// Allowed scalar values.
    Literal(Vec<Value>),
    /// A list of the element node.
    Sequence(Box<Node>),
    /// Pattern rule: any key of `key` type maps to `value`.
    Keyed {
        /// Type every key must have.
        key: Primitive,
        /// Node every value must satisfy.
        value: Box<Node>,
    },
}

impl Node {
    /// Returns the composite behind this node, looking through `Optional`.
    #[must_use]
    pub fn as_composite(&self) -> Option<&Arc<CompositeNode>> {
        match self {
            Self::Composite(node) => Some(node),
            Self::Optional(inner) => inner.as_composite(),
            _ => None,
        }
    }
}

/// A field with its requiredness and key resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledField {
    /// Internal name.
    pub name: String,
    /// External key.
    pub key: String,
    /// Whether the field must be present in data.
    pub required: bool,
    /// Fill value used when the field is absent.
    pub default: Option<Value>,
    /// Compiled type of the field.
    pub node: Node,
}

/// Compiled counterpart of a [`CompositeDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeNode {
    descriptor: Arc<CompositeDescriptor>,
    fields: Vec<CompiledField>,
    by_key: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    policy: AdditionalPolicy,
}

impl CompositeNode {
    /// Returns the descriptor this node was compiled from.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<CompositeDescriptor> {
        &self.descriptor
    }

    /// Returns the composite's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Returns the compiled fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    /// Returns the position of the field with the given external key.
    #[must_use]
    pub fn index_of_key(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    /// Returns the position of the field with the given internal name.
    #[must_use]
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Returns the field with the given external key.
    #[must_use]
    pub fn field_by_key(&self, key: &str) -> Option<&CompiledField> {
        self.index_of_key(key).map(|i| &self.fields[i])
    }

    /// Returns the field with the given internal name.
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&CompiledField> {
        self.index_of_name(name).map(|i| &self.fields[i])
    }

    /// Returns the effective additional-properties policy.
    #[must_use]
    pub fn policy(&self) -> AdditionalPolicy {
        self.policy
    }
}

/// A compiled schema ready for validation and instantiation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationGraph {
    root: Arc<CompositeNode>,
    options: CompileOptions,
}

impl ValidationGraph {
    /// Returns the root composite node.
    #[must_use]
    pub fn root(&self) -> &Arc<CompositeNode> {
        &self.root
    }

    /// Returns the options the graph was compiled with.
    #[must_use]
    pub fn options(&self) -> CompileOptions {
        self.options
    }
}

/// Compiles a descriptor tree.
///
/// Compilation is deterministic: the same descriptor and options always
/// produce equal graphs.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidDefault`] when a declared default does not
/// satisfy its field's type.
pub fn compile(
    descriptor: &Arc<CompositeDescriptor>,
    options: CompileOptions,
) -> Result<ValidationGraph, SchemaError> {
    let mut compiler = Compiler {
        options,
        memo: HashMap::new(),
    };
    let root = compiler.composite(descriptor)?;
    log::debug!(
        "Compiled schema '{}' ({} composite(s), {:?})",
        descriptor.name,
        compiler.memo.len(),
        options
    );
    Ok(ValidationGraph { root, options })
}

struct Compiler {
    options: CompileOptions,
    memo: HashMap<*const CompositeDescriptor, Arc<CompositeNode>>,
}

impl Compiler {
    fn composite(
        &mut self,
        descriptor: &Arc<CompositeDescriptor>,
    ) -> Result<Arc<CompositeNode>, SchemaError> {
        if let Some(node) = self.memo.get(&Arc::as_ptr(descriptor)) {
            return Ok(Arc::clone(node));
        }

        let mut fields = Vec::with_capacity(descriptor.fields.len());
        let mut by_key = HashMap::new();
        let mut by_name = HashMap::new();

        for (index, field) in descriptor.fields.iter().enumerate() {
            let node = self.node(&field.ty)?;
            if let Some(default) = &field.default {
                let errors = validate::validate_node(default, &node, &FieldPath::root());
                if !errors.is_empty() {
                    let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
                    return Err(SchemaError::InvalidDefault {
                        field: format!("{}.{}", descriptor.name, field.name),
                        reason: reasons.join("; "),
                    });
                }
            }

            by_key.insert(field.key().to_string(), index);
            by_name.insert(field.name.clone(), index);
            fields.push(CompiledField {
                name: field.name.clone(),
                key: field.key().to_string(),
                required: descriptor.is_required(field),
                default: field.default.clone(),
                node,
            });
        }

        let node = Arc::new(CompositeNode {
            descriptor: Arc::clone(descriptor),
            fields,
            by_key,
            by_name,
            policy: AdditionalPolicy::resolve(descriptor.allow_additional, self.options),
        });
        self.memo.insert(Arc::as_ptr(descriptor), Arc::clone(&node));
        Ok(node)
    }

    fn node(&mut self, ty: &TypeDescriptor) -> Result<Node, SchemaError> {
        Ok(match ty {
            TypeDescriptor::Any => Node::Any,
            TypeDescriptor::Primitive(primitive) => Node::Primitive(*primitive),
            TypeDescriptor::Composite(descriptor) => Node::Composite(self.composite(descriptor)?),
            TypeDescriptor::Optional(inner) => Node::Optional(Box::new(self.node(inner)?)),
            TypeDescriptor::Union(alternatives) => Node::Union(
                alternatives
                    .iter()
                    .map(|alternative| self.node(alternative))
                    .collect::<Result<_, _>>()?,
            ),
            TypeDescriptor::Literal(values) => Node::Literal(values.clone()),
            TypeDescriptor::Sequence(element) => Node::Sequence(Box::new(self.node(element)?)),
            TypeDescriptor::Keyed { key, value } => Node::Keyed {
                key: *key,
                value: Box::new(self.node(value)?),
            },
        })
    }
}
