//! In-memory representation of a schema's type graph.
//!
//! Descriptors are produced by the introspector from a [`CompositeDecl`] and
//! are immutable afterwards. The tree is finite and acyclic; the same
//! composite may appear in several places, shared through an [`Arc`].
//!
//! [`CompositeDecl`]: crate::schema::CompositeDecl

use std::fmt;
use std::sync::Arc;

use serde_yaml::{Number, Value};

use crate::validate::repr;

/// Inclusive bounds of an integer primitive.
///
/// Each Rust integer type describes itself with its own bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntRange {
    /// Smallest accepted value.
    pub min: i128,
    /// Largest accepted value.
    pub max: i128,
}

impl IntRange {
    /// Every integer a YAML document can hold.
    pub const ANY: Self = Self::new(i64::MIN as i128, u64::MAX as i128);

    /// The range of `i64`.
    pub const I64: Self = Self::new(i64::MIN as i128, i64::MAX as i128);

    /// Creates a range from inclusive bounds.
    #[must_use]
    pub const fn new(min: i128, max: i128) -> Self {
        Self { min, max }
    }

    /// Check whether `n` is an integer inside the range.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_yaml::Number;
    /// use yconf::schema::IntRange;
    ///
    /// let byte = IntRange::new(0, 255);
    /// assert!(byte.contains(&Number::from(255)));
    /// assert!(!byte.contains(&Number::from(256)));
    /// assert!(!byte.contains(&Number::from(-1)));
    /// ```
    #[must_use]
    pub fn contains(self, n: &Number) -> bool {
        integer(n).is_some_and(|n| (self.min..=self.max).contains(&n))
    }

    /// Returns the reason an integer falls outside the range.
    ///
    /// Non-integers and integers inside the range yield `None`.
    #[must_use]
    pub fn violation(self, n: &Number) -> Option<String> {
        let value = integer(n)?;
        if value < self.min {
            Some(format!("{value} is less than the minimum of {}", self.min))
        } else if value > self.max {
            Some(format!("{value} is greater than the maximum of {}", self.max))
        } else {
            None
        }
    }
}

fn integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Scalar kinds a value can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// A string.
    Str,
    /// An integer within the given bounds.
    Int(IntRange),
    /// A floating point number; integers are accepted as well.
    Float,
    /// A boolean.
    Bool,
    /// The null value.
    Null,
}

impl Primitive {
    /// Returns the JSON-Schema style type name used in error messages.
    ///
    /// # Examples
    ///
    /// ```
    /// use yconf::schema::{IntRange, Primitive};
    ///
    /// assert_eq!(Primitive::Int(IntRange::I64).type_name(), "integer");
    /// assert_eq!(Primitive::Float.type_name(), "number");
    /// ```
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Int(_) => "integer",
            Self::Float => "number",
            Self::Bool => "boolean",
            Self::Null => "null",
        }
    }

    /// Check whether `value` is an instance of this primitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_yaml::Value;
    /// use yconf::schema::{IntRange, Primitive};
    ///
    /// let port = Primitive::Int(IntRange::new(0, 65535));
    /// assert!(Primitive::Float.accepts(&Value::from(3)));
    /// assert!(!port.accepts(&Value::from(3.5)));
    /// assert!(!port.accepts(&Value::from(true)));
    /// assert!(!port.accepts(&Value::from(-1)));
    /// ```
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Str, Value::String(_))
            | (Self::Bool, Value::Bool(_))
            | (Self::Null, Value::Null)
            | (Self::Float, Value::Number(_)) => true,
            (Self::Int(range), Value::Number(n)) => range.contains(n),
            _ => false,
        }
    }

    /// Describes why `value` is not an instance of this primitive.
    ///
    /// Returns `None` when the value is accepted.
    #[must_use]
    pub fn mismatch(self, value: &Value) -> Option<String> {
        if self.accepts(value) {
            return None;
        }
        if let (Self::Int(range), Value::Number(n)) = (self, value) {
            if let Some(reason) = range.violation(n) {
                return Some(reason);
            }
        }
        Some(format!("{} is not of type '{}'", repr(value), self.type_name()))
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => write!(f, "str"),
            Self::Int(_) => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Bool => write!(f, "bool"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// The type of a field, polymorphic over the supported kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// Any value, including null.
    Any,
    /// A scalar.
    Primitive(Primitive),
    /// A nested record.
    Composite(Arc<CompositeDescriptor>),
    /// The inner type or null; the field may be omitted.
    Optional(Box<TypeDescriptor>),
    /// One of several alternatives, tried in order.
    Union(Vec<TypeDescriptor>),
    /// One of a fixed set of scalar values.
    Literal(Vec<Value>),
    /// A homogeneous list.
    Sequence(Box<TypeDescriptor>),
    /// A mapping with arbitrary keys of one scalar type and typed values.
    Keyed {
        /// Type every key must have.
        key: Primitive,
        /// Type every value must have.
        value: Box<TypeDescriptor>,
    },
}

impl TypeDescriptor {
    /// Check whether the type is wrapped in `Optional`.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Returns the type with any `Optional` wrapper removed.
    #[must_use]
    pub fn unwrap_optional(&self) -> &TypeDescriptor {
        match self {
            Self::Optional(inner) => inner.unwrap_optional(),
            other => other,
        }
    }

    /// Returns the composite behind this type, looking through `Optional`.
    #[must_use]
    pub fn as_composite(&self) -> Option<&Arc<CompositeDescriptor>> {
        match self.unwrap_optional() {
            Self::Composite(composite) => Some(composite),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Composite(c) => write!(f, "{}", c.name),
            Self::Optional(inner) => write!(f, "Optional[{inner}]"),
            Self::Union(alternatives) => {
                write!(f, "Union[")?;
                for (i, alternative) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{alternative}")?;
                }
                write!(f, "]")
            }
            Self::Literal(values) => {
                write!(f, "Literal[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", crate::validate::repr(value))?;
                }
                write!(f, "]")
            }
            Self::Sequence(element) => write!(f, "list[{element}]"),
            Self::Keyed { key, value } => write!(f, "dict[{key}, {value}]"),
        }
    }
}

/// How a composite decides which fields must be present in data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Requiredness {
    /// Every field that is not `Optional` must be present.
    #[default]
    Strict,
    /// Fields that are `Optional` or carry a default may be omitted.
    Defaults,
    /// Every field may be omitted.
    Relaxed,
}

/// One field of a composite.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Internal name of the field.
    pub name: String,
    /// Declared type.
    pub ty: TypeDescriptor,
    /// Value used when the field is absent, in document form.
    pub default: Option<Value>,
    /// External (document) key, if different from the name.
    pub alias: Option<String>,
    /// Documentation rendered as comments above the field.
    pub docs: Vec<String>,
}

impl FieldDescriptor {
    /// Returns the key under which the field appears in documents.
    ///
    /// # Examples
    ///
    /// ```
    /// use yconf::schema::{FieldDescriptor, Primitive, TypeDescriptor};
    ///
    /// let field = FieldDescriptor {
    ///     name: "import_".to_string(),
    ///     ty: TypeDescriptor::Primitive(Primitive::Str),
    ///     default: None,
    ///     alias: Some("import".to_string()),
    ///     docs: Vec::new(),
    /// };
    /// assert_eq!(field.key(), "import");
    /// ```
    #[must_use]
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A named group of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeDescriptor {
    /// Name of the composite, used in schema error messages.
    pub name: String,
    /// Documentation rendered at the top of the composite's block.
    pub docs: Vec<String>,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Declared additional-field policy; `None` when left unset.
    pub allow_additional: Option<bool>,
    /// Requiredness rule for the fields.
    pub requiredness: Requiredness,
}

impl CompositeDescriptor {
    /// Returns the field with the given internal name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the field with the given external key.
    #[must_use]
    pub fn field_by_key(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key() == key)
    }

    /// Check whether a field must be present in data.
    #[must_use]
    pub fn is_required(&self, field: &FieldDescriptor) -> bool {
        match self.requiredness {
            Requiredness::Strict => !field.ty.is_optional(),
            Requiredness::Defaults => !field.ty.is_optional() && field.default.is_none(),
            Requiredness::Relaxed => false,
        }
    }
}
