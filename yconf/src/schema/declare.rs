//! Declaration API for configuration schemas.
//!
//! Rust types opt into being configuration schemas by implementing
//! [`Schema`] for composite records and [`Describe`] for anything that can
//! appear as a field type.
//!
//! # Examples
//!
//! ```
//! use yconf::schema::{CompositeDecl, Describe, FieldDecl, Schema, TypeDecl};
//!
//! struct Transport;
//!
//! impl Schema for Transport {
//!     fn declare() -> CompositeDecl {
//!         CompositeDecl::new("Transport")
//!             .doc("Connection settings.")
//!             .field(FieldDecl::new::<String>("host").default("imap.example.com"))
//!             .field(FieldDecl::new::<u16>("port").default(993))
//!     }
//! }
//!
//! impl Describe for Transport {
//!     fn describe() -> TypeDecl {
//!         TypeDecl::composite::<Self>()
//!     }
//! }
//! ```

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use serde_yaml::Value;

use super::descriptor::{IntRange, Primitive, Requiredness};

/// A composite record type usable as a configuration schema.
pub trait Schema: 'static {
    /// Declares the fields of the composite.
    fn declare() -> CompositeDecl;
}

/// A type that can appear as the type of a field.
pub trait Describe {
    /// Returns the declaration of this type.
    fn describe() -> TypeDecl;
}

/// Lazy reference to a composite declaration.
///
/// Carrying the declaring function instead of the declaration itself lets
/// the introspector notice a composite that refers back to itself.
#[derive(Clone, Copy)]
pub struct CompositeRef {
    pub(crate) id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) declare: fn() -> CompositeDecl,
}

impl CompositeRef {
    /// Creates a reference to the composite declared by `S`.
    #[must_use]
    pub fn of<S: Schema>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            type_name: std::any::type_name::<S>(),
            declare: S::declare,
        }
    }

    /// Returns the Rust type name of the composite.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for CompositeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompositeRef").field(&self.type_name).finish()
    }
}

/// Declared type of a field, before introspection.
#[derive(Debug, Clone)]
pub enum TypeDecl {
    /// Any value.
    Any,
    /// A scalar.
    Primitive(Primitive),
    /// A nested composite.
    Composite(CompositeRef),
    /// The inner type or null.
    Optional(Box<TypeDecl>),
    /// One of several alternatives.
    Union(Vec<TypeDecl>),
    /// One of a fixed set of scalar values.
    Literal(Vec<Value>),
    /// A homogeneous list.
    Sequence(Box<TypeDecl>),
    /// A mapping with arbitrary keys.
    Keyed(Box<TypeDecl>, Box<TypeDecl>),
    /// A type the engine cannot represent.
    Unsupported(String),
}

impl TypeDecl {
    /// Declares a field of any type.
    #[must_use]
    pub fn any() -> Self {
        Self::Any
    }

    /// Declares a nested composite.
    #[must_use]
    pub fn composite<S: Schema>() -> Self {
        Self::Composite(CompositeRef::of::<S>())
    }

    /// Declares an optional value of the given type.
    #[must_use]
    pub fn optional(inner: TypeDecl) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Declares a union of alternatives, tried in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use yconf::schema::{Describe, TypeDecl};
    ///
    /// let ty = TypeDecl::union([TypeDecl::literal(["foo"]), i64::describe()]);
    /// assert!(matches!(ty, TypeDecl::Union(ref alts) if alts.len() == 2));
    /// ```
    #[must_use]
    pub fn union(alternatives: impl IntoIterator<Item = TypeDecl>) -> Self {
        Self::Union(alternatives.into_iter().collect())
    }

    /// Declares a set of allowed scalar values.
    #[must_use]
    pub fn literal<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Literal(values.into_iter().map(Into::into).collect())
    }

    /// Declares a list of `element`.
    #[must_use]
    pub fn sequence(element: TypeDecl) -> Self {
        Self::Sequence(Box::new(element))
    }

    /// Declares a mapping from `key` to `value`.
    #[must_use]
    pub fn keyed(key: TypeDecl, value: TypeDecl) -> Self {
        Self::Keyed(Box::new(key), Box::new(value))
    }

    /// Declares a type that cannot be used in a schema.
    #[must_use]
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported(reason.into())
    }
}

/// Declaration of one field.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub(crate) name: String,
    pub(crate) ty: TypeDecl,
    pub(crate) alias: Option<String>,
    pub(crate) docs: Vec<String>,
    pub(crate) default: Option<Result<Value, String>>,
}

impl FieldDecl {
    /// Declares a field whose type is described by `T`.
    #[must_use]
    pub fn new<T: Describe>(name: impl Into<String>) -> Self {
        Self::with_type(name, T::describe())
    }

    /// Declares a field with an explicit type declaration.
    #[must_use]
    pub fn with_type(name: impl Into<String>, ty: TypeDecl) -> Self {
        Self {
            name: name.into(),
            ty,
            alias: None,
            docs: Vec::new(),
            default: None,
        }
    }

    /// Sets the external key used in documents.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Adds a documentation line.
    #[must_use]
    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.docs.push(line.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(Ok(value.into()));
        self
    }

    /// Sets the default value from anything serializable.
    ///
    /// A value that cannot be serialized makes introspection fail with
    /// [`SchemaError::InvalidDefault`](crate::SchemaError::InvalidDefault).
    #[must_use]
    pub fn default_serialized<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.default = Some(serde_yaml::to_value(value).map_err(|e| e.to_string()));
        self
    }
}

/// Declaration of a composite record.
#[derive(Debug, Clone)]
pub struct CompositeDecl {
    pub(crate) name: String,
    pub(crate) docs: Vec<String>,
    pub(crate) fields: Vec<FieldDecl>,
    pub(crate) allow_additional: Option<bool>,
    pub(crate) requiredness: Requiredness,
}

impl CompositeDecl {
    /// Starts a declaration for a composite called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: Vec::new(),
            fields: Vec::new(),
            allow_additional: None,
            requiredness: Requiredness::default(),
        }
    }

    /// Adds a documentation line.
    #[must_use]
    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.docs.push(line.into());
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares whether undeclared keys are accepted.
    #[must_use]
    pub fn allow_additional(mut self, allow: bool) -> Self {
        self.allow_additional = Some(allow);
        self
    }

    /// Sets the requiredness rule.
    #[must_use]
    pub fn requiredness(mut self, requiredness: Requiredness) -> Self {
        self.requiredness = requiredness;
        self
    }
}

macro_rules! describe_primitive {
    ($primitive:expr => $($ty:ty),+) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDecl {
                    TypeDecl::Primitive($primitive)
                }
            }
        )+
    };
}

describe_primitive!(Primitive::Str => String, PathBuf);

macro_rules! describe_int {
    ($($ty:ty),+) => {
        $(
            impl Describe for $ty {
                #[allow(clippy::cast_lossless, clippy::cast_possible_wrap)]
                fn describe() -> TypeDecl {
                    TypeDecl::Primitive(Primitive::Int(IntRange::new(
                        <$ty>::MIN as i128,
                        <$ty>::MAX as i128,
                    )))
                }
            }
        )+
    };
}

describe_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
describe_primitive!(Primitive::Float => f32, f64);
describe_primitive!(Primitive::Bool => bool);
describe_primitive!(Primitive::Null => ());

impl Describe for Value {
    fn describe() -> TypeDecl {
        TypeDecl::Any
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDecl {
        TypeDecl::optional(T::describe())
    }
}

impl<T: Describe> Describe for Box<T> {
    fn describe() -> TypeDecl {
        T::describe()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDecl {
        TypeDecl::sequence(T::describe())
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDecl {
        TypeDecl::keyed(K::describe(), V::describe())
    }
}

impl<K: Describe, V: Describe, H> Describe for HashMap<K, V, H> {
    fn describe() -> TypeDecl {
        TypeDecl::keyed(K::describe(), V::describe())
    }
}
