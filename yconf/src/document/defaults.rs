//! Default data derived from a descriptor tree.

use serde_yaml::{Mapping, Value};

use crate::error::SchemaError;
use crate::schema::{CompositeDescriptor, TypeDescriptor};

/// Builds the data a composite has when nothing is configured.
///
/// Each field contributes its declared default. Without one, optional
/// fields become null, nested composites recurse, keyed containers start
/// empty and `Any` fields become null.
///
/// # Errors
///
/// Returns [`SchemaError::MissingDefault`] for a field that has no default
/// and no derivable one.
///
/// # Examples
///
/// ```
/// use yconf::document::default_data;
/// use yconf::schema::{introspect_decl, CompositeDecl, FieldDecl};
///
/// let descriptor = introspect_decl(
///     CompositeDecl::new("Root")
///         .field(FieldDecl::new::<u16>("port").default(993))
///         .field(FieldDecl::new::<Option<String>>("label")),
/// )
/// .unwrap();
/// let data = default_data(&descriptor).unwrap();
/// assert_eq!(serde_yaml::to_string(&data).unwrap(), "port: 993\nlabel: null\n");
/// ```
pub fn default_data(descriptor: &CompositeDescriptor) -> Result<Value, SchemaError> {
    let mut mapping = Mapping::new();
    for field in &descriptor.fields {
        let value = match (&field.default, &field.ty) {
            (Some(default), _) => default.clone(),
            (None, TypeDescriptor::Optional(_) | TypeDescriptor::Any) => Value::Null,
            (None, TypeDescriptor::Composite(composite)) => default_data(composite)?,
            (None, TypeDescriptor::Keyed { .. }) => Value::Mapping(Mapping::new()),
            (None, _) => {
                return Err(SchemaError::MissingDefault {
                    field: format!("{}.{}", descriptor.name, field.name),
                })
            }
        };
        mapping.insert(Value::from(field.key()), value);
    }
    Ok(Value::Mapping(mapping))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::schema::{introspect_decl, CompositeDecl, Describe, FieldDecl, Schema, TypeDecl};

    struct Inner;

    impl Schema for Inner {
        fn declare() -> CompositeDecl {
            CompositeDecl::new("Inner").field(FieldDecl::new::<bool>("on").default(true))
        }
    }

    impl Describe for Inner {
        fn describe() -> TypeDecl {
            TypeDecl::composite::<Self>()
        }
    }

    #[test]
    fn test_derived_defaults() {
        let descriptor = introspect_decl(
            CompositeDecl::new("Root")
                .field(FieldDecl::new::<Inner>("inner"))
                .field(FieldDecl::new::<BTreeMap<String, Inner>>("many"))
                .field(FieldDecl::new::<Value>("anything"))
                .field(FieldDecl::new::<Option<i64>>("limit").default(5))
                .field(FieldDecl::new::<Option<String>>("import_").alias("import")),
        )
        .unwrap();
        let expected: Value = serde_yaml::from_str(
            "inner: {on: true}\nmany: {}\nanything: null\nlimit: 5\nimport: null",
        )
        .unwrap();
        assert_eq!(default_data(&descriptor).unwrap(), expected);
    }

    #[test]
    fn test_missing_default_names_field() {
        let descriptor = introspect_decl(
            CompositeDecl::new("Root").field(FieldDecl::new::<Vec<String>>("names")),
        )
        .unwrap();
        assert_eq!(
            default_data(&descriptor).unwrap_err(),
            SchemaError::MissingDefault {
                field: "Root.names".to_string()
            }
        );
    }
}
