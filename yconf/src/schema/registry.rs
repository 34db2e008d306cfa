//! Process-wide cache of compiled schemas.
//!
//! Every distinct schema type is introspected and compiled at most once per
//! set of [`CompileOptions`]. Entries are never evicted; schemas are few and
//! live for the whole process.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use super::compile::{compile, CompileOptions, ValidationGraph};
use super::declare::Schema;
use super::descriptor::CompositeDescriptor;
use super::introspect::introspect;
use crate::error::SchemaError;

/// A schema's descriptor tree together with its compiled graph.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    descriptor: Arc<CompositeDescriptor>,
    graph: ValidationGraph,
}

impl CompiledSchema {
    /// Introspects and compiles `S` without consulting the cache.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when `S` is malformed.
    pub fn build<S: Schema>(options: CompileOptions) -> Result<Self, SchemaError> {
        let descriptor = introspect::<S>()?;
        let graph = compile(&descriptor, options)?;
        Ok(Self { descriptor, graph })
    }

    /// Returns the descriptor tree.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<CompositeDescriptor> {
        &self.descriptor
    }

    /// Returns the compiled validation graph.
    #[must_use]
    pub fn graph(&self) -> &ValidationGraph {
        &self.graph
    }
}

type Cache = HashMap<(TypeId, CompileOptions), Arc<CompiledSchema>>;

fn cache() -> &'static Mutex<Cache> {
    static CACHE: OnceLock<Mutex<Cache>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Returns the cached compiled form of `S`, building it on first use.
///
/// Failures are not cached; a malformed schema fails on every call.
///
/// # Errors
///
/// Returns a [`SchemaError`] when `S` is malformed.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use yconf::schema::{compiled, CompileOptions, CompositeDecl, FieldDecl, Schema};
///
/// struct Settings;
///
/// impl Schema for Settings {
///     fn declare() -> CompositeDecl {
///         CompositeDecl::new("Settings").field(FieldDecl::new::<bool>("debug").default(false))
///     }
/// }
///
/// let a = compiled::<Settings>(CompileOptions::default()).unwrap();
/// let b = compiled::<Settings>(CompileOptions::default()).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub fn compiled<S: Schema>(options: CompileOptions) -> Result<Arc<CompiledSchema>, SchemaError> {
    let key = (TypeId::of::<S>(), options);
    if let Some(schema) = cache()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Ok(Arc::clone(schema));
    }

    // Built outside the lock; a concurrent builder of the same schema loses
    // the race and adopts the stored entry.
    let built = Arc::new(CompiledSchema::build::<S>(options)?);
    let mut guard = cache().lock().unwrap_or_else(PoisonError::into_inner);
    let entry = guard.entry(key).or_insert(built);
    log::debug!(
        "Cached compiled schema '{}' for {}",
        entry.descriptor.name,
        std::any::type_name::<S>()
    );
    Ok(Arc::clone(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CompositeDecl, FieldDecl, TypeDecl};

    struct Cached;

    impl Schema for Cached {
        fn declare() -> CompositeDecl {
            CompositeDecl::new("Cached").field(FieldDecl::new::<i64>("n").default(1))
        }
    }

    struct Broken;

    impl Schema for Broken {
        fn declare() -> CompositeDecl {
            CompositeDecl::new("Broken")
                .field(FieldDecl::with_type("x", TypeDecl::unsupported("no")))
        }
    }

    #[test]
    fn test_same_options_share_entry() {
        let a = compiled::<Cached>(CompileOptions::default()).unwrap();
        let b = compiled::<Cached>(CompileOptions::default()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_options_are_part_of_key() {
        let plain = compiled::<Cached>(CompileOptions::default()).unwrap();
        let tracked = compiled::<Cached>(CompileOptions::tracking()).unwrap();
        assert!(!Arc::ptr_eq(&plain, &tracked));
        assert!(tracked.graph().options().track_extra);
        assert_eq!(plain.descriptor(), tracked.descriptor());
    }

    #[test]
    fn test_failures_are_reported_every_time() {
        assert!(compiled::<Broken>(CompileOptions::default()).is_err());
        assert!(compiled::<Broken>(CompileOptions::default()).is_err());
    }

    #[test]
    fn test_uncached_build_matches_cached() {
        let built = CompiledSchema::build::<Cached>(CompileOptions::default()).unwrap();
        let cached = compiled::<Cached>(CompileOptions::default()).unwrap();
        assert_eq!(&built, cached.as_ref());
    }
}
