//! Schema declaration, introspection and compilation.
//!
//! A schema starts as a [`CompositeDecl`] returned by [`Schema::declare`],
//! is introspected into a [`CompositeDescriptor`] tree and compiled into a
//! [`ValidationGraph`]. [`compiled`] caches the last two steps per schema
//! type for the lifetime of the process.

mod compile;
mod declare;
mod descriptor;
mod introspect;
mod registry;

pub use compile::{
    compile, AdditionalPolicy, CompileOptions, CompiledField, CompositeNode, Node,
    ValidationGraph,
};
pub use declare::{CompositeDecl, CompositeRef, Describe, FieldDecl, Schema, TypeDecl};
pub use descriptor::{
    CompositeDescriptor, FieldDescriptor, IntRange, Primitive, Requiredness, TypeDescriptor,
};
pub use introspect::{introspect, introspect_decl};
pub use registry::{compiled, CompiledSchema};
