//! The canonical type model every parser emits into.
//!
//! - [`TypeDefinition`], [`FieldDefinition`], [`VariantDefinition`] - one extracted declaration
//! - [`TypeRef`] - a decomposed reference to another type
//! - [`TypeRelationship`], [`TypeModule`] - per-repository structure
//! - [`CrossRepoMatch`], [`TypeFlowEdge`] - cross-repository results

mod definition;
mod matching;
mod relation;
mod type_ref;

pub use definition::{
    FieldDefinition, Language, TypeDefinition, TypeKind, VariantDefinition, Visibility,
    SCHEMA_DECORATOR_PREFIX,
};
pub use matching::{CrossRepoMatch, MatchInstance, TypeFlowEdge};
pub use relation::{RelationshipKind, TypeModule, TypeRelationship, ROOT_MODULE_PATH};
pub use type_ref::TypeRef;
