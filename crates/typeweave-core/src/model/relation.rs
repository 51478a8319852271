//! Derived structure: relationships between types and directory modules.

use serde::{Deserialize, Serialize};

use super::definition::TypeDefinition;

/// Kind of a [`TypeRelationship`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// `from` inherits from `to` (base class, supertrait, embedded struct).
    Extends,
    /// `from` implements the contract `to`.
    Implements,
    /// `from` has a field of type `to`.
    Contains,
    /// `from` uses `to` as a generic argument of a field type.
    References,
    /// `from` has a collection-of-`to` field.
    Collection,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extends => "extends",
            Self::Implements => "implements",
            Self::Contains => "contains",
            Self::References => "references",
            Self::Collection => "collection",
        }
    }
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed edge between two types of the same repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRelationship {
    pub from: String,
    pub to: String,
    pub kind: RelationshipKind,

    /// Field that produced a contains/collection/references edge;
    /// `variant.field` for enum payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_field: Option<String>,

    /// File of the `from` definition.
    pub file: String,
}

impl TypeRelationship {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: RelationshipKind,
        file: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            via_field: None,
            file: file.into(),
        }
    }

    pub fn via(mut self, field: impl Into<String>) -> Self {
        self.via_field = Some(field.into());
        self
    }
}

/// Types sharing a source directory, with the relationships leaving them
/// split into those that stay inside the directory and those that cross out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeModule {
    /// Directory path, or [`ROOT_MODULE_PATH`] for root-level files.
    pub path: String,

    /// Last segment of `path`.
    pub name: String,

    pub types: Vec<TypeDefinition>,
    pub internal_relationships: Vec<TypeRelationship>,
    pub external_relationships: Vec<TypeRelationship>,
}

/// Module path used for files at the repository root.
pub const ROOT_MODULE_PATH: &str = ".";
