//! References to types from fields, variant payloads and heritage clauses.

use serde::{Deserialize, Serialize};

/// A type occurring inside another type's structure.
///
/// `name` is the base identifier with wrapper and generic syntax removed;
/// `raw` always holds the exact signature text the reference was built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,

    /// Generic arguments, one level deep.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<TypeRef>,

    /// Wrapped in a nullability marker.
    pub optional: bool,

    /// Wrapped in an array/list/set/vec.
    pub is_collection: bool,

    pub raw: String,
}

impl TypeRef {
    /// A reference whose structure could not be inferred; keeps the text verbatim.
    pub fn unresolved(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            name: raw.trim().to_string(),
            generics: Vec::new(),
            optional: false,
            is_collection: false,
            raw,
        }
    }

    /// A generic argument: only `name` and `raw` are populated.
    pub(crate) fn argument(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generics: Vec::new(),
            optional: false,
            is_collection: false,
            raw: raw.into(),
        }
    }

    /// Names of the generic arguments.
    pub fn generic_names(&self) -> impl Iterator<Item = &str> {
        self.generics.iter().map(|g| g.name.as_str())
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
