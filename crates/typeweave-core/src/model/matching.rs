//! Cross-repository results. Recomputed on every query, never stored.

use serde::{Deserialize, Serialize};

use super::definition::TypeDefinition;

/// One occurrence of a matched type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInstance {
    pub repo: String,
    pub definition: TypeDefinition,
}

/// Types sharing a normalized name across at least two repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRepoMatch {
    /// Matching key: separators stripped, lower-cased.
    pub normalized_name: String,

    /// Display name, taken from the first instance.
    pub name: String,

    /// Distinct repositories, sorted.
    pub repos: Vec<String>,

    pub instances: Vec<MatchInstance>,

    /// Mean pairwise similarity over cross-repo instance pairs, 0..=100.
    pub similarity: u8,
}

/// Repo-to-repo edge derived from a [`CrossRepoMatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeFlowEdge {
    pub from_repo: String,
    pub from_type: String,
    pub to_repo: String,
    pub to_type: String,

    /// Similarity of the originating match, 0..=100.
    pub confidence: u8,

    /// Normalized field names present on both sides.
    pub shared_fields: Vec<String>,
}
