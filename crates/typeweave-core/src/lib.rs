//! Multi-language type extraction and cross-repository type matching.
//!
//! The engine's functional surface:
//!
//! - [`ParserRegistry::supported_extensions`] and [`ParserRegistry::parse`]
//!   turn one file into [`TypeDefinition`]s
//! - [`build_relationships`] and [`build_modules`] derive per-repository structure
//! - [`find_cross_repo_matches`] and [`build_flow_edges`] compare repositories
//!
//! [`Extractor`] drives all of it over a [`RepoSource`].

pub mod config;
pub mod cross_repo;
pub mod decompose;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod relations;

pub use config::{Config, ConfigError, ExtractionConfig, MatchingConfig};
pub use cross_repo::{
    build_flow_edges, find_cross_repo_matches, normalize_name, summarize_flows, ConfidenceLevel,
    CrossRepoMatcher, RepoFlowSummary, SimilarityWeights,
};
pub use decompose::decompose;
pub use error::{ParseError, Result, TypeweaveError};
pub use extract::{ExtractionStats, Extractor, InMemorySource, RepoSource, RepoTypeSet};
pub use model::{
    CrossRepoMatch, FieldDefinition, Language, MatchInstance, RelationshipKind, TypeDefinition,
    TypeFlowEdge, TypeKind, TypeModule, TypeRef, TypeRelationship, VariantDefinition, Visibility,
};
pub use parser::{Parser, ParserRegistry};
pub use relations::{build_modules, build_relationships};
