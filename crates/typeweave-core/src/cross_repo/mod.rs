//! Cross-repository matching and the type-flow graph.
//!
//! Both run on demand over the latest definitions of every repository and
//! keep no state between calls.

mod flow;
mod matcher;

pub use flow::{build_flow_edges, summarize_flows, ConfidenceLevel, RepoFlowSummary};
pub use matcher::{
    find_cross_repo_matches, kinds_equivalent, shared_fields, similarity_score, CrossRepoMatcher,
    SimilarityWeights,
};

/// Matching key for type and field names: separators removed, case folded.
///
/// `line_item`, `LineItem`, `line-item` and `Line.Item` all become `lineitem`.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
