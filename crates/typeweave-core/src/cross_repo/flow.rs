//! Type-flow graph: repo-to-repo edges reduced from cross-repo matches.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::matcher::shared_fields;
use crate::config::{DEFAULT_HIGH_CONFIDENCE, DEFAULT_MIN_SIMILARITY};
use crate::model::{CrossRepoMatch, TypeFlowEdge};

/// One edge per pair of instances from different repositories, for every
/// match whose similarity is at least `min_similarity`.
pub fn build_flow_edges(matches: &[CrossRepoMatch], min_similarity: u8) -> Vec<TypeFlowEdge> {
    let mut edges = Vec::new();
    for m in matches.iter().filter(|m| m.similarity >= min_similarity) {
        for (i, from) in m.instances.iter().enumerate() {
            for to in &m.instances[i + 1..] {
                if from.repo == to.repo {
                    continue;
                }
                edges.push(TypeFlowEdge {
                    from_repo: from.repo.clone(),
                    from_type: from.definition.name.clone(),
                    to_repo: to.repo.clone(),
                    to_type: to.definition.name.clone(),
                    confidence: m.similarity,
                    shared_fields: shared_fields(&from.definition, &to.definition),
                });
            }
        }
    }
    edges
}

/// Presentation bucket for an edge's confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Classify with explicit thresholds: `>= high` is high, `>= medium` medium.
    pub fn classify(confidence: u8, high: u8, medium: u8) -> Self {
        if confidence >= high {
            Self::High
        } else if confidence >= medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl From<u8> for ConfidenceLevel {
    fn from(confidence: u8) -> Self {
        Self::classify(confidence, DEFAULT_HIGH_CONFIDENCE, DEFAULT_MIN_SIMILARITY)
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flow edges aggregated per ordered repository pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFlowSummary {
    pub from_repo: String,
    pub to_repo: String,

    /// Distinct types flowing between the pair.
    pub type_count: usize,

    /// Type names on the `from` side, sorted.
    pub types: Vec<String>,

    pub mean_confidence: u8,
}

/// Aggregate edges into one summary per `(from_repo, to_repo)`, sorted by pair.
pub fn summarize_flows(edges: &[TypeFlowEdge]) -> Vec<RepoFlowSummary> {
    let mut pairs: BTreeMap<(&str, &str), Vec<&TypeFlowEdge>> = BTreeMap::new();
    for edge in edges {
        pairs
            .entry((edge.from_repo.as_str(), edge.to_repo.as_str()))
            .or_default()
            .push(edge);
    }

    pairs
        .into_iter()
        .map(|((from_repo, to_repo), group)| {
            let types: BTreeSet<&str> = group.iter().map(|e| e.from_type.as_str()).collect();
            let total: u32 = group.iter().map(|e| e.confidence as u32).sum();
            RepoFlowSummary {
                from_repo: from_repo.to_string(),
                to_repo: to_repo.to_string(),
                type_count: types.len(),
                types: types.into_iter().map(String::from).collect(),
                mean_confidence: (total as f64 / group.len() as f64).round() as u8,
            }
        })
        .collect()
}
