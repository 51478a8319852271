//! Cross-repository type matching and similarity scoring.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalize_name;
use crate::config::{DEFAULT_FIELD_WEIGHT, DEFAULT_KIND_WEIGHT, DEFAULT_NAME_WEIGHT};
use crate::model::{CrossRepoMatch, MatchInstance, TypeDefinition, TypeKind};

/// Points awarded by each similarity term. The three weights sum to the
/// maximum score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    /// Normalized names are equal.
    pub name: u8,
    /// Kinds fall in the same equivalence class.
    pub kind: u8,
    /// Upper bound of the field-overlap term.
    pub fields: u8,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME_WEIGHT,
            kind: DEFAULT_KIND_WEIGHT,
            fields: DEFAULT_FIELD_WEIGHT,
        }
    }
}

impl SimilarityWeights {
    pub fn total(&self) -> u32 {
        self.name as u32 + self.kind as u32 + self.fields as u32
    }
}

/// Record-like kinds.
const STRUCT_LIKE: &[TypeKind] = &[
    TypeKind::Struct,
    TypeKind::Class,
    TypeKind::Interface,
    TypeKind::Message,
    TypeKind::Input,
    TypeKind::Model,
];

/// Contract-like kinds.
const CONTRACT_LIKE: &[TypeKind] = &[
    TypeKind::Trait,
    TypeKind::Interface,
    TypeKind::Protocol,
    TypeKind::Service,
];

/// Whether two kinds describe the same shape of thing across languages.
pub fn kinds_equivalent(a: TypeKind, b: TypeKind) -> bool {
    a == b
        || (STRUCT_LIKE.contains(&a) && STRUCT_LIKE.contains(&b))
        || (CONTRACT_LIKE.contains(&a) && CONTRACT_LIKE.contains(&b))
}

/// Distinct normalized field names of a definition.
fn normalized_fields(def: &TypeDefinition) -> BTreeSet<String> {
    def.fields.iter().map(|f| normalize_name(&f.name)).collect()
}

/// Normalized field names present on both definitions, sorted.
pub fn shared_fields(a: &TypeDefinition, b: &TypeDefinition) -> Vec<String> {
    let left = normalized_fields(a);
    let right = normalized_fields(b);
    left.intersection(&right).cloned().collect()
}

/// Finds types recurring across repositories.
#[derive(Debug, Clone, Default)]
pub struct CrossRepoMatcher {
    weights: SimilarityWeights,
}

impl CrossRepoMatcher {
    pub fn new(weights: SimilarityWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> SimilarityWeights {
        self.weights
    }

    /// Similarity of two definitions, 0..=100. Symmetric.
    pub fn score(&self, a: &TypeDefinition, b: &TypeDefinition) -> u8 {
        let mut score = 0u32;

        if normalize_name(&a.name) == normalize_name(&b.name) {
            score += self.weights.name as u32;
        }
        if kinds_equivalent(a.kind, b.kind) {
            score += self.weights.kind as u32;
        }

        let left = normalized_fields(a);
        let right = normalized_fields(b);
        if !left.is_empty() && !right.is_empty() {
            let overlap = left.intersection(&right).count() as f64;
            let largest = left.len().max(right.len()) as f64;
            score += (self.weights.fields as f64 * overlap / largest).round() as u32;
        }

        score.min(100) as u8
    }

    /// Bucket every definition by normalized name and keep buckets spanning
    /// at least two repositories.
    ///
    /// Sorted by similarity (highest first), then normalized name. Empty or
    /// single-repository input yields no matches.
    pub fn find_matches(
        &self,
        types_by_repo: &BTreeMap<String, Vec<TypeDefinition>>,
    ) -> Vec<CrossRepoMatch> {
        let mut buckets: HashMap<String, Vec<MatchInstance>> = HashMap::new();
        for (repo, types) in types_by_repo {
            for def in types {
                buckets
                    .entry(normalize_name(&def.name))
                    .or_default()
                    .push(MatchInstance {
                        repo: repo.clone(),
                        definition: def.clone(),
                    });
            }
        }

        let mut matches: Vec<CrossRepoMatch> = buckets
            .into_iter()
            .filter_map(|(normalized_name, instances)| {
                let repos: BTreeSet<&str> = instances.iter().map(|i| i.repo.as_str()).collect();
                if repos.len() < 2 {
                    return None;
                }
                let repos: Vec<String> = repos.into_iter().map(String::from).collect();
                let similarity = self.bucket_similarity(&instances);
                let name = instances.first()?.definition.name.clone();
                Some(CrossRepoMatch {
                    normalized_name,
                    name,
                    repos,
                    instances,
                    similarity,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.similarity
                .cmp(&a.similarity)
                .then_with(|| a.normalized_name.cmp(&b.normalized_name))
        });
        debug!(
            "Found {} cross-repo matches across {} repositories",
            matches.len(),
            types_by_repo.len()
        );
        matches
    }

    /// Rounded mean score over all instance pairs from different repositories.
    fn bucket_similarity(&self, instances: &[MatchInstance]) -> u8 {
        let mut total = 0u64;
        let mut pairs = 0u64;
        for (i, a) in instances.iter().enumerate() {
            for b in &instances[i + 1..] {
                if a.repo != b.repo {
                    total += self.score(&a.definition, &b.definition) as u64;
                    pairs += 1;
                }
            }
        }
        if pairs == 0 {
            return 0;
        }
        (total as f64 / pairs as f64).round() as u8
    }
}

/// [`CrossRepoMatcher::find_matches`] with the default weights.
pub fn find_cross_repo_matches(
    types_by_repo: &BTreeMap<String, Vec<TypeDefinition>>,
) -> Vec<CrossRepoMatch> {
    CrossRepoMatcher::default().find_matches(types_by_repo)
}

/// [`CrossRepoMatcher::score`] with the default weights.
pub fn similarity_score(a: &TypeDefinition, b: &TypeDefinition) -> u8 {
    CrossRepoMatcher::default().score(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::decompose;
    use crate::model::{FieldDefinition, Language};

    fn def(name: &str, kind: TypeKind, fields: &[&str]) -> TypeDefinition {
        let mut def = TypeDefinition::new(name, kind, "src/model", 1, Language::TypeScript);
        def.fields = fields
            .iter()
            .map(|f| FieldDefinition::new(*f, decompose("string")))
            .collect();
        def
    }

    #[test]
    fn test_kind_classes() {
        assert!(kinds_equivalent(TypeKind::Struct, TypeKind::Class));
        assert!(kinds_equivalent(TypeKind::Interface, TypeKind::Protocol));
        assert!(kinds_equivalent(TypeKind::Trait, TypeKind::Interface));
        assert!(!kinds_equivalent(TypeKind::Struct, TypeKind::Trait));
        assert!(!kinds_equivalent(TypeKind::Enum, TypeKind::Struct));
        assert!(!kinds_equivalent(TypeKind::TypeAlias, TypeKind::Struct));
        assert!(kinds_equivalent(TypeKind::Enum, TypeKind::Enum));
    }

    #[test]
    fn test_score_terms() {
        let a = def("Invoice", TypeKind::Struct, &["id", "total"]);
        let b = def("invoice", TypeKind::Class, &["id", "total", "currency"]);
        assert_eq!(similarity_score(&a, &b), 90);

        let enum_a = def("Invoice", TypeKind::Enum, &[]);
        assert_eq!(similarity_score(&enum_a, &b), 50);
        assert_eq!(similarity_score(&b, &enum_a), 50);
    }

    #[test]
    fn test_field_names_normalized() {
        let a = def("User", TypeKind::Struct, &["user_id", "created_at"]);
        let b = def("User", TypeKind::Class, &["userId", "createdAt"]);
        assert_eq!(similarity_score(&a, &b), 100);
        assert_eq!(shared_fields(&a, &b), vec!["createdat", "userid"]);
    }

    #[test]
    fn test_custom_weights() {
        let matcher = CrossRepoMatcher::new(SimilarityWeights {
            name: 40,
            kind: 10,
            fields: 50,
        });
        let a = def("Invoice", TypeKind::Struct, &["id", "total"]);
        let b = def("Invoice", TypeKind::Struct, &["id", "sum"]);
        assert_eq!(matcher.score(&a, &b), 75);
    }

    #[test]
    fn test_matches_sorted() {
        let mut repos = BTreeMap::new();
        repos.insert(
            "billing".to_string(),
            vec![
                def("Invoice", TypeKind::Struct, &["id", "total"]),
                def("Customer", TypeKind::Struct, &["id"]),
            ],
        );
        repos.insert(
            "web".to_string(),
            vec![
                def("Invoice", TypeKind::Interface, &["id", "total"]),
                def("customer", TypeKind::Enum, &[]),
            ],
        );

        let matches = find_cross_repo_matches(&repos);
        let names: Vec<_> = matches.iter().map(|m| m.normalized_name.as_str()).collect();
        assert_eq!(names, vec!["invoice", "customer"]);
        assert_eq!(matches[0].similarity, 100);
        assert_eq!(matches[0].repos, vec!["billing", "web"]);
        assert_eq!(matches[1].similarity, 50);
        assert_eq!(matches[1].name, "Customer");
    }
}
