use std::collections::BTreeMap;

use typeweave_core::{
    build_flow_edges, find_cross_repo_matches, summarize_flows, ConfidenceLevel, Extractor,
    InMemorySource, Language, ParserRegistry, TypeDefinition,
};

fn repos(entries: &[(&str, Language, &str, &str)]) -> BTreeMap<String, Vec<TypeDefinition>> {
    let registry = ParserRegistry::new();
    let mut by_repo: BTreeMap<String, Vec<TypeDefinition>> = BTreeMap::new();
    for (repo, language, path, code) in entries {
        by_repo
            .entry(repo.to_string())
            .or_default()
            .extend(registry.parse(*language, code, path, false));
    }
    by_repo
}

#[test]
fn test_struct_and_class_score_ninety() {
    let by_repo = repos(&[
        (
            "frontend",
            Language::TypeScript,
            "src/invoice.ts",
            "export interface Invoice { id: string; total: number }",
        ),
        (
            "billing",
            Language::Java,
            "Invoice.java",
            "public class Invoice {\n  public String id;\n  public double total;\n  public String currency;\n}\n",
        ),
    ]);

    let matches = find_cross_repo_matches(&by_repo);
    assert_eq!(matches.len(), 1);
    let invoice = &matches[0];
    assert_eq!(invoice.normalized_name, "invoice");
    assert_eq!(invoice.repos, vec!["billing", "frontend"]);
    assert_eq!(invoice.instances.len(), 2);
    assert_eq!(invoice.similarity, 90);

    let edges = build_flow_edges(&matches, 60);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].confidence, 90);
    assert_eq!(edges[0].shared_fields, vec!["id", "total"]);
    assert_eq!(ConfidenceLevel::from(edges[0].confidence), ConfidenceLevel::High);
}

#[test]
fn test_single_repo_duplicates_never_match() {
    let by_repo = repos(&[
        ("api", Language::Rust, "src/a.rs", "pub struct Config { pub port: u16 }"),
        ("api", Language::Rust, "src/b.rs", "pub struct Config { pub port: u16 }"),
        ("web", Language::TypeScript, "src/x.ts", "export interface Session { id: string }"),
    ]);
    assert!(find_cross_repo_matches(&by_repo).is_empty());
}

#[test]
fn test_empty_and_single_repo_input() {
    assert!(find_cross_repo_matches(&BTreeMap::new()).is_empty());
    let single = repos(&[("only", Language::Go, "a.go", "package a\n\ntype User struct {\n\tID string\n}\n")]);
    assert!(find_cross_repo_matches(&single).is_empty());
}

#[test]
fn test_separator_and_case_insensitive_names() {
    let by_repo = repos(&[
        (
            "orders",
            Language::Python,
            "orders/models.py",
            "class LineItem:\n    sku: str\n    quantity: int\n",
        ),
        (
            "catalog",
            Language::Protobuf,
            "catalog.proto",
            "message line_item {\n  string sku = 1;\n  int32 quantity = 2;\n}\n",
        ),
    ]);
    let matches = find_cross_repo_matches(&by_repo);
    assert_eq!(matches.len(), 1);
    // class and message are both record-like.
    assert_eq!(matches[0].similarity, 100);
}

#[test]
fn test_end_to_end_flow_summary() {
    let extractor = Extractor::default();
    let billing = InMemorySource::new()
        .with_file("src/model.rs", "pub struct Invoice { pub id: String, pub total: f64 }\npub struct Customer { pub id: String, pub email: String }");
    let web = InMemorySource::new()
        .with_file("src/types.ts", "export interface Invoice { id: string; total: number }\nexport interface Customer { id: string; name: string }");

    let mut by_repo = BTreeMap::new();
    by_repo.insert("billing".to_string(), extractor.extract(&billing).unwrap().types);
    by_repo.insert("web".to_string(), extractor.extract(&web).unwrap().types);

    let matches = find_cross_repo_matches(&by_repo);
    let names: Vec<_> = matches.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Invoice", "Customer"]);
    assert_eq!(matches[0].similarity, 100);
    assert_eq!(matches[1].similarity, 85);

    let summaries = summarize_flows(&build_flow_edges(&matches, 60));
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].from_repo, "billing");
    assert_eq!(summaries[0].to_repo, "web");
    assert_eq!(summaries[0].type_count, 2);
    assert_eq!(summaries[0].mean_confidence, 93);
}
