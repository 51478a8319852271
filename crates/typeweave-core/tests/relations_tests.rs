use typeweave_core::model::ROOT_MODULE_PATH;
use typeweave_core::{
    build_modules, build_relationships, Language, ParserRegistry, RelationshipKind, TypeDefinition,
};

fn extract(files: &[(&str, &str)]) -> Vec<TypeDefinition> {
    let registry = ParserRegistry::new();
    files
        .iter()
        .flat_map(|(path, code)| registry.parse(Language::Rust, code, path, false))
        .collect()
}

#[test]
fn test_collection_edge_from_vec_field() {
    let types = extract(&[(
        "src/billing.rs",
        "pub struct Invoice { pub id: String, pub items: Vec<LineItem> }\npub struct LineItem { pub sku: String }",
    )]);

    let items = &types[0].fields[1];
    assert_eq!(items.type_ref.name, "LineItem");
    assert!(items.type_ref.is_collection);
    assert_eq!(items.type_ref.raw, "Vec<LineItem>");

    let edges = build_relationships(&types);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].from, "Invoice");
    assert_eq!(edges[0].to, "LineItem");
    assert_eq!(edges[0].kind, RelationshipKind::Collection);
    assert_eq!(edges[0].via_field.as_deref(), Some("items"));
}

#[test]
fn test_trait_impl_edges() {
    let types = extract(&[(
        "src/lib.rs",
        r#"
pub trait Entity {}
pub trait Billable: Entity {}
pub struct Invoice { pub customer: Option<Customer> }
pub struct Customer;
impl Billable for Invoice {}
"#,
    )]);

    let edges = build_relationships(&types);
    let summary: Vec<_> = edges
        .iter()
        .map(|e| (e.from.as_str(), e.kind, e.to.as_str()))
        .collect();
    assert!(summary.contains(&("Billable", RelationshipKind::Extends, "Entity")));
    assert!(summary.contains(&("Invoice", RelationshipKind::Implements, "Billable")));
    assert!(summary.contains(&("Invoice", RelationshipKind::Contains, "Customer")));
    assert_eq!(edges.len(), 3);
}

#[test]
fn test_modules_partition_edges() {
    let types = extract(&[
        (
            "src/billing/invoice.rs",
            "pub struct Invoice { pub items: Vec<LineItem>, pub customer: Customer }",
        ),
        ("src/billing/item.rs", "pub struct LineItem { pub sku: String }"),
        ("src/crm/customer.rs", "pub struct Customer { pub id: u64 }"),
        ("build.rs", "pub struct BuildInfo { pub version: String }"),
    ]);
    let relationships = build_relationships(&types);
    let modules = build_modules(&types, &relationships);

    let paths: Vec<_> = modules.iter().map(|m| m.path.as_str()).collect();
    assert_eq!(paths, vec![ROOT_MODULE_PATH, "src/billing", "src/crm"]);

    let billing = &modules[1];
    assert_eq!(billing.name, "billing");
    assert_eq!(billing.internal_relationships.len(), 1);
    assert_eq!(billing.internal_relationships[0].to, "LineItem");
    assert_eq!(billing.external_relationships.len(), 1);
    assert_eq!(billing.external_relationships[0].to, "Customer");

    for module in &modules {
        for r in &relationships {
            if module.types.iter().any(|t| t.name == r.from) {
                let internal = module.internal_relationships.contains(r);
                let external = module.external_relationships.contains(r);
                assert!(internal ^ external);
            }
        }
    }
}

#[test]
fn test_empty_input() {
    assert!(build_relationships(&[]).is_empty());
    assert!(build_modules(&[], &[]).is_empty());
}

#[test]
fn test_python_forward_references_produce_edges() {
    let code = r#"
class Invoice:
    customer: "Customer"
    items: list["LineItem"]

class Customer:
    name: str

class LineItem:
    sku: str
"#;
    let types = ParserRegistry::new().parse(Language::Python, code, "billing/models.py", false);
    let edges = build_relationships(&types);

    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0].to, "Customer");
    assert_eq!(edges[0].kind, RelationshipKind::Contains);
    assert_eq!(edges[1].to, "LineItem");
    assert_eq!(edges[1].kind, RelationshipKind::Collection);
}

#[test]
fn test_go_map_value_is_referenced() {
    let code = "package shop\n\ntype Cart struct {\n\tOrders map[string]*Order\n}\n\ntype Order struct {\n\tID string\n}\n";
    let types = ParserRegistry::new().parse(Language::Go, code, "shop/cart.go", false);
    let edges = build_relationships(&types);

    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].from, "Cart");
    assert_eq!(edges[0].to, "Order");
    assert_eq!(edges[0].kind, RelationshipKind::References);
    assert_eq!(edges[0].via_field.as_deref(), Some("Orders"));
}
