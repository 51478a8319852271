use typeweave_core::parser::{Parser, ParserCapability, ParserRegistry, RustParser};
use typeweave_core::{build_relationships, Language, TypeKind, Visibility};

fn parse(language: Language, path: &str, code: &str) -> Vec<typeweave_core::TypeDefinition> {
    ParserRegistry::new().parse(language, code, path, false)
}

#[test]
fn test_rust_enum_with_positional_payload() {
    let code = r#"
pub enum Error {
    NotFound(String),
    Conflict { id: u64 },
}
"#;
    let types = parse(Language::Rust, "src/error.rs", code);
    assert_eq!(types.len(), 1);

    let error = &types[0];
    assert_eq!(error.kind, TypeKind::Enum);
    let not_found = &error.variants[0];
    assert_eq!(not_found.name, "NotFound");
    assert_eq!(not_found.fields.len(), 1);
    assert_eq!(not_found.fields[0].name, "0");
    assert_eq!(not_found.fields[0].type_ref.name, "String");
    assert_eq!(error.variants[1].fields[0].name, "id");

    // `String` is not a known type, so no edge.
    assert!(build_relationships(&types).is_empty());
}

#[test]
fn test_parsing_is_idempotent() {
    let code = r#"
/// An invoice.
#[derive(Debug, Serialize)]
pub struct Invoice<T> {
    pub id: String,
    pub items: Vec<LineItem>,
    pub meta: Option<T>,
}
"#;
    let first = parse(Language::Rust, "src/invoice.rs", code);
    let second = parse(Language::Rust, "src/invoice.rs", code);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_include_private_flag() {
    let code = "pub struct Public;\nstruct Hidden;\npub(crate) struct Crate;\n";
    let registry = ParserRegistry::new();

    let public = registry.parse(Language::Rust, code, "src/lib.rs", false);
    let names: Vec<_> = public.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Public"]);

    let all = registry.parse(Language::Rust, code, "src/lib.rs", true);
    assert_eq!(all.len(), 3);
    assert_eq!(all[1].visibility, Visibility::Private);
    assert_eq!(all[2].visibility, Visibility::Internal);
}

#[test]
fn test_same_shape_across_languages() {
    let registry = ParserRegistry::new();
    let sources = [
        (Language::Rust, "a.rs", "pub struct Invoice { pub id: String, pub items: Vec<LineItem> }"),
        (Language::TypeScript, "a.ts", "export interface Invoice { id: string; items: LineItem[] }"),
        (Language::Go, "a.go", "package a\n\ntype Invoice struct {\n\tID string\n\tItems []LineItem\n}\n"),
        (
            Language::Python,
            "a.py",
            "from dataclasses import dataclass\n\n@dataclass\nclass Invoice:\n    id: str\n    items: list[LineItem]\n",
        ),
        (
            Language::Java,
            "A.java",
            "public class Invoice {\n  private String id;\n  private List<LineItem> items;\n}\n",
        ),
        (
            Language::CSharp,
            "A.cs",
            "public class Invoice {\n  public string Id { get; set; }\n  public List<LineItem> Items { get; set; }\n}\n",
        ),
        (Language::Protobuf, "a.proto", "message Invoice {\n  string id = 1;\n  repeated LineItem items = 2;\n}\n"),
        (Language::GraphQL, "a.graphql", "type Invoice {\n  id: ID!\n  items: [LineItem!]!\n}\n"),
    ];

    for (language, path, code) in sources {
        let types = registry.parse(language, code, path, true);
        assert_eq!(types.len(), 1, "{language}");
        let invoice = &types[0];
        assert_eq!(invoice.name, "Invoice", "{language}");
        assert_eq!(invoice.language, language);
        assert_eq!(invoice.fields.len(), 2, "{language}");

        let items = &invoice.fields[1];
        assert!(items.type_ref.is_collection, "{language}");
        assert_eq!(items.type_ref.name, "LineItem", "{language}");
    }
}

#[test]
fn test_capabilities() {
    let registry = ParserRegistry::new();
    let rust = registry.parser_for_language(Language::Rust).unwrap();
    assert_eq!(rust.capability(), ParserCapability::Structural);
    let proto = registry.parser_for_extension("proto").unwrap();
    assert_eq!(proto.capability(), ParserCapability::Basic);
    assert!(RustParser::new().can_parse("RS"));
}

#[test]
fn test_bad_file_yields_nothing() {
    let registry = ParserRegistry::new();
    assert!(registry
        .parse(Language::Rust, "pub struct Broken {", "src/bad.rs", false)
        .is_empty());
    // Tree-sitter recovers; a truncated file still yields what parsed.
    let types = registry.parse(
        Language::TypeScript,
        "export interface Ok { id: string }\nexport class {",
        "src/partial.ts",
        false,
    );
    assert!(types.iter().any(|t| t.name == "Ok"));
}

#[test]
fn test_parse_path_infers_language() {
    let registry = ParserRegistry::new();
    let types = registry.parse_path("schema/api.gql", "enum Status { PAID VOID }", false);
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].kind, TypeKind::Enum);
    assert!(registry.parse_path("notes.txt", "struct X {}", false).is_empty());
}

#[test]
fn test_orm_models_alongside_classes() {
    let code = r#"
class Customer(Base):
    __tablename__ = "customers"
    id = Column(Integer, primary_key=True)
    email = Column(String(255), nullable=True)
"#;
    let types = parse(Language::Python, "app/models.py", code);
    assert_eq!(types.len(), 2);
    assert_eq!(types[0].kind, TypeKind::Class);
    assert!(!types[0].is_schema_derived());
    assert_eq!(types[1].kind, TypeKind::Model);
    assert!(types[1].is_schema_derived());
    assert!(types[1].fields[1].optional);
}

#[test]
fn test_every_grammar_loads() {
    let registry = ParserRegistry::new();
    let sources = [
        (Language::TypeScript, "a.ts", "export interface Z { a: number }"),
        (Language::JavaScript, "a.js", "export class Z {}"),
        (Language::Python, "a.py", "class Z:\n    a: int\n"),
        (Language::Go, "a.go", "package a\n\ntype Z struct {\n\tA int\n}\n"),
        (Language::Java, "Z.java", "public class Z { public int a; }"),
        (Language::CSharp, "Z.cs", "public class Z { public int A { get; set; } }"),
    ];
    for (language, path, code) in sources {
        let types = registry
            .try_parse(language, code, path, false)
            .unwrap_or_else(|e| panic!("{language}: {e}"));
        assert_eq!(types.len(), 1, "{language}");
        assert_eq!(types[0].name, "Z", "{language}");
    }
}
