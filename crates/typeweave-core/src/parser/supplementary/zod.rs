//! Zod schema parser.
//!
//! Reads `const InvoiceSchema = z.object({...})` declarations (and
//! `Other.extend({...})`) from TypeScript and JavaScript files and emits one
//! `interface` per schema, named without the `Schema` suffix.

use tree_sitter::Node;

use super::ZOD_DECORATOR;
use crate::decompose::decompose;
use crate::error::ParseError;
use crate::model::{FieldDefinition, Language, TypeDefinition, TypeKind, Visibility};
use crate::parser::result::ParseResult;
use crate::parser::treesitter::{extract_doc_comment, TreeSitterParser};

/// Builder methods that make a field optional.
const OPTIONAL_MODIFIERS: &[&str] = &["optional", "nullable", "nullish"];

pub struct ZodSchemaParser {
    typescript: TreeSitterParser,
    tsx: TreeSitterParser,
    javascript: TreeSitterParser,
}

impl Default for ZodSchemaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ZodSchemaParser {
    pub fn new() -> Self {
        Self {
            typescript: TreeSitterParser::new(
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
                Language::TypeScript,
                &["ts", "mts", "cts"],
            ),
            tsx: TreeSitterParser::new(
                tree_sitter_typescript::LANGUAGE_TSX.into(),
                Language::TypeScript,
                &["tsx"],
            ),
            javascript: TreeSitterParser::new(
                tree_sitter_javascript::LANGUAGE.into(),
                Language::JavaScript,
                &["js", "jsx", "mjs", "cjs"],
            ),
        }
    }

    pub fn applies_to(&self, language: Language) -> bool {
        language.is_ecmascript()
    }

    pub fn parse_file(
        &self,
        path: &str,
        language: Language,
        content: &str,
        include_private: bool,
    ) -> Result<ParseResult, ParseError> {
        let mut result = ParseResult::new(path, include_private);
        // Cheap pre-check: most files never touch zod.
        if !content.contains("z.object") && !content.contains(".extend(") {
            return Ok(result);
        }

        let grammar = match language {
            Language::JavaScript => &self.javascript,
            _ if path.to_ascii_lowercase().ends_with(".tsx") => &self.tsx,
            _ => &self.typescript,
        };
        let tree = grammar.parse_tree(content)?;

        for statement in TreeSitterParser::named_children(&tree.root_node()) {
            let (declaration, exported) = match statement.kind() {
                "export_statement" => match statement.child_by_field_name("declaration") {
                    Some(decl) => (decl, true),
                    None => continue,
                },
                _ => (statement, false),
            };
            if !matches!(declaration.kind(), "lexical_declaration" | "variable_declaration") {
                continue;
            }

            for declarator in TreeSitterParser::children_of_kind(&declaration, "variable_declarator") {
                if let Some(def) = schema_definition(
                    &declarator,
                    &statement,
                    exported,
                    language,
                    content,
                    path,
                ) {
                    result.add_type(def);
                }
            }
        }

        Ok(result)
    }
}

fn schema_definition(
    declarator: &Node,
    statement: &Node,
    exported: bool,
    language: Language,
    content: &str,
    path: &str,
) -> Option<TypeDefinition> {
    let variable = TreeSitterParser::field_text(declarator, "name", content)?;
    let value = declarator.child_by_field_name("value")?;
    let (shape, base) = find_object_shape(&value, content)?;

    let mut def = TypeDefinition::new(
        schema_type_name(variable),
        TypeKind::Interface,
        path,
        TreeSitterParser::node_line(declarator),
        language,
    );
    def.visibility = if exported {
        Visibility::Public
    } else {
        Visibility::Private
    };
    def.decorators = vec![ZOD_DECORATOR.to_string()];
    def.doc = extract_doc_comment(statement, content);
    if let Some(base) = base {
        def.extends.push(decompose(&schema_type_name(base)));
    }

    for pair in TreeSitterParser::children_of_kind(&shape, "pair") {
        let (Some(key), Some(value)) = (
            TreeSitterParser::field_text(&pair, "key", content),
            pair.child_by_field_name("value"),
        ) else {
            continue;
        };
        let key = key.trim_matches(|c| c == '"' || c == '\'');
        let (type_text, optional) = zod_type(&value, content);
        def.fields
            .push(FieldDefinition::new(key, decompose(&type_text)).or_optional(optional));
    }

    Some(def)
}

/// Walk a builder chain down to its `z.object({...})` (or `X.extend({...})`)
/// call; returns the shape object and the extended schema, if any.
fn find_object_shape<'t>(node: &Node<'t>, content: &'t str) -> Option<(Node<'t>, Option<&'t str>)> {
    if node.kind() != "call_expression" {
        return None;
    }
    let callee = node.child_by_field_name("function")?;
    if callee.kind() != "member_expression" {
        return None;
    }
    let object = callee.child_by_field_name("object")?;
    let method = TreeSitterParser::field_text(&callee, "property", content)?;
    let first_arg = first_argument(node);

    match (method, TreeSitterParser::node_text(&object, content)) {
        ("object", "z") => Some((first_arg.filter(|a| a.kind() == "object")?, None)),
        ("extend", _) if object.kind() == "identifier" => {
            let shape = first_arg.filter(|a| a.kind() == "object")?;
            Some((shape, Some(TreeSitterParser::node_text(&object, content))))
        }
        _ => find_object_shape(&object, content),
    }
}

/// Type text and optionality of a field builder expression.
fn zod_type(node: &Node, content: &str) -> (String, bool) {
    match node.kind() {
        "identifier" => (schema_type_name(TreeSitterParser::node_text(node, content)), false),
        "call_expression" => {
            let Some(callee) = node.child_by_field_name("function") else {
                return ("unknown".to_string(), false);
            };
            if callee.kind() != "member_expression" {
                return ("unknown".to_string(), false);
            }
            let (Some(object), Some(method)) = (
                callee.child_by_field_name("object"),
                TreeSitterParser::field_text(&callee, "property", content),
            ) else {
                return ("unknown".to_string(), false);
            };

            if OPTIONAL_MODIFIERS.contains(&method) {
                let (inner, _) = zod_type(&object, content);
                return (inner, true);
            }
            if TreeSitterParser::node_text(&object, content) == "z" {
                return (builder_type(method, node, content), false);
            }
            if method == "array" {
                let (inner, optional) = zod_type(&object, content);
                return (format!("Array<{}>", inner), optional);
            }
            // Refinements (`.min(1)`, `.email()`, `.default(..)`) keep the type.
            zod_type(&object, content)
        }
        _ => ("unknown".to_string(), false),
    }
}

/// `z.<method>(..)` base builders.
fn builder_type(method: &str, call: &Node, content: &str) -> String {
    let arg = first_argument(call);
    match method {
        "string" | "enum" | "literal" => "string".to_string(),
        "number" => "number".to_string(),
        "bigint" => "bigint".to_string(),
        "boolean" => "boolean".to_string(),
        "date" => "Date".to_string(),
        "array" => {
            let inner = arg
                .map(|a| zod_type(&a, content).0)
                .unwrap_or_else(|| "unknown".to_string());
            format!("Array<{}>", inner)
        }
        "nativeEnum" | "lazy" => arg
            .map(|a| {
                let text = TreeSitterParser::node_text(&a, content);
                let text = text.rsplit("=>").next().unwrap_or(text).trim();
                schema_type_name(text)
            })
            .unwrap_or_else(|| "unknown".to_string()),
        "object" => "object".to_string(),
        "record" => "Record".to_string(),
        _ => "unknown".to_string(),
    }
}

fn first_argument<'t>(call: &Node<'t>) -> Option<Node<'t>> {
    call.child_by_field_name("arguments")?.named_child(0)
}

/// `invoiceSchema` → `Invoice`.
fn schema_type_name(variable: &str) -> String {
    let stripped = variable
        .strip_suffix("Schema")
        .or_else(|| variable.strip_suffix("schema"))
        .filter(|s| !s.is_empty())
        .unwrap_or(variable);
    let mut chars = stripped.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> Vec<TypeDefinition> {
        ZodSchemaParser::new()
            .parse_file("src/schemas.ts", Language::TypeScript, code, false)
            .unwrap()
            .into_types()
    }

    #[test]
    fn test_object_schema() {
        let code = r#"
import { z } from "zod";

export const InvoiceSchema = z.object({
  id: z.string().uuid(),
  total: z.number().optional(),
  items: z.array(LineItemSchema),
  tags: z.string().array().nullable(),
  status: z.enum(["paid", "void"]),
  issuedAt: z.date(),
}).strict();
"#;
        let types = parse(code);
        assert_eq!(types.len(), 1);

        let invoice = &types[0];
        assert_eq!(invoice.name, "Invoice");
        assert_eq!(invoice.kind, TypeKind::Interface);
        assert!(invoice.is_schema_derived());

        let names: Vec<_> = invoice.field_names().collect();
        assert_eq!(names, vec!["id", "total", "items", "tags", "status", "issuedAt"]);
        assert_eq!(invoice.fields[0].type_ref.name, "string");
        assert!(invoice.fields[1].optional);
        assert!(invoice.fields[2].type_ref.is_collection);
        assert_eq!(invoice.fields[2].type_ref.name, "LineItem");
        assert!(invoice.fields[3].optional);
        assert!(invoice.fields[3].type_ref.is_collection);
        assert_eq!(invoice.fields[5].type_ref.name, "Date");
    }

    #[test]
    fn test_extend_and_private() {
        let code = r#"
const baseSchema = z.object({ id: z.string() });
export const customerSchema = baseSchema.extend({ email: z.string().email() });
"#;
        let types = parse(code);
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name, "Customer");
        assert_eq!(types[0].extends[0].name, "Base");
        assert_eq!(types[0].fields[0].name, "email");
    }

    #[test]
    fn test_non_schema_ignored() {
        let code = "export const config = { a: 1 };\nexport const x = foo.extend({ a: 1 }) ;\n";
        let types = parse(code);
        // `foo.extend({...})` looks like a schema extension; field types are unknown.
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].fields[0].type_ref.name, "unknown");
    }

    #[test]
    fn test_schema_type_name() {
        assert_eq!(schema_type_name("InvoiceSchema"), "Invoice");
        assert_eq!(schema_type_name("userschema"), "User");
        assert_eq!(schema_type_name("Schema"), "Schema");
    }
}
