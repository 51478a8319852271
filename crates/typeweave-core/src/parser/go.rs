//! Go parser using tree-sitter.

use tree_sitter::Node;

use super::result::ParseResult;
use super::traits::{Parser, ParserCapability};
use super::treesitter::{extract_doc_comment, TreeSitterParser};
use crate::decompose::decompose;
use crate::error::ParseError;
use crate::model::{FieldDefinition, Language, TypeDefinition, TypeKind, Visibility};

/// Go parser using tree-sitter.
pub struct GoParser {
    base: TreeSitterParser,
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GoParser {
    pub fn new() -> Self {
        Self {
            base: TreeSitterParser::new(tree_sitter_go::LANGUAGE.into(), Language::Go, &["go"]),
        }
    }

    /// One `type` spec; `decl` is the enclosing declaration for doc lookup
    /// when the spec is not inside a parenthesized group.
    fn extract_spec(
        &self,
        spec: &Node,
        decl: &Node,
        content: &str,
        path: &str,
    ) -> Option<TypeDefinition> {
        let name = TreeSitterParser::field_text(spec, "name", content)?;
        let ty = spec.child_by_field_name("type")?;

        let kind = match (spec.kind(), ty.kind()) {
            ("type_alias", _) => TypeKind::TypeAlias,
            (_, "struct_type") => TypeKind::Struct,
            (_, "interface_type") => TypeKind::Interface,
            _ => TypeKind::TypeAlias,
        };

        let mut def = TypeDefinition::new(
            name,
            kind,
            path,
            TreeSitterParser::node_line(spec),
            Language::Go,
        );
        def.visibility = visibility_of(name);
        def.doc = extract_doc_comment(spec, content).or_else(|| extract_doc_comment(decl, content));

        if let Some(params) = spec.child_by_field_name("type_parameters") {
            def.generics = TreeSitterParser::named_children(&params)
                .iter()
                .flat_map(|p| TreeSitterParser::field_texts(p, "name", content))
                .map(|n| n.to_string())
                .collect();
        }

        match kind {
            TypeKind::Struct => self.extract_struct_body(&ty, content, &mut def),
            TypeKind::Interface => self.extract_interface_body(&ty, content, &mut def),
            _ => {}
        }

        Some(def)
    }

    fn extract_struct_body(&self, ty: &Node, content: &str, def: &mut TypeDefinition) {
        let Some(list) = TreeSitterParser::children_of_kind(ty, "field_declaration_list")
            .into_iter()
            .next()
        else {
            return;
        };

        for decl in TreeSitterParser::children_of_kind(&list, "field_declaration") {
            let Some(type_text) = TreeSitterParser::field_text(&decl, "type", content) else {
                continue;
            };
            let tag = TreeSitterParser::field_text(&decl, "tag", content)
                .map(|t| {
                    t.strip_prefix('`')
                        .and_then(|t| t.strip_suffix('`'))
                        .unwrap_or(t)
                        .to_string()
                });
            let omitempty = tag.as_deref().is_some_and(|t| t.contains("omitempty"));
            let names = TreeSitterParser::field_texts(&decl, "name", content);

            // Embedded field: the type is promoted into this struct.
            if names.is_empty() {
                def.extends.push(decompose(type_text));
                continue;
            }

            let doc = extract_doc_comment(&decl, content);
            for name in names {
                def.fields.push(
                    FieldDefinition::new(name, decompose(type_text))
                        .or_optional(omitempty)
                        .with_visibility(visibility_of(name))
                        .with_decorators(tag.iter().cloned().collect())
                        .with_doc(doc.clone()),
                );
            }
        }
    }

    fn extract_interface_body(&self, ty: &Node, content: &str, def: &mut TypeDefinition) {
        for elem in TreeSitterParser::named_children(ty) {
            match elem.kind() {
                "method_elem" | "method_spec" | "comment" => {}
                _ => {
                    let text = TreeSitterParser::node_text(&elem, content).trim();
                    if !text.is_empty() {
                        def.extends.push(decompose(text));
                    }
                }
            }
        }
    }
}

impl Parser for GoParser {
    fn parse_file(
        &self,
        path: &str,
        content: &str,
        include_private: bool,
    ) -> Result<ParseResult, ParseError> {
        let tree = self.base.parse_tree(content)?;
        let root = tree.root_node();

        let mut result = ParseResult::new(path, include_private);
        if root.has_error() {
            result.warn("syntax errors present; extraction is partial");
        }

        for decl in TreeSitterParser::children_of_kind(&root, "type_declaration") {
            for spec in TreeSitterParser::named_children(&decl) {
                if !matches!(spec.kind(), "type_spec" | "type_alias") {
                    continue;
                }
                if let Some(def) = self.extract_spec(&spec, &decl, content, path) {
                    result.add_type(def);
                }
            }
        }

        Ok(result)
    }

    fn language(&self) -> Language {
        Language::Go
    }

    fn supported_extensions(&self) -> &[&'static str] {
        self.base.extensions()
    }

    fn capability(&self) -> ParserCapability {
        ParserCapability::Structural
    }
}

/// Exported identifiers start with an upper-case letter.
fn visibility_of(name: &str) -> Visibility {
    if name.chars().next().is_some_and(char::is_uppercase) {
        Visibility::Public
    } else {
        Visibility::Private
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str, include_private: bool) -> Vec<TypeDefinition> {
        GoParser::new()
            .parse_file("internal/billing/invoice.go", code, include_private)
            .unwrap()
            .into_types()
    }

    #[test]
    fn test_struct_with_tags() {
        let code = r#"
package billing

// Invoice is a bill.
type Invoice struct {
	Audit
	ID       string     `json:"id"`
	Total    float64    `json:"total,omitempty"`
	Items    []LineItem `json:"items"`
	Customer *Customer
	a, b     int
}
"#;
        let types = parse(code, false);
        assert_eq!(types.len(), 1);

        let invoice = &types[0];
        assert_eq!(invoice.kind, TypeKind::Struct);
        assert_eq!(invoice.doc.as_deref(), Some("Invoice is a bill."));
        assert_eq!(invoice.extends[0].name, "Audit");

        let names: Vec<_> = invoice.field_names().collect();
        assert_eq!(names, vec!["ID", "Total", "Items", "Customer", "a", "b"]);
        assert_eq!(invoice.fields[0].decorators, vec!["json:\"id\"".to_string()]);
        assert!(invoice.fields[1].optional);
        assert!(invoice.fields[2].type_ref.is_collection);
        assert_eq!(invoice.fields[2].type_ref.name, "LineItem");
        assert!(invoice.fields[3].optional);
        assert_eq!(invoice.fields[4].visibility, Visibility::Private);
    }

    #[test]
    fn test_interface_and_named_types() {
        let code = r#"
package billing

type (
	Store interface {
		io.Closer
		Get(id string) (*Invoice, error)
	}
	Status string
	internalID = string
)
"#;
        let types = parse(code, true);
        assert_eq!(types.len(), 3);
        assert_eq!(types[0].kind, TypeKind::Interface);
        assert_eq!(types[0].extends.len(), 1);
        assert_eq!(types[0].extends[0].name, "io.Closer");
        assert_eq!(types[1].kind, TypeKind::TypeAlias);
        assert_eq!(types[2].visibility, Visibility::Private);

        assert_eq!(parse(code, false).len(), 2);
    }

    #[test]
    fn test_generic_struct() {
        let code = "package p\n\ntype Page[T any] struct {\n\tItems []T\n}\n";
        let types = parse(code, false);
        assert_eq!(types[0].generics, vec!["T".to_string()]);
    }
}
