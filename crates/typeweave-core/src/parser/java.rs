//! Java parser using tree-sitter.

use tree_sitter::Node;

use super::result::ParseResult;
use super::traits::{Parser, ParserCapability};
use super::treesitter::{clean_comment, extract_doc_comment, type_list, TreeSitterParser};
use crate::decompose::decompose;
use crate::error::ParseError;
use crate::model::{
    FieldDefinition, Language, TypeDefinition, TypeKind, VariantDefinition, Visibility,
};

/// Java parser using tree-sitter.
pub struct JavaParser {
    base: TreeSitterParser,
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl JavaParser {
    pub fn new() -> Self {
        Self {
            base: TreeSitterParser::new(tree_sitter_java::LANGUAGE.into(), Language::Java, &["java"]),
        }
    }

    /// Visit declarations in a compilation unit or type body, recursing into
    /// nested types.
    fn process_body(&self, body: &Node, content: &str, result: &mut ParseResult) {
        for child in TreeSitterParser::named_children(body) {
            let kind = match child.kind() {
                "class_declaration" | "record_declaration" => TypeKind::Class,
                "interface_declaration" => TypeKind::Interface,
                "enum_declaration" => TypeKind::Enum,
                _ => continue,
            };

            if let Some(def) = self.extract_type(&child, kind, content, &result.file_path) {
                result.add_type(def);
            }
            if let Some(nested) = child.child_by_field_name("body") {
                self.process_body(&nested, content, result);
            }
        }
    }

    fn extract_type(
        &self,
        node: &Node,
        kind: TypeKind,
        content: &str,
        path: &str,
    ) -> Option<TypeDefinition> {
        let name = TreeSitterParser::field_text(node, "name", content)?;
        let (modifiers, annotations) = self.extract_modifiers(node, content);

        let mut def = TypeDefinition::new(
            name,
            kind,
            path,
            TreeSitterParser::node_line(node),
            Language::Java,
        );
        def.visibility = self.modifiers_to_visibility(&modifiers);
        def.decorators = annotations;
        def.generics = self.extract_type_parameters(node, content);
        def.doc = self.extract_javadoc(node, content);

        if let Some(superclass) = node.child_by_field_name("superclass") {
            def.extends = type_list(TreeSitterParser::node_text(&superclass, content), "extends");
        }
        if let Some(interfaces) = node.child_by_field_name("interfaces") {
            def.implements =
                type_list(TreeSitterParser::node_text(&interfaces, content), "implements");
        }
        if let Some(extends) = TreeSitterParser::children_of_kind(node, "extends_interfaces").first()
        {
            def.extends = type_list(TreeSitterParser::node_text(extends, content), "extends");
        }

        if node.kind() == "record_declaration" {
            if let Some(params) = node.child_by_field_name("parameters") {
                def.fields = self.extract_record_components(&params, content);
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            match kind {
                TypeKind::Enum => def.variants = self.extract_enum_constants(&body, content),
                TypeKind::Class => def.fields.extend(self.extract_class_fields(&body, content)),
                _ => {}
            }
        }

        Some(def)
    }

    fn extract_class_fields(&self, body: &Node, content: &str) -> Vec<FieldDefinition> {
        let mut fields = Vec::new();

        for child in TreeSitterParser::children_of_kind(body, "field_declaration") {
            let (modifiers, annotations) = self.extract_modifiers(&child, content);
            if modifiers.iter().any(|m| m == "static") {
                continue;
            }
            let visibility = self.modifiers_to_visibility(&modifiers);
            let nullable = annotations.iter().any(|a| is_nullable_annotation(a));
            let Some(type_text) = TreeSitterParser::field_text(&child, "type", content) else {
                continue;
            };
            let doc = self.extract_javadoc(&child, content);

            for decl in TreeSitterParser::children_of_kind(&child, "variable_declarator") {
                let Some(name) = TreeSitterParser::field_text(&decl, "name", content) else {
                    continue;
                };
                // `int values[]` declares an array through the declarator.
                let type_ref = match TreeSitterParser::field_text(&decl, "dimensions", content) {
                    Some(dims) => decompose(&format!("{}{}", type_text, dims)),
                    None => decompose(type_text),
                };
                fields.push(
                    FieldDefinition::new(name, type_ref)
                        .or_optional(nullable)
                        .with_visibility(visibility)
                        .with_decorators(annotations.clone())
                        .with_doc(doc.clone()),
                );
            }
        }

        fields
    }

    /// Record components are exposed through public accessors.
    fn extract_record_components(&self, params: &Node, content: &str) -> Vec<FieldDefinition> {
        TreeSitterParser::children_of_kind(params, "formal_parameter")
            .iter()
            .filter_map(|param| {
                let name = TreeSitterParser::field_text(param, "name", content)?;
                let ty = TreeSitterParser::field_text(param, "type", content)?;
                let (_, annotations) = self.extract_modifiers(param, content);
                Some(
                    FieldDefinition::new(name, decompose(ty))
                        .or_optional(annotations.iter().any(|a| is_nullable_annotation(a)))
                        .with_decorators(annotations),
                )
            })
            .collect()
    }

    fn extract_enum_constants(&self, body: &Node, content: &str) -> Vec<VariantDefinition> {
        TreeSitterParser::children_of_kind(body, "enum_constant")
            .iter()
            .filter_map(|constant| {
                let name = TreeSitterParser::field_text(constant, "name", content)?;
                let value = TreeSitterParser::field_text(constant, "arguments", content)
                    .map(|args| args.trim_start_matches('(').trim_end_matches(')').trim())
                    .filter(|args| !args.is_empty())
                    .map(|args| args.to_string());
                Some(VariantDefinition::new(name).with_value(value))
            })
            .collect()
    }

    /// Keyword modifiers and annotations (without `@`), kept apart.
    fn extract_modifiers(&self, node: &Node, content: &str) -> (Vec<String>, Vec<String>) {
        let mut modifiers = Vec::new();
        let mut annotations = Vec::new();

        for list in TreeSitterParser::children_of_kind(node, "modifiers") {
            let mut cursor = list.walk();
            for modifier in list.children(&mut cursor) {
                let text = TreeSitterParser::node_text(&modifier, content);
                match text.strip_prefix('@') {
                    Some(annotation) => annotations.push(annotation.trim().to_string()),
                    None => modifiers.push(text.to_string()),
                }
            }
        }

        (modifiers, annotations)
    }

    fn extract_type_parameters(&self, node: &Node, content: &str) -> Vec<String> {
        let Some(params) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        TreeSitterParser::children_of_kind(&params, "type_parameter")
            .iter()
            .filter_map(|p| p.named_child(0))
            .map(|ident| TreeSitterParser::node_text(&ident, content).to_string())
            .collect()
    }

    /// No modifier means package-private.
    fn modifiers_to_visibility(&self, modifiers: &[String]) -> Visibility {
        if modifiers.iter().any(|m| m == "public") {
            Visibility::Public
        } else if modifiers.iter().any(|m| m == "private") {
            Visibility::Private
        } else if modifiers.iter().any(|m| m == "protected") {
            Visibility::Protected
        } else {
            Visibility::Internal
        }
    }

    fn extract_javadoc(&self, node: &Node, content: &str) -> Option<String> {
        // Look for block_comment immediately before
        let mut sibling = node.prev_sibling();
        while let Some(s) = sibling {
            if s.kind() == "block_comment" {
                let text = TreeSitterParser::node_text(&s, content);
                if text.starts_with("/**") {
                    return Some(clean_comment(text));
                }
            } else if s.kind() != "line_comment" {
                break;
            }
            sibling = s.prev_sibling();
        }

        extract_doc_comment(node, content)
    }
}

/// `Nullable`, `javax.annotation.Nullable`, `Nullable()`.
fn is_nullable_annotation(annotation: &str) -> bool {
    let name = annotation.split('(').next().unwrap_or(annotation);
    name.rsplit('.').next() == Some("Nullable")
}

impl Parser for JavaParser {
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
        self.process_body(&root, content, &mut result);

        Ok(result)
    }

    fn language(&self) -> Language {
        Language::Java
    }

    fn supported_extensions(&self) -> &[&'static str] {
        self.base.extensions()
    }

    fn capability(&self) -> ParserCapability {
        ParserCapability::Structural
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str, include_private: bool) -> Vec<TypeDefinition> {
        JavaParser::new()
            .parse_file("src/main/java/com/acme/Invoice.java", code, include_private)
            .unwrap()
            .into_types()
    }

    #[test]
    fn test_class_fields_and_heritage() {
        let code = r#"
package com.acme;

/**
 * An invoice.
 */
@Entity
public class Invoice extends Document implements Serializable, Comparable<Invoice> {
    private String id;
    @Nullable
    protected Double total;
    public List<LineItem> items;
    int a, b;
    private static final long serialVersionUID = 1L;
}
"#;
        let types = parse(code, false);
        assert_eq!(types.len(), 1);

        let invoice = &types[0];
        assert_eq!(invoice.kind, TypeKind::Class);
        assert_eq!(invoice.doc.as_deref(), Some("An invoice."));
        assert_eq!(invoice.decorators, vec!["Entity".to_string()]);
        assert_eq!(invoice.extends[0].name, "Document");
        assert_eq!(invoice.implements.len(), 2);

        let names: Vec<_> = invoice.field_names().collect();
        assert_eq!(names, vec!["id", "total", "items", "a", "b"]);
        assert_eq!(invoice.fields[0].visibility, Visibility::Private);
        assert!(invoice.fields[1].optional);
        assert_eq!(invoice.fields[1].visibility, Visibility::Protected);
        assert!(invoice.fields[2].type_ref.is_collection);
        assert_eq!(invoice.fields[3].visibility, Visibility::Internal);
    }

    #[test]
    fn test_interface_enum_record() {
        let code = r#"
public interface Repository<T> extends Closeable, Iterable<T> {
    T find(String id);
}

public enum Status {
    ACTIVE("a"),
    CLOSED;
}

public record Money(String currency, @Nullable BigDecimal amount) implements Priced {}
"#;
        let types = parse(code, false);
        assert_eq!(types.len(), 3);

        let repo = &types[0];
        assert_eq!(repo.kind, TypeKind::Interface);
        assert_eq!(repo.generics, vec!["T".to_string()]);
        assert_eq!(repo.extends.len(), 2);

        let status = &types[1];
        assert_eq!(status.kind, TypeKind::Enum);
        assert_eq!(status.variants[0].value.as_deref(), Some("\"a\""));
        assert_eq!(status.variants[1].value, None);

        let money = &types[2];
        assert_eq!(money.kind, TypeKind::Class);
        assert_eq!(money.field_names().collect::<Vec<_>>(), vec!["currency", "amount"]);
        assert!(money.fields[1].optional);
        assert_eq!(money.implements[0].name, "Priced");
    }

    #[test]
    fn test_package_private_and_nested() {
        let code = r#"
class Helper {
    public static class Inner {}
}
"#;
        assert!(parse(code, false).iter().all(|t| t.name == "Inner"));
        let all = parse(code, true);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].visibility, Visibility::Internal);
    }
}
