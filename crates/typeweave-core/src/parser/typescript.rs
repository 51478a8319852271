//! TypeScript and JavaScript parser using tree-sitter.
//!
//! TypeScript yields classes, interfaces, enums and type aliases; object
//! literal aliases contribute fields, intersections contribute base types and
//! unions become `union` definitions. JavaScript has no type declarations
//! beyond classes, whose fields are typed `any`.

use tree_sitter::Node;

use super::result::ParseResult;
use super::traits::{Parser, ParserCapability};
use super::treesitter::{extract_doc_comment, type_list, TreeSitterParser};
use crate::decompose::decompose;
use crate::error::ParseError;
use crate::model::{
    FieldDefinition, Language, TypeDefinition, TypeKind, TypeRef, VariantDefinition, Visibility,
};

const UNTYPED: &str = "any";

/// TypeScript/JavaScript parser using tree-sitter.
pub struct TypeScriptParser {
    base: TreeSitterParser,
    /// JSX-aware grammar for `.tsx` files.
    tsx: Option<TreeSitterParser>,
    is_typescript: bool,
}

impl TypeScriptParser {
    /// Create a TypeScript parser.
    pub fn typescript() -> Self {
        Self {
            base: TreeSitterParser::new(
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
                Language::TypeScript,
                &["ts", "tsx", "mts", "cts"],
            ),
            tsx: Some(TreeSitterParser::new(
                tree_sitter_typescript::LANGUAGE_TSX.into(),
                Language::TypeScript,
                &["tsx"],
            )),
            is_typescript: true,
        }
    }

    /// Create a JavaScript parser.
    pub fn javascript() -> Self {
        Self {
            base: TreeSitterParser::new(
                tree_sitter_javascript::LANGUAGE.into(),
                Language::JavaScript,
                &["js", "jsx", "mjs", "cjs"],
            ),
            tsx: None,
            is_typescript: false,
        }
    }

    fn grammar_for(&self, path: &str) -> &TreeSitterParser {
        match &self.tsx {
            Some(tsx) if path.to_ascii_lowercase().ends_with(".tsx") => tsx,
            _ => &self.base,
        }
    }

    /// Walk a statement list, descending into namespaces and ambient blocks.
    fn visit_scope(&self, node: &Node, content: &str, result: &mut ParseResult) {
        for child in TreeSitterParser::named_children(node) {
            match child.kind() {
                "export_statement" => {
                    if let Some(decl) = child.child_by_field_name("declaration") {
                        self.visit_declaration(&decl, Some(&child), content, result);
                    }
                }
                "ambient_declaration" | "expression_statement" => {
                    self.visit_scope(&child, content, result);
                }
                _ => self.visit_declaration(&child, None, content, result),
            }
        }
    }

    fn visit_declaration(
        &self,
        node: &Node,
        export: Option<&Node>,
        content: &str,
        result: &mut ParseResult,
    ) {
        let def = match node.kind() {
            "class_declaration" | "abstract_class_declaration" | "class" => {
                self.extract_class(node, export, content, &result.file_path)
            }
            "interface_declaration" if self.is_typescript => {
                self.extract_interface(node, export, content, &result.file_path)
            }
            "enum_declaration" if self.is_typescript => {
                self.extract_enum(node, export, content, &result.file_path)
            }
            "type_alias_declaration" if self.is_typescript => {
                self.extract_type_alias(node, export, content, &result.file_path)
            }
            "internal_module" | "module" => {
                if let Some(body) = node.child_by_field_name("body") {
                    self.visit_scope(&body, content, result);
                }
                None
            }
            _ => None,
        };

        if let Some(def) = def {
            result.add_type(def);
        }
    }

    /// Shared header: name, line, visibility, generics, doc.
    fn definition(
        &self,
        node: &Node,
        export: Option<&Node>,
        kind: TypeKind,
        content: &str,
        path: &str,
    ) -> Option<TypeDefinition> {
        let name = TreeSitterParser::field_text(node, "name", content)?;

        let mut def = TypeDefinition::new(
            name,
            kind,
            path,
            TreeSitterParser::node_line(node),
            self.base.language(),
        );
        def.visibility = if export.is_some() {
            Visibility::Public
        } else {
            Visibility::Private
        };
        def.generics = Self::extract_generics(node, content);
        def.doc = extract_doc_comment(export.unwrap_or(node), content);
        Some(def)
    }

    fn extract_class(
        &self,
        node: &Node,
        export: Option<&Node>,
        content: &str,
        path: &str,
    ) -> Option<TypeDefinition> {
        let mut def = self.definition(node, export, TypeKind::Class, content, path)?;

        let mut decorators = Vec::new();
        if let Some(export) = export {
            decorators.extend(TreeSitterParser::decorators(export, "decorator", content));
        }
        decorators.extend(TreeSitterParser::decorators(node, "decorator", content));
        def.decorators = decorators;

        if let Some(heritage) = TreeSitterParser::children_of_kind(node, "class_heritage").first() {
            self.extract_heritage(heritage, content, &mut def);
        }

        if let Some(body) = node.child_by_field_name("body") {
            def.fields = self.extract_class_fields(&body, content);
        }

        Some(def)
    }

    fn extract_heritage(&self, heritage: &Node, content: &str, def: &mut TypeDefinition) {
        let clauses = TreeSitterParser::named_children(heritage);
        let mut found_clause = false;

        for clause in &clauses {
            match clause.kind() {
                "extends_clause" => {
                    found_clause = true;
                    def.extends
                        .extend(type_list(TreeSitterParser::node_text(clause, content), "extends"));
                }
                "implements_clause" => {
                    found_clause = true;
                    def.implements.extend(type_list(
                        TreeSitterParser::node_text(clause, content),
                        "implements",
                    ));
                }
                _ => {}
            }
        }

        // The JavaScript grammar has no clause nodes: `extends <expr>` directly.
        if !found_clause {
            def.extends
                .extend(type_list(TreeSitterParser::node_text(heritage, content), "extends"));
        }
    }

    fn extract_class_fields(&self, body: &Node, content: &str) -> Vec<FieldDefinition> {
        let mut fields: Vec<FieldDefinition> = Vec::new();

        for member in TreeSitterParser::named_children(body) {
            match member.kind() {
                "public_field_definition" | "field_definition" => {
                    if TreeSitterParser::has_child_kind(&member, "static") {
                        continue;
                    }
                    if let Some(field) = self.extract_member(&member, content) {
                        fields.push(field);
                    }
                }
                "method_definition"
                    if TreeSitterParser::field_text(&member, "name", content)
                        == Some("constructor") =>
                {
                    for field in self.extract_constructor_fields(&member, content) {
                        if !fields.iter().any(|f| f.name == field.name) {
                            fields.push(field);
                        }
                    }
                }
                _ => {}
            }
        }

        fields
    }

    /// A class property or interface/object property signature.
    fn extract_member(&self, member: &Node, content: &str) -> Option<FieldDefinition> {
        let name_node = member
            .child_by_field_name("name")
            .or_else(|| member.child_by_field_name("property"))?;
        let name = TreeSitterParser::node_text(&name_node, content);

        let visibility = if name_node.kind() == "private_property_identifier" {
            Visibility::Private
        } else {
            Self::accessibility(member, content)
        };

        let type_ref = match type_annotation(member, content) {
            Some(text) => decompose(text),
            None => TypeRef::unresolved(UNTYPED),
        };

        Some(
            FieldDefinition::new(name.trim_start_matches('#'), type_ref)
                .or_optional(TreeSitterParser::has_child_kind(member, "?"))
                .with_visibility(visibility)
                .with_decorators(TreeSitterParser::decorators(member, "decorator", content))
                .with_doc(extract_doc_comment(member, content)),
        )
    }

    /// Parameter properties (`constructor(private id: string)`) and
    /// `this.x = ...` assignments in the constructor body.
    fn extract_constructor_fields(&self, ctor: &Node, content: &str) -> Vec<FieldDefinition> {
        let mut fields = Vec::new();

        if let Some(params) = ctor.child_by_field_name("parameters") {
            for param in TreeSitterParser::named_children(&params) {
                if !matches!(param.kind(), "required_parameter" | "optional_parameter") {
                    continue;
                }
                let is_property = TreeSitterParser::has_child_kind(&param, "accessibility_modifier")
                    || TreeSitterParser::has_child_kind(&param, "readonly");
                if !is_property {
                    continue;
                }
                let Some(name) = TreeSitterParser::field_text(&param, "pattern", content) else {
                    continue;
                };
                let type_ref = match type_annotation(&param, content) {
                    Some(text) => decompose(text),
                    None => TypeRef::unresolved(UNTYPED),
                };
                fields.push(
                    FieldDefinition::new(name, type_ref)
                        .or_optional(param.kind() == "optional_parameter")
                        .with_visibility(Self::accessibility(&param, content)),
                );
            }
        }

        if let Some(body) = ctor.child_by_field_name("body") {
            for statement in TreeSitterParser::children_of_kind(&body, "expression_statement") {
                let Some(assignment) = statement.named_child(0) else {
                    continue;
                };
                if assignment.kind() != "assignment_expression" {
                    continue;
                }
                let Some(target) = assignment.child_by_field_name("left") else {
                    continue;
                };
                if target.kind() != "member_expression"
                    || TreeSitterParser::field_text(&target, "object", content) != Some("this")
                {
                    continue;
                }
                if let Some(name) = TreeSitterParser::field_text(&target, "property", content) {
                    if !fields.iter().any(|f: &FieldDefinition| f.name == name) {
                        fields.push(FieldDefinition::new(name, TypeRef::unresolved(UNTYPED)));
                    }
                }
            }
        }

        fields
    }

    fn extract_interface(
        &self,
        node: &Node,
        export: Option<&Node>,
        content: &str,
        path: &str,
    ) -> Option<TypeDefinition> {
        let mut def = self.definition(node, export, TypeKind::Interface, content, path)?;

        if let Some(clause) = TreeSitterParser::children_of_kind(node, "extends_type_clause").first()
        {
            def.extends = type_list(TreeSitterParser::node_text(clause, content), "extends");
        }
        if let Some(body) = node.child_by_field_name("body") {
            def.fields = self.extract_property_signatures(&body, content);
        }

        Some(def)
    }

    fn extract_property_signatures(&self, body: &Node, content: &str) -> Vec<FieldDefinition> {
        TreeSitterParser::children_of_kind(body, "property_signature")
            .iter()
            .filter_map(|member| self.extract_member(member, content))
            .collect()
    }

    fn extract_enum(
        &self,
        node: &Node,
        export: Option<&Node>,
        content: &str,
        path: &str,
    ) -> Option<TypeDefinition> {
        let mut def = self.definition(node, export, TypeKind::Enum, content, path)?;

        if let Some(body) = node.child_by_field_name("body") {
            for member in TreeSitterParser::named_children(&body) {
                let variant = match member.kind() {
                    "property_identifier" | "string" => VariantDefinition::new(unquote(
                        TreeSitterParser::node_text(&member, content),
                    )),
                    "enum_assignment" => {
                        let Some(name) = TreeSitterParser::field_text(&member, "name", content)
                        else {
                            continue;
                        };
                        VariantDefinition::new(unquote(name)).with_value(
                            TreeSitterParser::field_text(&member, "value", content)
                                .map(|v| v.to_string()),
                        )
                    }
                    _ => continue,
                };
                def.variants.push(variant);
            }
        }

        Some(def)
    }

    fn extract_type_alias(
        &self,
        node: &Node,
        export: Option<&Node>,
        content: &str,
        path: &str,
    ) -> Option<TypeDefinition> {
        let mut def = self.definition(node, export, TypeKind::TypeAlias, content, path)?;
        let Some(value) = node.child_by_field_name("value") else {
            return Some(def);
        };

        match value.kind() {
            "object_type" => def.fields = self.extract_property_signatures(&value, content),
            "intersection_type" => {
                let mut parts = Vec::new();
                flatten_type(&value, "intersection_type", &mut parts);
                for part in parts {
                    if part.kind() == "object_type" {
                        def.fields
                            .extend(self.extract_property_signatures(&part, content));
                    } else {
                        def.extends
                            .push(decompose(TreeSitterParser::node_text(&part, content)));
                    }
                }
            }
            "union_type" => {
                let mut members = Vec::new();
                flatten_type(&value, "union_type", &mut members);
                def.kind = TypeKind::Union;
                def.variants = members
                    .iter()
                    .filter_map(|member| union_variant(member, content))
                    .collect();
            }
            _ => {}
        }

        Some(def)
    }

    fn extract_generics(node: &Node, content: &str) -> Vec<String> {
        let Some(params) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        TreeSitterParser::children_of_kind(&params, "type_parameter")
            .iter()
            .filter_map(|p| TreeSitterParser::field_text(p, "name", content))
            .map(|name| name.to_string())
            .collect()
    }

    fn accessibility(node: &Node, content: &str) -> Visibility {
        TreeSitterParser::children_of_kind(node, "accessibility_modifier")
            .first()
            .map(|m| match TreeSitterParser::node_text(m, content) {
                "private" => Visibility::Private,
                "protected" => Visibility::Protected,
                _ => Visibility::Public,
            })
            .unwrap_or(Visibility::Public)
    }
}

impl Parser for TypeScriptParser {
    fn parse_file(
        &self,
        path: &str,
        content: &str,
        include_private: bool,
    ) -> Result<ParseResult, ParseError> {
        let tree = self.grammar_for(path).parse_tree(content)?;
        let root = tree.root_node();

        let mut result = ParseResult::new(path, include_private);
        if root.has_error() {
            result.warn("syntax errors present; extraction is partial");
        }
        self.visit_scope(&root, content, &mut result);

        Ok(result)
    }

    fn language(&self) -> Language {
        self.base.language()
    }

    fn supported_extensions(&self) -> &[&'static str] {
        self.base.extensions()
    }

    fn capability(&self) -> ParserCapability {
        ParserCapability::Structural
    }
}

/// The type inside a `: T` annotation on a member or parameter.
fn type_annotation<'a>(node: &Node, content: &'a str) -> Option<&'a str> {
    let annotation = node.child_by_field_name("type")?;
    let inner = if annotation.kind() == "type_annotation" {
        annotation.named_child(0)?
    } else {
        annotation
    };
    Some(TreeSitterParser::node_text(&inner, content))
}

/// Flatten left-nested binary type operators into their operands.
fn flatten_type<'t>(node: &Node<'t>, kind: &str, out: &mut Vec<Node<'t>>) {
    for child in TreeSitterParser::named_children(node) {
        if child.kind() == kind {
            flatten_type(&child, kind, out);
        } else {
            out.push(child);
        }
    }
}

fn union_variant(member: &Node, content: &str) -> Option<VariantDefinition> {
    let text = TreeSitterParser::node_text(member, content).trim();
    if matches!(text, "null" | "undefined") {
        return None;
    }
    if member.kind() == "literal_type" {
        return Some(VariantDefinition::new(unquote(text)).with_value(Some(text.to_string())));
    }
    Some(VariantDefinition::new(text).with_fields(vec![FieldDefinition::new("0", decompose(text))]))
}

fn unquote(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}
