//! C# parser using tree-sitter.

use tree_sitter::Node;

use super::result::ParseResult;
use super::traits::{Parser, ParserCapability};
use super::treesitter::{type_list, TreeSitterParser};
use crate::decompose::decompose;
use crate::error::ParseError;
use crate::model::{
    FieldDefinition, Language, TypeDefinition, TypeKind, VariantDefinition, Visibility,
};

/// C# parser using tree-sitter.
pub struct CSharpParser {
    base: TreeSitterParser,
}

impl Default for CSharpParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a declaration sits; decides the default accessibility.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Namespace or file level: defaults to `internal`.
    TopLevel,
    /// Inside a class/struct/record: defaults to `private`.
    Member,
    /// Inside an interface: defaults to `public`.
    InterfaceMember,
}

impl CSharpParser {
    pub fn new() -> Self {
        Self {
            base: TreeSitterParser::new(
                tree_sitter_c_sharp::LANGUAGE.into(),
                Language::CSharp,
                &["cs"],
            ),
        }
    }

    fn process_declarations(
        &self,
        node: &Node,
        scope: Scope,
        content: &str,
        result: &mut ParseResult,
    ) {
        for child in TreeSitterParser::named_children(node) {
            let kind = match child.kind() {
                "namespace_declaration" => {
                    if let Some(body) = child.child_by_field_name("body") {
                        self.process_declarations(&body, Scope::TopLevel, content, result);
                    }
                    continue;
                }
                "file_scoped_namespace_declaration" => {
                    self.process_declarations(&child, Scope::TopLevel, content, result);
                    continue;
                }
                "class_declaration" | "record_declaration" => TypeKind::Class,
                "struct_declaration" => TypeKind::Struct,
                "interface_declaration" => TypeKind::Interface,
                "enum_declaration" => TypeKind::Enum,
                _ => continue,
            };

            if let Some(def) = self.extract_type(&child, kind, scope, content, &result.file_path) {
                result.add_type(def);
            }
            if let Some(body) = child.child_by_field_name("body") {
                self.process_declarations(&body, Scope::Member, content, result);
            }
        }
    }

    fn extract_type(
        &self,
        node: &Node,
        kind: TypeKind,
        scope: Scope,
        content: &str,
        path: &str,
    ) -> Option<TypeDefinition> {
        let name = TreeSitterParser::field_text(node, "name", content)?;
        let modifiers = self.extract_modifiers(node, content);

        let mut def = TypeDefinition::new(
            name,
            kind,
            path,
            TreeSitterParser::node_line(node),
            Language::CSharp,
        );
        def.visibility = self.modifiers_to_visibility(&modifiers, scope);
        def.decorators = self.extract_attributes(node, content);
        def.generics = self.extract_type_parameters(node, content);
        def.doc = self.extract_xml_doc(node, content);

        if kind != TypeKind::Enum {
            self.assign_bases(node, kind, content, &mut def);
        }

        // The grammar leaves a record's primary constructor list unnamed.
        let params = node.child_by_field_name("parameters").or_else(|| {
            TreeSitterParser::children_of_kind(node, "parameter_list")
                .into_iter()
                .next()
        });
        if let Some(params) = params {
            def.fields = self.extract_record_parameters(&params, content);
        }

        if let Some(body) = node.child_by_field_name("body") {
            match kind {
                TypeKind::Enum => def.variants = self.extract_enum_members(&body, content),
                TypeKind::Interface => {
                    def.fields = self.extract_members(&body, Scope::InterfaceMember, content)
                }
                _ => def
                    .fields
                    .extend(self.extract_members(&body, Scope::Member, content)),
            }
        }

        Some(def)
    }

    /// Split the base list: a class's first base is its superclass unless it
    /// follows the `IName` interface convention; structs only implement;
    /// interfaces only extend.
    fn assign_bases(&self, node: &Node, kind: TypeKind, content: &str, def: &mut TypeDefinition) {
        let Some(base_list) = TreeSitterParser::children_of_kind(node, "base_list")
            .into_iter()
            .next()
        else {
            return;
        };
        let mut bases = type_list(TreeSitterParser::node_text(&base_list, content), ":");

        match kind {
            TypeKind::Interface => def.extends = bases,
            TypeKind::Class => {
                if bases.first().is_some_and(|b| !is_interface_name(&b.name)) {
                    def.extends.push(bases.remove(0));
                }
                def.implements = bases;
            }
            _ => def.implements = bases,
        }
    }

    fn extract_members(&self, body: &Node, scope: Scope, content: &str) -> Vec<FieldDefinition> {
        let mut fields = Vec::new();

        for child in TreeSitterParser::named_children(body) {
            let modifiers = self.extract_modifiers(&child, content);
            if modifiers.iter().any(|m| m == "static" || m == "const") {
                continue;
            }
            let visibility = self.modifiers_to_visibility(&modifiers, scope);
            let attributes = self.extract_attributes(&child, content);
            let doc = self.extract_xml_doc(&child, content);

            match child.kind() {
                "field_declaration" => {
                    let Some(declaration) =
                        TreeSitterParser::children_of_kind(&child, "variable_declaration")
                            .into_iter()
                            .next()
                    else {
                        continue;
                    };
                    let Some(type_text) =
                        TreeSitterParser::field_text(&declaration, "type", content)
                    else {
                        continue;
                    };
                    for var in TreeSitterParser::children_of_kind(&declaration, "variable_declarator")
                    {
                        let name = TreeSitterParser::field_text(&var, "name", content)
                            .or_else(|| var.named_child(0).map(|n| TreeSitterParser::node_text(&n, content)));
                        if let Some(name) = name {
                            fields.push(
                                FieldDefinition::new(name, decompose(type_text))
                                    .with_visibility(visibility)
                                    .with_decorators(attributes.clone())
                                    .with_doc(doc.clone()),
                            );
                        }
                    }
                }
                "property_declaration" => {
                    let (Some(name), Some(type_text)) = (
                        TreeSitterParser::field_text(&child, "name", content),
                        TreeSitterParser::field_text(&child, "type", content),
                    ) else {
                        continue;
                    };
                    fields.push(
                        FieldDefinition::new(name, decompose(type_text))
                            .with_visibility(visibility)
                            .with_decorators(attributes)
                            .with_doc(doc),
                    );
                }
                _ => {}
            }
        }

        fields
    }

    /// Positional record parameters become public properties.
    fn extract_record_parameters(&self, params: &Node, content: &str) -> Vec<FieldDefinition> {
        TreeSitterParser::children_of_kind(params, "parameter")
            .iter()
            .filter_map(|param| {
                let name = TreeSitterParser::field_text(param, "name", content)?;
                let ty = TreeSitterParser::field_text(param, "type", content)?;
                Some(
                    FieldDefinition::new(name, decompose(ty))
                        .with_decorators(self.extract_attributes(param, content)),
                )
            })
            .collect()
    }

    fn extract_enum_members(&self, body: &Node, content: &str) -> Vec<VariantDefinition> {
        TreeSitterParser::children_of_kind(body, "enum_member_declaration")
            .iter()
            .filter_map(|member| {
                let name = TreeSitterParser::field_text(member, "name", content)?;
                let value =
                    TreeSitterParser::field_text(member, "value", content).map(|v| v.to_string());
                Some(VariantDefinition::new(name).with_value(value))
            })
            .collect()
    }

    fn extract_modifiers(&self, node: &Node, content: &str) -> Vec<String> {
        TreeSitterParser::children_of_kind(node, "modifier")
            .iter()
            .map(|m| TreeSitterParser::node_text(m, content).to_string())
            .collect()
    }

    /// Each attribute inside `[A, B(..)]` lists.
    fn extract_attributes(&self, node: &Node, content: &str) -> Vec<String> {
        TreeSitterParser::children_of_kind(node, "attribute_list")
            .iter()
            .flat_map(|list| TreeSitterParser::children_of_kind(list, "attribute"))
            .map(|attr| TreeSitterParser::node_text(&attr, content).to_string())
            .collect()
    }

    fn extract_type_parameters(&self, node: &Node, content: &str) -> Vec<String> {
        node.child_by_field_name("type_parameters")
            .map(|params| {
                TreeSitterParser::children_of_kind(&params, "type_parameter")
                    .iter()
                    .map(|p| {
                        TreeSitterParser::field_text(p, "name", content)
                            .unwrap_or_else(|| TreeSitterParser::node_text(p, content))
                            .to_string()
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn modifiers_to_visibility(&self, modifiers: &[String], scope: Scope) -> Visibility {
        let has = |m: &str| modifiers.iter().any(|x| x == m);
        if has("public") {
            Visibility::Public
        } else if has("protected") {
            Visibility::Protected
        } else if has("internal") {
            Visibility::Internal
        } else if has("private") {
            Visibility::Private
        } else {
            match scope {
                Scope::TopLevel => Visibility::Internal,
                Scope::Member => Visibility::Private,
                Scope::InterfaceMember => Visibility::Public,
            }
        }
    }

    /// `///` XML doc comments with the markup removed.
    fn extract_xml_doc(&self, node: &Node, content: &str) -> Option<String> {
        let mut comments = Vec::new();
        let mut sibling = node.prev_sibling();

        while let Some(s) = sibling {
            if s.kind() != "comment" {
                break;
            }
            let text = TreeSitterParser::node_text(&s, content);
            let Some(line) = text.strip_prefix("///") else {
                break;
            };
            comments.push(strip_xml_tags(line).trim().to_string());
            sibling = s.prev_sibling();
        }

        comments.reverse();
        let doc = comments
            .into_iter()
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        (!doc.is_empty()).then_some(doc)
    }
}

impl Parser for CSharpParser {
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
        self.process_declarations(&root, Scope::TopLevel, content, &mut result);

        Ok(result)
    }

    fn language(&self) -> Language {
        Language::CSharp
    }

    fn supported_extensions(&self) -> &[&'static str] {
        self.base.extensions()
    }

    fn capability(&self) -> ParserCapability {
        ParserCapability::Structural
    }
}

/// `IRepository`, `IList<T>`: an `I` followed by another capital.
fn is_interface_name(name: &str) -> bool {
    let short = name.rsplit('.').next().unwrap_or(name);
    let mut chars = short.chars();
    chars.next() == Some('I') && chars.next().is_some_and(|c| c.is_ascii_uppercase())
}

fn strip_xml_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}
