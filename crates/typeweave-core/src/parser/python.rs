//! Python parser using tree-sitter.
//!
//! Classes are classified by their bases: `Enum` subclasses become enums,
//! `Protocol` subclasses protocols, `TypedDict` subclasses interfaces and
//! everything else a class. Fields come from annotated class attributes and
//! from `self.x` assignments in `__init__`.

use tree_sitter::Node;

use super::result::ParseResult;
use super::traits::{Parser, ParserCapability};
use super::treesitter::TreeSitterParser;
use crate::decompose::decompose;
use crate::error::ParseError;
use crate::model::{
    FieldDefinition, Language, TypeDefinition, TypeKind, TypeRef, VariantDefinition, Visibility,
};

const UNTYPED: &str = "Any";

const ENUM_BASES: &[&str] = &["Enum", "IntEnum", "StrEnum", "Flag", "IntFlag"];

/// Bases that carry no structural meaning and are not recorded as heritage.
const IGNORED_BASES: &[&str] = &["object", "Generic", "Protocol"];

/// Python parser using tree-sitter.
pub struct PythonParser {
    base: TreeSitterParser,
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PythonParser {
    pub fn new() -> Self {
        Self {
            base: TreeSitterParser::new(
                tree_sitter_python::LANGUAGE.into(),
                Language::Python,
                &["py", "pyi"],
            ),
        }
    }

    pub(crate) fn tree_sitter(&self) -> &TreeSitterParser {
        &self.base
    }

    fn extract_class(
        &self,
        node: &Node,
        decorators: Vec<String>,
        content: &str,
        path: &str,
    ) -> Option<TypeDefinition> {
        let name = TreeSitterParser::field_text(node, "name", content)?;
        let bases = class_bases(node, content);

        let kind = if bases.iter().any(|b| ENUM_BASES.contains(&last_segment(b))) {
            TypeKind::Enum
        } else if bases.iter().any(|b| base_name(b) == "Protocol") {
            TypeKind::Protocol
        } else if bases.iter().any(|b| last_segment(b) == "TypedDict") {
            TypeKind::Interface
        } else {
            TypeKind::Class
        };

        let mut def = TypeDefinition::new(
            name,
            kind,
            path,
            TreeSitterParser::node_line(node),
            Language::Python,
        );
        def.visibility = visibility_of(name);
        def.decorators = decorators;
        def.generics = class_generics(node, &bases, content);
        def.extends = bases
            .iter()
            .filter(|b| !IGNORED_BASES.contains(&base_name(b)))
            .map(|b| decompose(b))
            .collect();

        if let Some(body) = node.child_by_field_name("body") {
            def.doc = docstring(&body, content);
            if kind == TypeKind::Enum {
                def.variants = enum_members(&body, content);
            } else {
                def.fields = class_fields(&body, content);
            }
        }

        Some(def)
    }
}

impl Parser for PythonParser {
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

        for (class, decorators) in top_level_classes(&root, content) {
            if let Some(def) = self.extract_class(&class, decorators, content, path) {
                result.add_type(def);
            }
        }

        Ok(result)
    }

    fn language(&self) -> Language {
        Language::Python
    }

    fn supported_extensions(&self) -> &[&'static str] {
        self.base.extensions()
    }

    fn capability(&self) -> ParserCapability {
        ParserCapability::Structural
    }
}

/// Module-level class definitions with their decorators.
pub(crate) fn top_level_classes<'t>(root: &Node<'t>, content: &str) -> Vec<(Node<'t>, Vec<String>)> {
    let mut classes = Vec::new();
    for child in TreeSitterParser::named_children(root) {
        match child.kind() {
            "class_definition" => classes.push((child, Vec::new())),
            "decorated_definition" => {
                if let Some(def) = child.child_by_field_name("definition") {
                    if def.kind() == "class_definition" {
                        classes.push((
                            def,
                            TreeSitterParser::decorators(&child, "decorator", content),
                        ));
                    }
                }
            }
            _ => {}
        }
    }
    classes
}

/// Positional base-class expressions; keyword arguments (`metaclass=`) are skipped.
pub(crate) fn class_bases(node: &Node, content: &str) -> Vec<String> {
    let Some(args) = node.child_by_field_name("superclasses") else {
        return Vec::new();
    };
    TreeSitterParser::named_children(&args)
        .iter()
        .filter(|arg| !matches!(arg.kind(), "keyword_argument" | "comment"))
        .map(|arg| TreeSitterParser::node_text(arg, content).trim().to_string())
        .collect()
}

/// Type parameters from PEP 695 syntax or a `Generic[..]`/`Protocol[..]` base.
fn class_generics(node: &Node, bases: &[String], content: &str) -> Vec<String> {
    if let Some(params) = node.child_by_field_name("type_parameters") {
        return TreeSitterParser::named_children(&params)
            .iter()
            .map(|p| TreeSitterParser::node_text(p, content).trim().to_string())
            .collect();
    }
    bases
        .iter()
        .filter(|b| matches!(base_name(b), "Generic" | "Protocol"))
        .flat_map(|b| decompose(b).generics)
        .map(|g| g.name)
        .collect()
}

fn enum_members(body: &Node, content: &str) -> Vec<VariantDefinition> {
    class_assignments(body)
        .iter()
        .filter(|a| a.child_by_field_name("type").is_none())
        .filter_map(|a| {
            let left = a.child_by_field_name("left")?;
            if left.kind() != "identifier" {
                return None;
            }
            let value = TreeSitterParser::field_text(a, "right", content).map(|v| v.to_string());
            Some(VariantDefinition::new(TreeSitterParser::node_text(&left, content)).with_value(value))
        })
        .collect()
}

/// Annotated class attributes, then `self.x` attributes set in `__init__`.
fn class_fields(body: &Node, content: &str) -> Vec<FieldDefinition> {
    let mut fields: Vec<FieldDefinition> = Vec::new();

    for assignment in class_assignments(body) {
        let (Some(left), Some(ty)) = (
            assignment.child_by_field_name("left"),
            assignment.child_by_field_name("type"),
        ) else {
            continue;
        };
        if left.kind() != "identifier" {
            continue;
        }
        let name = TreeSitterParser::node_text(&left, content);
        let ty = TreeSitterParser::node_text(&ty, content);
        if ty.starts_with("ClassVar") {
            continue;
        }
        let defaults_to_none =
            TreeSitterParser::field_text(&assignment, "right", content) == Some("None");
        fields.push(
            FieldDefinition::new(name, annotation_ref(ty))
                .or_optional(defaults_to_none)
                .with_visibility(visibility_of(name)),
        );
    }

    if let Some(init) = find_init(body, content) {
        for field in init_fields(&init, content) {
            if !fields.iter().any(|f| f.name == field.name) {
                fields.push(field);
            }
        }
    }

    fields
}

/// `assignment` nodes directly in a class body.
pub(crate) fn class_assignments<'t>(body: &Node<'t>) -> Vec<Node<'t>> {
    TreeSitterParser::children_of_kind(body, "expression_statement")
        .iter()
        .filter_map(|stmt| stmt.named_child(0))
        .filter(|expr| expr.kind() == "assignment")
        .collect()
}

fn find_init<'t>(body: &Node<'t>, content: &str) -> Option<Node<'t>> {
    TreeSitterParser::named_children(body)
        .into_iter()
        .map(|child| {
            if child.kind() == "decorated_definition" {
                child.child_by_field_name("definition").unwrap_or(child)
            } else {
                child
            }
        })
        .find(|child| {
            child.kind() == "function_definition"
                && TreeSitterParser::field_text(child, "name", content) == Some("__init__")
        })
}

fn init_fields(init: &Node, content: &str) -> Vec<FieldDefinition> {
    let params = init_parameter_types(init, content);
    let Some(body) = init.child_by_field_name("body") else {
        return Vec::new();
    };

    let mut fields: Vec<FieldDefinition> = Vec::new();
    for assignment in class_assignments(&body) {
        let Some(left) = assignment.child_by_field_name("left") else {
            continue;
        };
        if left.kind() != "attribute"
            || TreeSitterParser::field_text(&left, "object", content) != Some("self")
        {
            continue;
        }
        let Some(name) = TreeSitterParser::field_text(&left, "attribute", content) else {
            continue;
        };
        if fields.iter().any(|f| f.name == name) {
            continue;
        }

        let right = TreeSitterParser::field_text(&assignment, "right", content);
        let type_ref = match TreeSitterParser::field_text(&assignment, "type", content) {
            Some(ty) => annotation_ref(ty),
            None => right
                .and_then(|r| params.iter().find(|(p, _)| *p == r))
                .map(|(_, ty)| annotation_ref(ty))
                .unwrap_or_else(|| TypeRef::unresolved(UNTYPED)),
        };
        fields.push(
            FieldDefinition::new(name, type_ref)
                .or_optional(right == Some("None"))
                .with_visibility(visibility_of(name)),
        );
    }
    fields
}

/// Decompose an annotation, resolving string forward references such as
/// `"Customer"` or `list["LineItem"]`. `raw` keeps the annotation as written.
pub(crate) fn annotation_ref(annotation: &str) -> TypeRef {
    if !annotation.contains(['"', '\'']) {
        return decompose(annotation);
    }
    let unquoted: String = annotation
        .chars()
        .filter(|c| *c != '"' && *c != '\'')
        .collect();
    let mut type_ref = decompose(&unquoted);
    type_ref.raw = annotation.to_string();
    type_ref
}

/// `(name, annotation)` pairs of typed `__init__` parameters.
fn init_parameter_types<'a>(init: &Node, content: &'a str) -> Vec<(&'a str, &'a str)> {
    let Some(params) = init.child_by_field_name("parameters") else {
        return Vec::new();
    };
    TreeSitterParser::named_children(&params)
        .iter()
        .filter(|p| matches!(p.kind(), "typed_parameter" | "typed_default_parameter"))
        .filter_map(|p| {
            let name = p
                .child_by_field_name("name")
                .or_else(|| p.named_child(0))
                .map(|n| TreeSitterParser::node_text(&n, content))?;
            let ty = TreeSitterParser::field_text(p, "type", content)?;
            Some((name, ty))
        })
        .collect()
}

/// First-statement string literal of a class body.
pub(crate) fn docstring(body: &Node, content: &str) -> Option<String> {
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let string = first.named_child(0)?;
    if string.kind() != "string" {
        return None;
    }
    let text = TreeSitterParser::node_text(&string, content)
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// `__x` is private (name-mangled), `_x` internal, dunders and the rest public.
pub(crate) fn visibility_of(name: &str) -> Visibility {
    if name.starts_with("__") && !name.ends_with("__") {
        Visibility::Private
    } else if name.starts_with('_') && !name.starts_with("__") {
        Visibility::Internal
    } else {
        Visibility::Public
    }
}

/// `typing.Generic[T]` → `Generic`.
fn base_name(base: &str) -> &str {
    let head = base.split('[').next().unwrap_or(base);
    last_segment(head)
}

pub(crate) fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path).trim()
}
