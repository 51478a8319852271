//! Tree-sitter based parsing utilities shared across language parsers.

use tree_sitter::{Language as Grammar, Node, Parser as TSParser, Tree};

use crate::decompose::{decompose, split_top_level};
use crate::error::ParseError;
use crate::model::{Language, TypeRef};

/// Base tree-sitter parser with shared functionality.
pub struct TreeSitterParser {
    grammar: Grammar,
    language: Language,
    extensions: &'static [&'static str],
}

impl TreeSitterParser {
    pub fn new(grammar: Grammar, language: Language, extensions: &'static [&'static str]) -> Self {
        Self {
            grammar,
            language,
            extensions,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    /// Parse source code into a tree-sitter tree.
    ///
    /// Tree-sitter recovers from syntax errors, so a tree containing error
    /// nodes is still returned; only grammar setup or an aborted parse fail.
    pub fn parse_tree(&self, content: &str) -> Result<Tree, ParseError> {
        let mut parser = TSParser::new();
        parser
            .set_language(&self.grammar)
            .map_err(|e| ParseError::Grammar {
                language: self.language,
                message: e.to_string(),
            })?;

        parser
            .parse(content, None)
            .ok_or_else(|| ParseError::Syntax("tree-sitter aborted the parse".to_string()))
    }

    /// Get text for a node from source content.
    pub fn node_text<'a>(node: &Node, content: &'a str) -> &'a str {
        content.get(node.byte_range()).unwrap_or("")
    }

    /// Get line number (1-based) for a node.
    pub fn node_line(node: &Node) -> u32 {
        node.start_position().row as u32 + 1
    }

    /// Text of the named field child, if present.
    pub fn field_text<'a>(node: &Node, field: &str, content: &'a str) -> Option<&'a str> {
        node.child_by_field_name(field)
            .map(|n| Self::node_text(&n, content))
    }

    /// Texts of every child bound to a (repeatable) field name.
    pub fn field_texts<'a>(node: &Node, field: &str, content: &'a str) -> Vec<&'a str> {
        let mut cursor = node.walk();
        let texts = node
            .children_by_field_name(field, &mut cursor)
            .map(|n| Self::node_text(&n, content))
            .collect();
        texts
    }

    /// Find all direct children of a specific kind.
    pub fn children_of_kind<'t>(node: &Node<'t>, kind: &str) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .filter(|n| n.kind() == kind)
            .collect()
    }

    /// All named children, collected so callers can recurse freely.
    pub fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor).collect()
    }

    /// Decorator-style children (`@Foo(..)`), rendered without the sigil.
    pub fn decorators(node: &Node, kind: &str, content: &str) -> Vec<String> {
        Self::children_of_kind(node, kind)
            .iter()
            .map(|d| Self::node_text(d, content).trim_start_matches('@').trim().to_string())
            .collect()
    }

    /// Whether any direct child has the given kind.
    pub fn has_child_kind(node: &Node, kind: &str) -> bool {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).any(|n| n.kind() == kind);
        found
    }
}

/// Heritage clause text (`extends A, B<C>`, `implements D`) → references.
pub fn type_list(clause: &str, keyword: &str) -> Vec<TypeRef> {
    let clause = clause.trim();
    let list = clause.strip_prefix(keyword).unwrap_or(clause).trim();
    split_top_level(list).into_iter().map(decompose).collect()
}

/// Collect the comment block directly above a declaration.
///
/// Comments separated from the node (or from each other) by a blank line
/// are not attached.
pub fn extract_doc_comment(node: &Node, content: &str) -> Option<String> {
    let mut comments = Vec::new();
    let mut next_row = node.start_position().row;
    let mut sibling = node.prev_sibling();

    while let Some(s) = sibling {
        if !s.kind().contains("comment") || s.end_position().row + 1 < next_row {
            break;
        }
        comments.push(clean_comment(TreeSitterParser::node_text(&s, content)));
        next_row = s.start_position().row;
        sibling = s.prev_sibling();
    }

    if comments.is_empty() {
        return None;
    }
    comments.reverse();
    let doc = comments.join("\n").trim().to_string();
    (!doc.is_empty()).then_some(doc)
}

/// Strip comment markers from a line or block comment.
pub fn clean_comment(text: &str) -> String {
    let text = text.trim();
    let body = text
        .strip_prefix("/**")
        .or_else(|| text.strip_prefix("/*"))
        .map(|b| b.strip_suffix("*/").unwrap_or(b));

    match body {
        Some(block) => block
            .lines()
            .map(|line| line.trim().trim_start_matches('*').trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        None => text
            .lines()
            .map(|line| {
                line.trim()
                    .trim_start_matches('/')
                    .trim_start_matches('#')
                    .trim()
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_line_comments() {
        assert_eq!(clean_comment("/// Hello"), "Hello");
        assert_eq!(clean_comment("// Hello"), "Hello");
        assert_eq!(clean_comment("# Hello"), "Hello");
    }

    #[test]
    fn test_type_list() {
        let refs = type_list("implements Serializable, Comparable<Map<K, V>>", "implements");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].name, "Comparable");
        assert_eq!(refs[1].raw, "Comparable<Map<K, V>>");
    }

    #[test]
    fn test_clean_block_comment() {
        let doc = "/**\n * An invoice.\n *\n * @since 2\n */";
        assert_eq!(clean_comment(doc), "An invoice.\n@since 2");
    }
}
