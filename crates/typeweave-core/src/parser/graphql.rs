//! GraphQL SDL scanner.

use once_cell::sync::Lazy;
use regex::Regex;

use super::result::ParseResult;
use super::text::{self, CommentStyle};
use super::traits::{Parser, ParserCapability};
use crate::decompose::decompose;
use crate::error::ParseError;
use crate::model::{
    FieldDefinition, Language, TypeDefinition, TypeKind, TypeRef, VariantDefinition,
};

const STYLE: CommentStyle = CommentStyle {
    line: "#",
    block: false,
    triple_quoted: true,
};

/// `type X implements A & B @dir {`, `input X {`, `enum X {`, `interface X {`.
static BLOCK_DEFINITION: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(extend\s+)?(type|input|interface|enum)\s+(\w+)([^{]*)\{").ok()
});

/// `union X @dir = A | B`.
static UNION_DEFINITION: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*union\s+(\w+)([^=\n]*)=\s*\|?\s*(\w+(?:\s*\|\s*\w+)*)").ok()
});

static DIRECTIVE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"@(\w+)(\([^)]*\))?").ok());

/// `name(args): Type @dir` (arguments removed before matching).
static FIELD: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\s*(\w+)\s*:\s*([\[\]\w!\s]+?)\s*(@.*)?$").ok());

/// GraphQL schema parser.
#[derive(Debug, Default)]
pub struct GraphQLParser;

impl GraphQLParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for GraphQLParser {
    fn parse_file(
        &self,
        path: &str,
        content: &str,
        include_private: bool,
    ) -> Result<ParseResult, ParseError> {
        let (Some(blocks), Some(unions)) = (BLOCK_DEFINITION.as_ref(), UNION_DEFINITION.as_ref())
        else {
            return Err(ParseError::Grammar {
                language: Language::GraphQL,
                message: "scanner patterns failed to compile".to_string(),
            });
        };

        let masked = text::mask(content, STYLE);
        let mut result = ParseResult::new(path, include_private);
        let mut found: Vec<(usize, TypeDefinition)> = Vec::new();

        for caps in blocks.captures_iter(&masked) {
            let (Some(whole), Some(keyword), Some(name)) = (caps.get(0), caps.get(2), caps.get(3))
            else {
                continue;
            };
            // Extensions add to a type declared elsewhere.
            if caps.get(1).is_some() {
                continue;
            }
            let open = whole.end() - 1;
            let Some(close) = text::block_end(&masked, open) else {
                result.warn(format!("unterminated definition of {}", name.as_str()));
                continue;
            };

            let kind = match keyword.as_str() {
                "input" => TypeKind::Input,
                "interface" => TypeKind::Interface,
                "enum" => TypeKind::Enum,
                _ => TypeKind::Struct,
            };
            let start = whole.start() + (whole.as_str().len() - whole.as_str().trim_start().len());
            let mut def = definition(name.as_str(), kind, path, content, start);

            // Directive arguments are string-masked; read the header from the source.
            let header = caps.get(4).map(|m| &content[m.range()]).unwrap_or("");
            def.implements = implemented_interfaces(header);
            def.decorators = directives(header);

            let body = &masked[open + 1..close];
            if kind == TypeKind::Enum {
                def.variants = enum_values(body);
            } else {
                def.fields = fields(body, &content[open + 1..close]);
            }
            found.push((start, def));
        }

        for caps in unions.captures_iter(&masked) {
            let (Some(whole), Some(name), Some(members)) = (caps.get(0), caps.get(1), caps.get(3))
            else {
                continue;
            };
            let start = whole.start() + (whole.as_str().len() - whole.as_str().trim_start().len());
            let mut def = definition(name.as_str(), TypeKind::Union, path, content, start);
            def.decorators = directives(caps.get(2).map(|m| &content[m.range()]).unwrap_or(""));
            def.variants = members
                .as_str()
                .split('|')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(|m| {
                    VariantDefinition::new(m).with_fields(vec![FieldDefinition::new("0", decompose(m))])
                })
                .collect();
            found.push((start, def));
        }

        // Report in source order.
        found.sort_by_key(|(start, _)| *start);
        for (_, def) in found {
            result.add_type(def);
        }

        Ok(result)
    }

    fn language(&self) -> Language {
        Language::GraphQL
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["graphql", "gql"]
    }

    fn capability(&self) -> ParserCapability {
        ParserCapability::Basic
    }
}

fn definition(name: &str, kind: TypeKind, path: &str, content: &str, start: usize) -> TypeDefinition {
    let mut def = TypeDefinition::new(
        name,
        kind,
        path,
        text::line_at(content, start),
        Language::GraphQL,
    );
    def.doc = description_before(content, start)
        .or_else(|| text::preceding_line_comments(content, start, "#"));
    def
}

/// `implements A & B` (the legacy comma form is accepted too).
fn implemented_interfaces(header: &str) -> Vec<TypeRef> {
    let Some(idx) = header.find("implements") else {
        return Vec::new();
    };
    let list = &header[idx + "implements".len()..];
    let list = list.split('@').next().unwrap_or(list);
    list.split(|c| c == '&' || c == ',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(decompose)
        .collect()
}

fn directives(text: &str) -> Vec<String> {
    let Some(re) = DIRECTIVE.as_ref() else {
        return Vec::new();
    };
    re.find_iter(text)
        .map(|m| m.as_str().trim_start_matches('@').to_string())
        .collect()
}

fn enum_values(body: &str) -> Vec<VariantDefinition> {
    let Some(re) = DIRECTIVE.as_ref() else {
        return Vec::new();
    };
    let stripped = re.replace_all(body, " ");
    stripped
        .split_whitespace()
        .filter(|token| token.chars().all(|c| c.is_alphanumeric() || c == '_'))
        .map(VariantDefinition::new)
        .collect()
}

/// Fields of an object, input or interface body. `masked` locates
/// statements; `original` supplies field descriptions.
fn fields(masked: &str, original: &str) -> Vec<FieldDefinition> {
    let Some(re) = FIELD.as_ref() else {
        return Vec::new();
    };
    let flat = strip_arguments(masked);

    let mut out = Vec::new();
    let mut offset = 0;
    for line in flat.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let Some(caps) = re.captures(line.trim_end()) else {
            continue;
        };
        let (Some(name), Some(ty)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let ty = ty.as_str().trim();
        let required = ty.ends_with('!');
        let bare: String = ty.chars().filter(|c| *c != '!' && !c.is_whitespace()).collect();

        out.push(
            FieldDefinition::new(name.as_str(), decompose(&bare))
                .or_optional(!required)
                .with_decorators(directives(caps.get(3).map(|m| m.as_str()).unwrap_or("")))
                .with_doc(description_before(original, line_start + name.start())),
        );
    }
    out
}

/// Replace `( ... )` argument lists with spaces, keeping offsets.
fn strip_arguments(text: &str) -> String {
    let mut depth = 0usize;
    text.chars()
        .map(|c| match c {
            '(' => {
                depth += 1;
                ' '
            }
            ')' => {
                depth = depth.saturating_sub(1);
                ' '
            }
            '\n' => '\n',
            _ if depth > 0 && c.is_ascii() => ' ',
            _ => c,
        })
        .collect()
}

/// A `"..."` or `"""..."""` description ending right before `offset`.
fn description_before(content: &str, offset: usize) -> Option<String> {
    let before = content[..offset.min(content.len())].trim_end();
    let body = if let Some(rest) = before.strip_suffix("\"\"\"") {
        let start = rest.rfind("\"\"\"")?;
        &rest[start + 3..]
    } else if let Some(rest) = before.strip_suffix('"') {
        let start = rest.rfind('"')?;
        let line_start = rest.rfind('\n').map(|i| i + 1).unwrap_or(0);
        if start < line_start {
            return None;
        }
        &rest[start + 1..]
    } else {
        return None;
    };
    let doc = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    (!doc.is_empty()).then_some(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> Vec<TypeDefinition> {
        GraphQLParser::new()
            .parse_file("schema/billing.graphql", code, false)
            .unwrap()
            .into_types()
    }

    const SCHEMA: &str = r#"
"""
An invoice.
"""
type Invoice implements Node & Billable @key(fields: "id") {
  id: ID!
  "Grand total"
  total: Float
  items(first: Int = 10): [LineItem!]! @deprecated(reason: "use lines")
  # internal notes
  notes: String
}

input InvoiceInput {
  total: Float!
}

enum Status {
  PAID
  VOID @deprecated
}

union SearchResult = Invoice | Customer

extend type Query {
  invoice(id: ID!): Invoice
}
"#;

    #[test]
    fn test_object_type() {
        let types = parse(SCHEMA);
        let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Invoice", "InvoiceInput", "Status", "SearchResult"]);

        let invoice = &types[0];
        assert_eq!(invoice.kind, TypeKind::Struct);
        assert_eq!(invoice.line, 5);
        assert_eq!(invoice.doc.as_deref(), Some("An invoice."));
        assert_eq!(invoice.implements.len(), 2);
        assert_eq!(invoice.implements[1].name, "Billable");
        assert_eq!(invoice.decorators, vec!["key(fields: \"id\")".to_string()]);

        let fields: Vec<_> = invoice.field_names().collect();
        assert_eq!(fields, vec!["id", "total", "items", "notes"]);
        assert!(!invoice.fields[0].optional);
        assert!(invoice.fields[1].optional);
        assert_eq!(invoice.fields[1].doc.as_deref(), Some("Grand total"));

        let items = &invoice.fields[2];
        assert!(!items.optional);
        assert!(items.type_ref.is_collection);
        assert_eq!(items.type_ref.name, "LineItem");
        assert_eq!(items.decorators.len(), 1);
    }

    #[test]
    fn test_input_enum_union() {
        let types = parse(SCHEMA);
        assert_eq!(types[1].kind, TypeKind::Input);
        assert!(!types[1].fields[0].optional);

        let status = &types[2];
        assert_eq!(status.kind, TypeKind::Enum);
        let values: Vec<_> = status.variants.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(values, vec!["PAID", "VOID"]);

        let union = &types[3];
        assert_eq!(union.kind, TypeKind::Union);
        assert_eq!(union.variants.len(), 2);
        assert_eq!(union.variants[1].fields[0].type_ref.name, "Customer");
    }
}
