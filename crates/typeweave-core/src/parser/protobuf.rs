//! Protocol Buffers scanner.
//!
//! A textual scanner over `.proto` files: messages (nested ones included),
//! enums and services. `oneof` members and `optional` fields are optional;
//! `repeated` fields are collections. Each rpc becomes a field typed by its
//! response message, tagged with its request type.

use once_cell::sync::Lazy;
use regex::Regex;

use super::result::ParseResult;
use super::text::{self, CommentStyle};
use super::traits::{Parser, ParserCapability};
use crate::decompose::decompose;
use crate::error::ParseError;
use crate::model::{FieldDefinition, Language, TypeDefinition, TypeKind, VariantDefinition};

const STYLE: CommentStyle = CommentStyle {
    line: "//",
    block: true,
    triple_quoted: false,
};

static DECLARATION: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\b(message|enum|service|oneof)\s+(\w+)\s*\{").ok());

static FIELD: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:(optional|repeated|required)\s+)?(map\s*<[^>]*>|\.?[\w.]+)\s+(\w+)\s*=\s*(\d+)",
    )
    .ok()
});

static ENUM_VALUE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\s*(\w+)\s*=\s*(-?(?:0x[0-9A-Fa-f]+|\d+))").ok());

static RPC: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"\brpc\s+(\w+)\s*\(\s*(?:stream\s+)?([\w.]+)\s*\)\s*returns\s*\(\s*(stream\s+)?([\w.]+)\s*\)",
    )
    .ok()
});

/// Protocol Buffers parser.
#[derive(Debug, Default)]
pub struct ProtobufParser;

impl ProtobufParser {
    pub fn new() -> Self {
        Self
    }
}

/// One brace-delimited declaration found in a scope.
struct Block {
    keyword: String,
    name: String,
    start: usize,
    open: usize,
    close: usize,
}

/// Declarations directly inside `masked[from..to]`, skipping nested ones.
fn blocks(masked: &str, from: usize, to: usize) -> Vec<Block> {
    let Some(re) = DECLARATION.as_ref() else {
        return Vec::new();
    };

    let mut found = Vec::new();
    let mut cursor = from;
    while cursor < to {
        let Some(caps) = re.captures_at(&masked[..to], cursor) else {
            break;
        };
        let (Some(whole), Some(keyword), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            break;
        };
        let open = whole.end() - 1;
        let Some(close) = text::block_end(masked, open).filter(|c| *c < to) else {
            break;
        };
        found.push(Block {
            keyword: keyword.as_str().to_string(),
            name: name.as_str().to_string(),
            start: whole.start(),
            open,
            close,
        });
        cursor = close + 1;
    }
    found
}

struct Scanner<'a> {
    content: &'a str,
    masked: String,
    path: &'a str,
    result: ParseResult,
}

impl<'a> Scanner<'a> {
    fn scan_scope(&mut self, from: usize, to: usize) {
        for block in blocks(&self.masked, from, to) {
            match block.keyword.as_str() {
                "message" => self.scan_message(&block),
                "enum" => self.scan_enum(&block),
                "service" => self.scan_service(&block),
                _ => {}
            }
        }
    }

    fn definition(&self, block: &Block, kind: TypeKind) -> TypeDefinition {
        let mut def = TypeDefinition::new(
            block.name.clone(),
            kind,
            self.path,
            text::line_at(self.content, block.start),
            Language::Protobuf,
        );
        def.doc = text::preceding_line_comments(self.content, block.start, "//");
        def
    }

    fn scan_message(&mut self, block: &Block) {
        let mut def = self.definition(block, TypeKind::Message);
        let inner = blocks(&self.masked, block.open + 1, block.close);

        // Fields declared inside `oneof` groups are mutually exclusive.
        for group in inner.iter().filter(|b| b.keyword == "oneof") {
            let body = &self.masked[group.open + 1..group.close];
            def.fields.extend(
                body.split(';')
                    .filter_map(parse_field)
                    .map(|f| f.or_optional(true)),
            );
        }

        let nested: Vec<(usize, usize)> = inner.iter().map(|b| (b.start, b.close)).collect();
        let own = text::blank_ranges(&self.masked[..=block.close], &nested);
        let body = &own[block.open + 1..block.close];
        let mut fields: Vec<FieldDefinition> = body.split(';').filter_map(parse_field).collect();
        fields.append(&mut def.fields);
        def.fields = fields;

        self.result.add_type(def);
        self.scan_scope(block.open + 1, block.close);
    }

    fn scan_enum(&mut self, block: &Block) {
        let mut def = self.definition(block, TypeKind::Enum);
        let Some(re) = ENUM_VALUE.as_ref() else {
            return;
        };
        def.variants = self.masked[block.open + 1..block.close]
            .split(';')
            .filter(|stmt| !stmt.trim_start().starts_with("option"))
            .filter_map(|stmt| re.captures(stmt))
            .filter_map(|caps| {
                let name = caps.get(1)?.as_str();
                let value = caps.get(2)?.as_str();
                Some(VariantDefinition::new(name).with_value(Some(value.to_string())))
            })
            .collect();
        self.result.add_type(def);
    }

    fn scan_service(&mut self, block: &Block) {
        let mut def = self.definition(block, TypeKind::Service);
        let Some(re) = RPC.as_ref() else {
            return;
        };
        let body = &self.masked[block.open + 1..block.close];
        def.fields = re
            .captures_iter(body)
            .filter_map(|caps| {
                let method = caps.get(1)?.as_str();
                let request = caps.get(2)?.as_str();
                let response = caps.get(4)?.as_str();
                let mut decorators = vec![format!("rpc({})", request)];
                if caps.get(3).is_some() {
                    decorators.push("stream".to_string());
                }
                Some(FieldDefinition::new(method, decompose(response)).with_decorators(decorators))
            })
            .collect();
        self.result.add_type(def);
    }
}

/// `[optional|repeated] type name = N [options]`.
fn parse_field(statement: &str) -> Option<FieldDefinition> {
    let caps = FIELD.as_ref()?.captures(statement)?;
    let label = caps.get(1).map(|m| m.as_str());
    let ty = caps.get(2)?.as_str().trim_start_matches('.');
    let name = caps.get(3)?.as_str();

    let type_text = match label {
        Some("repeated") => format!("repeated {}", ty),
        _ => ty.to_string(),
    };
    Some(FieldDefinition::new(name, decompose(&type_text)).or_optional(label == Some("optional")))
}

impl Parser for ProtobufParser {
    fn parse_file(
        &self,
        path: &str,
        content: &str,
        include_private: bool,
    ) -> Result<ParseResult, ParseError> {
        if DECLARATION.is_none() || FIELD.is_none() {
            return Err(ParseError::Grammar {
                language: Language::Protobuf,
                message: "scanner patterns failed to compile".to_string(),
            });
        }

        let masked = text::mask(content, STYLE);
        let end = masked.len();
        let mut scanner = Scanner {
            content,
            masked,
            path,
            result: ParseResult::new(path, include_private),
        };
        scanner.scan_scope(0, end);

        Ok(scanner.result)
    }

    fn language(&self) -> Language {
        Language::Protobuf
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["proto"]
    }

    fn capability(&self) -> ParserCapability {
        ParserCapability::Basic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> Vec<TypeDefinition> {
        ProtobufParser::new()
            .parse_file("proto/billing.proto", code, false)
            .unwrap()
            .into_types()
    }

    const BILLING: &str = r#"
syntax = "proto3";
package billing.v1;

// An invoice.
message Invoice {
  string id = 1;
  optional double total = 2;
  repeated LineItem items = 3 [packed = true];
  map<string, string> labels = 4;
  oneof payer {
    Customer customer = 5;
    string account_id = 6;
  }

  message LineItem {
    string sku = 1;
  }
}

enum Status {
  STATUS_UNSPECIFIED = 0;
  STATUS_PAID = 1;
}

service Billing {
  rpc GetInvoice(GetInvoiceRequest) returns (Invoice);
  rpc Watch(WatchRequest) returns (stream Invoice) {}
}
"#;

    #[test]
    fn test_message_fields() {
        let types = parse(BILLING);
        let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Invoice", "LineItem", "Status", "Billing"]);

        let invoice = &types[0];
        assert_eq!(invoice.kind, TypeKind::Message);
        assert_eq!(invoice.line, 6);
        assert_eq!(invoice.doc.as_deref(), Some("An invoice."));

        let fields: Vec<_> = invoice.field_names().collect();
        assert_eq!(fields, vec!["id", "total", "items", "labels", "customer", "account_id"]);
        assert!(!invoice.fields[0].optional);
        assert!(invoice.fields[1].optional);
        assert!(invoice.fields[2].type_ref.is_collection);
        assert_eq!(invoice.fields[2].type_ref.name, "LineItem");
        assert_eq!(invoice.fields[3].type_ref.generics.len(), 2);
        assert!(invoice.fields[4].optional);
    }

    #[test]
    fn test_enum_and_service() {
        let types = parse(BILLING);
        let status = &types[2];
        assert_eq!(status.kind, TypeKind::Enum);
        assert_eq!(status.variants[1].name, "STATUS_PAID");
        assert_eq!(status.variants[1].value.as_deref(), Some("1"));

        let billing = &types[3];
        assert_eq!(billing.kind, TypeKind::Service);
        assert_eq!(billing.fields[0].name, "GetInvoice");
        assert_eq!(billing.fields[0].type_ref.name, "Invoice");
        assert_eq!(billing.fields[0].decorators, vec!["rpc(GetInvoiceRequest)".to_string()]);
        assert!(billing.fields[1].decorators.contains(&"stream".to_string()));
    }

    #[test]
    fn test_comments_and_strings_ignored() {
        let code = "/* message Ghost { } */\nmessage Real {\n  string note = 1 [default = \"}\"];\n}\n";
        let types = parse(code);
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name, "Real");
        assert_eq!(types[0].fields.len(), 1);
    }
}
