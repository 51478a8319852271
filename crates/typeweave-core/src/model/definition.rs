//! Declaration-level entities: types, fields, enum variants.

use serde::{Deserialize, Serialize};

use super::type_ref::TypeRef;

/// Decorator attached to definitions produced by a schema parser rather than
/// read from a language declaration.
pub const SCHEMA_DECORATOR_PREFIX: &str = "schema:";

/// Source language of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    TypeScript,
    JavaScript,
    Python,
    Go,
    Java,
    CSharp,
    Protobuf,
    GraphQL,
}

impl Language {
    /// Every supported language, in registry order.
    pub const ALL: [Language; 9] = [
        Self::Rust,
        Self::TypeScript,
        Self::JavaScript,
        Self::Python,
        Self::Go,
        Self::Java,
        Self::CSharp,
        Self::Protobuf,
        Self::GraphQL,
    ];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "rs" => Some(Self::Rust),
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "py" | "pyi" => Some(Self::Python),
            "go" => Some(Self::Go),
            "java" => Some(Self::Java),
            "cs" => Some(Self::CSharp),
            "proto" => Some(Self::Protobuf),
            "graphql" | "gql" => Some(Self::GraphQL),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Go => "go",
            Self::Java => "java",
            Self::CSharp => "csharp",
            Self::Protobuf => "protobuf",
            Self::GraphQL => "graphql",
        }
    }

    /// Whether files of this language belong to the JavaScript family
    /// (TypeScript or JavaScript).
    pub fn is_ecmascript(&self) -> bool {
        matches!(self, Self::TypeScript | Self::JavaScript)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of declaration a [`TypeDefinition`] was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Struct,
    Class,
    Interface,
    Enum,
    TypeAlias,
    Trait,
    Protocol,
    Union,
    Message,
    Service,
    Input,
    Model,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::TypeAlias => "type_alias",
            Self::Trait => "trait",
            Self::Protocol => "protocol",
            Self::Union => "union",
            Self::Message => "message",
            Self::Service => "service",
            Self::Input => "input",
            Self::Model => "model",
        }
    }
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility in the shared vocabulary all languages are mapped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Internal,
    Protected,
}

impl Visibility {
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Internal => "internal",
            Self::Protected => "protected",
        }
    }
}

/// A named member of a struct-like type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name; positional members are named by index (`"0"`, `"1"`, ...).
    pub name: String,

    pub type_ref: TypeRef,

    /// Whether the field may be absent or null.
    pub optional: bool,

    pub visibility: Visibility,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl FieldDefinition {
    /// Create a public field; `optional` is taken from the type reference.
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            optional: type_ref.optional,
            type_ref,
            visibility: Visibility::Public,
            decorators: Vec::new(),
            doc: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark the field optional in addition to whatever the type said.
    pub fn or_optional(mut self, optional: bool) -> Self {
        self.optional |= optional;
        self
    }

    pub fn with_decorators(mut self, decorators: Vec<String>) -> Self {
        self.decorators = decorators;
        self
    }

    pub fn with_doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }
}

/// One case of an enum or union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDefinition {
    pub name: String,

    /// Payload, named or positional.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDefinition>,

    /// Literal value (discriminant, string literal, proto tag).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl VariantDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: Option<String>) -> Self {
        self.value = value;
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldDefinition>) -> Self {
        self.fields = fields;
        self
    }
}

/// One extracted declaration.
///
/// Created once per declaration during an extraction pass and never mutated
/// afterwards; a new pass over the same repository replaces the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    pub kind: TypeKind,

    /// Repository-relative path of the declaring file.
    pub file: String,

    /// 1-based line of the declaration.
    pub line: u32,

    pub language: Language,
    pub visibility: Visibility,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDefinition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<VariantDefinition>,

    /// Generic parameter names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<TypeRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<TypeRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl TypeDefinition {
    /// Create an empty public definition.
    pub fn new(
        name: impl Into<String>,
        kind: TypeKind,
        file: impl Into<String>,
        line: u32,
        language: Language,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            file: file.into(),
            line,
            language,
            visibility: Visibility::Public,
            fields: Vec::new(),
            variants: Vec::new(),
            generics: Vec::new(),
            extends: Vec::new(),
            implements: Vec::new(),
            decorators: Vec::new(),
            doc: None,
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Whether a schema parser produced this definition.
    pub fn is_schema_derived(&self) -> bool {
        self.decorators
            .iter()
            .any(|d| d.starts_with(SCHEMA_DECORATOR_PREFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("RS"), Some(Language::Rust));
        assert_eq!(Language::from_extension("tsx"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("gql"), Some(Language::GraphQL));
        assert_eq!(Language::from_extension("xyz"), None);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&TypeKind::TypeAlias).unwrap();
        assert_eq!(json, "\"type_alias\"");
    }

    #[test]
    fn test_schema_marker() {
        let mut def = TypeDefinition::new("User", TypeKind::Model, "models.py", 3, Language::Python);
        assert!(!def.is_schema_derived());
        def.decorators.push("schema:orm".to_string());
        assert!(def.is_schema_derived());
    }
}
