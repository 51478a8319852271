//! Parser registry mapping languages and file extensions to parsers.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use super::csharp::CSharpParser;
use super::go::GoParser;
use super::graphql::GraphQLParser;
use super::java::JavaParser;
use super::protobuf::ProtobufParser;
use super::python::PythonParser;
use super::result::ParseResult;
use super::rust::RustParser;
use super::supplementary::SchemaParser;
use super::traits::{Parser, ParserCapability};
use super::typescript::TypeScriptParser;
use crate::error::ParseError;
use crate::model::{Language, TypeDefinition};

/// The closed set of primary parsers, one variant per language.
pub enum LanguageParser {
    Rust(RustParser),
    TypeScript(TypeScriptParser),
    JavaScript(TypeScriptParser),
    Python(PythonParser),
    Go(GoParser),
    Java(JavaParser),
    CSharp(CSharpParser),
    Protobuf(ProtobufParser),
    GraphQL(GraphQLParser),
}

impl LanguageParser {
    /// The primary parser for a language.
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Rust => Self::Rust(RustParser::new()),
            Language::TypeScript => Self::TypeScript(TypeScriptParser::typescript()),
            Language::JavaScript => Self::JavaScript(TypeScriptParser::javascript()),
            Language::Python => Self::Python(PythonParser::new()),
            Language::Go => Self::Go(GoParser::new()),
            Language::Java => Self::Java(JavaParser::new()),
            Language::CSharp => Self::CSharp(CSharpParser::new()),
            Language::Protobuf => Self::Protobuf(ProtobufParser::new()),
            Language::GraphQL => Self::GraphQL(GraphQLParser::new()),
        }
    }

    fn inner(&self) -> &dyn Parser {
        match self {
            Self::Rust(p) => p,
            Self::TypeScript(p) | Self::JavaScript(p) => p,
            Self::Python(p) => p,
            Self::Go(p) => p,
            Self::Java(p) => p,
            Self::CSharp(p) => p,
            Self::Protobuf(p) => p,
            Self::GraphQL(p) => p,
        }
    }
}

impl Parser for LanguageParser {
    fn parse_file(
        &self,
        path: &str,
        content: &str,
        include_private: bool,
    ) -> Result<ParseResult, ParseError> {
        self.inner().parse_file(path, content, include_private)
    }

    fn language(&self) -> Language {
        self.inner().language()
    }

    fn supported_extensions(&self) -> &[&'static str] {
        self.inner().supported_extensions()
    }

    fn capability(&self) -> ParserCapability {
        self.inner().capability()
    }
}

impl std::fmt::Debug for LanguageParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LanguageParser({})", self.language())
    }
}

/// Registry of language parsers.
///
/// Built once, explicitly, with every primary parser and every schema
/// parser. Lookups are pure; nothing registers itself implicitly.
pub struct ParserRegistry {
    /// Lower-cased extension to parser.
    by_extension: HashMap<String, Arc<LanguageParser>>,

    by_language: HashMap<Language, Arc<LanguageParser>>,

    schema_parsers: Vec<SchemaParser>,

    /// Whether schema parsers run alongside the primary parser.
    supplementary: bool,
}

impl ParserRegistry {
    /// Create a registry with all built-in parsers.
    pub fn new() -> Self {
        let mut registry = Self {
            by_extension: HashMap::new(),
            by_language: HashMap::new(),
            schema_parsers: SchemaParser::all(),
            supplementary: true,
        };

        for language in Language::ALL {
            registry.register(LanguageParser::for_language(language));
        }

        registry
    }

    /// Enable or disable the schema parsers.
    pub fn with_supplementary(mut self, enabled: bool) -> Self {
        self.supplementary = enabled;
        self
    }

    /// Register a parser for its language and supported extensions.
    pub fn register(&mut self, parser: LanguageParser) {
        let parser = Arc::new(parser);
        for ext in parser.supported_extensions() {
            self.by_extension
                .insert(ext.to_lowercase(), Arc::clone(&parser));
        }
        self.by_language.insert(parser.language(), parser);
    }

    /// Get a parser for the given file extension.
    pub fn parser_for_extension(&self, extension: &str) -> Option<Arc<LanguageParser>> {
        self.by_extension.get(&extension.to_lowercase()).cloned()
    }

    /// Get a parser for the given file path.
    pub fn parser_for_path(&self, path: &str) -> Option<Arc<LanguageParser>> {
        extension_of(path).and_then(|ext| self.parser_for_extension(ext))
    }

    pub fn parser_for_language(&self, language: Language) -> Option<Arc<LanguageParser>> {
        self.by_language.get(&language).cloned()
    }

    /// Language of a file, by extension.
    pub fn language_for_path(&self, path: &str) -> Option<Language> {
        self.parser_for_path(path).map(|p| p.language())
    }

    /// Check if any parser can handle the given extension.
    pub fn can_parse(&self, extension: &str) -> bool {
        self.by_extension.contains_key(&extension.to_lowercase())
    }

    /// All supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.by_extension.keys().map(|s| s.as_str()).collect();
        extensions.sort_unstable();
        extensions
    }

    /// Registered languages with their extensions, in [`Language::ALL`] order.
    pub fn list_parsers(&self) -> Vec<(Language, &[&'static str])> {
        Language::ALL
            .iter()
            .filter_map(|language| {
                self.by_language
                    .get(language)
                    .map(|p| (*language, p.supported_extensions()))
            })
            .collect()
    }

    /// Parse one file: the primary parser's definitions followed by every
    /// applicable schema parser's.
    ///
    /// Failures are logged and yield an empty list; see [`Self::try_parse`].
    pub fn parse(
        &self,
        language: Language,
        content: &str,
        path: &str,
        include_private: bool,
    ) -> Vec<TypeDefinition> {
        match self.try_parse(language, content, path, include_private) {
            Ok(types) => types,
            Err(ParseError::Unsupported(language)) => {
                debug!("No parser registered for {} ({})", language, path);
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to parse {}: {}", path, e);
                Vec::new()
            }
        }
    }

    /// Like [`Self::parse`], but returns the primary parser's error.
    ///
    /// A failing schema parser only loses its own contribution.
    pub fn try_parse(
        &self,
        language: Language,
        content: &str,
        path: &str,
        include_private: bool,
    ) -> Result<Vec<TypeDefinition>, ParseError> {
        let parser = self
            .parser_for_language(language)
            .ok_or(ParseError::Unsupported(language))?;

        let result = parser.parse_file(path, content, include_private)?;
        for warning in &result.warnings {
            debug!("{}: {}", path, warning);
        }
        debug!("Parsed {} ({}): {}", path, language, result.stats());
        let mut types = result.into_types();

        if self.supplementary {
            for schema in self.schema_parsers.iter().filter(|s| s.applies_to(language)) {
                match schema.parse_file(path, language, content, include_private) {
                    Ok(extra) => types.extend(extra.into_types()),
                    Err(e) => warn!("{} schema parser failed on {}: {}", schema.name(), path, e),
                }
            }
        }

        Ok(types)
    }

    /// Parse a file whose language is inferred from its extension.
    pub fn parse_path(&self, path: &str, content: &str, include_private: bool) -> Vec<TypeDefinition> {
        match self.language_for_path(path) {
            Some(language) => self.parse(language, content, path, include_private),
            None => {
                debug!("Skipping {}: unsupported extension", path);
                Vec::new()
            }
        }
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn extension_of(path: &str) -> Option<&str> {
    Path::new(path).extension().and_then(|e| e.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_all_parsers() {
        let registry = ParserRegistry::new();

        for ext in [
            "rs", "ts", "tsx", "js", "jsx", "mjs", "cjs", "py", "pyi", "go", "java", "cs",
            "proto", "graphql", "gql",
        ] {
            assert!(registry.can_parse(ext), "missing parser for .{}", ext);
        }
        assert_eq!(registry.list_parsers().len(), Language::ALL.len());
    }

    #[test]
    fn test_parser_for_path() {
        let registry = ParserRegistry::new();
        assert_eq!(registry.language_for_path("src/lib.rs"), Some(Language::Rust));
        assert_eq!(registry.language_for_path("src/app.tsx"), Some(Language::TypeScript));
        assert_eq!(registry.language_for_path("src/app.mjs"), Some(Language::JavaScript));
        assert_eq!(registry.language_for_path("api/billing.proto"), Some(Language::Protobuf));
        assert!(registry.parser_for_path("Main.java").is_some());
        assert!(registry.parser_for_path("unknown.xyz").is_none());
        assert!(registry.parser_for_path("Makefile").is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let registry = ParserRegistry::new();
        assert!(registry.can_parse("RS"));
        assert!(registry.can_parse("Py"));
        assert_eq!(registry.language_for_path("Schema.GQL"), Some(Language::GraphQL));
    }

    #[test]
    fn test_supported_extensions_sorted() {
        let registry = ParserRegistry::new();
        let extensions = registry.supported_extensions();
        let mut sorted = extensions.clone();
        sorted.sort_unstable();
        assert_eq!(extensions, sorted);
        assert!(extensions.contains(&"gql"));
    }

    #[test]
    fn test_parse_swallows_syntax_errors() {
        let registry = ParserRegistry::new();
        let types = registry.parse(Language::Rust, "pub struct {", "src/bad.rs", false);
        assert!(types.is_empty());
        assert!(registry
            .try_parse(Language::Rust, "pub struct {", "src/bad.rs", false)
            .is_err());
    }

    #[test]
    fn test_primary_then_schema_results() {
        let code = r#"
export interface Invoice { id: string }
export const InvoiceSchema = z.object({ id: z.string() });
"#;
        let registry = ParserRegistry::new();
        let types = registry.parse(Language::TypeScript, code, "src/invoice.ts", false);
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].name, "Invoice");
        assert!(!types[0].is_schema_derived());
        assert_eq!(types[1].name, "Invoice");
        assert!(types[1].is_schema_derived());

        let plain = ParserRegistry::new().with_supplementary(false);
        assert_eq!(plain.parse(Language::TypeScript, code, "src/invoice.ts", false).len(), 1);
    }
}
