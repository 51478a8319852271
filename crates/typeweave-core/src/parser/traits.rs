//! Core parser trait for language-agnostic type extraction.

use super::result::ParseResult;
use crate::error::ParseError;
use crate::model::Language;

/// Language parser contract.
///
/// Each implementation is responsible for:
///
/// 1. **Declaration discovery**: structs, classes, interfaces, enums, traits, aliases
/// 2. **Visibility**: mapping the language's convention onto the shared vocabulary
/// 3. **Structure**: fields and variants, with types run through [`crate::decompose`]
/// 4. **Heritage**: base types and implemented contracts
/// 5. **Metadata**: doc comments and decorators, best-effort
///
/// Parsing is a pure function of the file text and `include_private`; a
/// parser holds no mutable state between calls.
///
/// # Example
///
/// ```ignore
/// impl Parser for ProtobufParser {
///     fn parse_file(&self, path: &str, content: &str, include_private: bool)
///         -> Result<ParseResult, ParseError>
///     {
///         let mut result = ParseResult::new(path, include_private);
///         // scan `message` / `enum` / `service` blocks
///         Ok(result)
///     }
///
///     fn language(&self) -> Language { Language::Protobuf }
///     fn supported_extensions(&self) -> &[&'static str] { &["proto"] }
///     fn capability(&self) -> ParserCapability { ParserCapability::Basic }
/// }
/// ```
pub trait Parser: Send + Sync {
    /// Parse a source file and extract its type definitions.
    ///
    /// # Arguments
    /// * `path` - Repository-relative path, recorded on every definition
    /// * `content` - Source text
    /// * `include_private` - Keep non-public declarations
    ///
    /// # Returns
    /// * `Ok(ParseResult)` - Extracted definitions and warnings
    /// * `Err(ParseError)` - The file could not be parsed at all
    fn parse_file(
        &self,
        path: &str,
        content: &str,
        include_private: bool,
    ) -> Result<ParseResult, ParseError>;

    /// Language this parser handles.
    fn language(&self) -> Language;

    /// File extensions this parser handles.
    fn supported_extensions(&self) -> &[&'static str];

    /// Check if this parser can handle the given file extension.
    fn can_parse(&self, extension: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// Parse capability level.
    ///
    /// - `Basic`: textual scanning (declarations, fields, simple heritage)
    /// - `Structural`: AST/grammar-driven extraction
    fn capability(&self) -> ParserCapability {
        ParserCapability::Structural
    }
}

/// Level of parsing capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParserCapability {
    /// Textual scanning over the source.
    Basic,
    /// AST or grammar parse tree.
    Structural,
}

impl std::fmt::Display for ParserCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Basic => "basic",
            Self::Structural => "structural",
        };
        f.write_str(label)
    }
}
