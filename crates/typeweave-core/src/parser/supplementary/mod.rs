//! Schema parsers that run alongside the primary language parser.
//!
//! They are never selected by extension. The registry invokes every schema
//! parser whose [`SchemaParser::applies_to`] accepts the file's language and
//! appends what it finds to the primary parser's output. Every definition
//! they emit carries a `schema:*` decorator.

mod orm;
mod zod;

pub use orm::OrmModelParser;
pub use zod::ZodSchemaParser;

use crate::error::ParseError;
use crate::model::Language;

use super::result::ParseResult;

/// Marker decorator on definitions built from zod schemas.
pub const ZOD_DECORATOR: &str = "schema:zod";

/// Marker decorator on definitions built from ORM models.
pub const ORM_DECORATOR: &str = "schema:orm";

/// The closed set of supplementary parsers.
pub enum SchemaParser {
    Zod(ZodSchemaParser),
    Orm(OrmModelParser),
}

impl SchemaParser {
    /// One instance of every schema parser.
    pub fn all() -> Vec<SchemaParser> {
        vec![
            Self::Zod(ZodSchemaParser::new()),
            Self::Orm(OrmModelParser::new()),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Zod(_) => "zod",
            Self::Orm(_) => "orm",
        }
    }

    pub fn applies_to(&self, language: Language) -> bool {
        match self {
            Self::Zod(p) => p.applies_to(language),
            Self::Orm(p) => p.applies_to(language),
        }
    }

    pub fn parse_file(
        &self,
        path: &str,
        language: Language,
        content: &str,
        include_private: bool,
    ) -> Result<ParseResult, ParseError> {
        match self {
            Self::Zod(p) => p.parse_file(path, language, content, include_private),
            Self::Orm(p) => p.parse_file(path, content, include_private),
        }
    }
}

impl std::fmt::Debug for SchemaParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SchemaParser({})", self.name())
    }
}
