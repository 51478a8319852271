//! Error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::model::Language;

/// Errors raised while parsing a single file.
///
/// These never escape an extraction pass: the registry logs them and treats
/// the file as contributing no types.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The grammar could not be loaded into a parser.
    #[error("Failed to load {language} grammar: {message}")]
    Grammar { language: Language, message: String },

    /// The file is not syntactically valid for its language.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// No primary parser handles this language.
    #[error("No parser for language: {0}")]
    Unsupported(Language),
}

impl From<syn::Error> for ParseError {
    fn from(err: syn::Error) -> Self {
        let start = err.span().start();
        ParseError::Syntax(format!("{} (line {})", err, start.line))
    }
}

/// Crate-level errors.
#[derive(Debug, Error)]
pub enum TypeweaveError {
    /// The repository source could not list its files.
    #[error("Failed to list repository files: {0}")]
    Listing(String),

    /// A file could not be read from the repository source.
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience alias for crate results.
pub type Result<T> = std::result::Result<T, TypeweaveError>;
