//! Language parsers that turn one file's text into [`TypeDefinition`]s.
//!
//! ## Components
//!
//! - [`Parser`] trait - common interface for all language parsers
//! - [`LanguageParser`] - the closed set of primary parsers
//! - [`ParserRegistry`] - maps languages and file extensions to parsers
//! - [`SchemaParser`] - zod and ORM schema parsers run alongside the primary one
//! - [`ParseResult`] - definitions and warnings for one file
//!
//! ## Supported Languages
//!
//! - Rust (syn-based, full AST extraction)
//! - TypeScript/JavaScript, Python, Go, Java, C# (tree-sitter)
//! - Protocol Buffers, GraphQL (textual scanners)
//!
//! [`TypeDefinition`]: crate::model::TypeDefinition

mod csharp;
mod go;
mod graphql;
mod java;
mod protobuf;
mod python;
mod registry;
mod result;
mod rust;
mod supplementary;
mod text;
mod traits;
mod treesitter;
mod typescript;

pub use csharp::CSharpParser;
pub use go::GoParser;
pub use graphql::GraphQLParser;
pub use java::JavaParser;
pub use protobuf::ProtobufParser;
pub use python::PythonParser;
pub use registry::{LanguageParser, ParserRegistry};
pub use result::{ParseResult, ParseStats};
pub use rust::RustParser;
pub use supplementary::{
    OrmModelParser, SchemaParser, ZodSchemaParser, ORM_DECORATOR, ZOD_DECORATOR,
};
pub use traits::{Parser, ParserCapability};
pub use typescript::TypeScriptParser;
