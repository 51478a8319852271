//! Parse result containing extracted type definitions.

use crate::model::{TypeDefinition, TypeKind};

/// Result of parsing a source file.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// File path that was parsed.
    pub file_path: String,

    /// Extracted definitions, in source order.
    pub types: Vec<TypeDefinition>,

    /// Parse warnings (non-fatal issues).
    pub warnings: Vec<String>,

    include_private: bool,
}

impl ParseResult {
    /// Create a new parse result for the given file.
    pub fn new(file_path: impl Into<String>, include_private: bool) -> Self {
        Self {
            file_path: file_path.into(),
            include_private,
            ..Default::default()
        }
    }

    /// Add a definition, dropping it when it is not public and private
    /// declarations were not requested.
    pub fn add_type(&mut self, def: TypeDefinition) {
        if self.include_private || def.visibility.is_public() {
            self.types.push(def);
        }
    }

    /// Mutable access to an already-added definition by name.
    pub fn type_mut(&mut self, name: &str) -> Option<&mut TypeDefinition> {
        self.types.iter_mut().find(|t| t.name == name)
    }

    /// Add a parse warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Get statistics about the parse result.
    pub fn stats(&self) -> ParseStats {
        let mut stats = ParseStats::default();

        for def in &self.types {
            match def.kind {
                TypeKind::Struct | TypeKind::Class | TypeKind::Model | TypeKind::Message
                | TypeKind::Input => stats.structs += 1,
                TypeKind::Interface | TypeKind::Trait | TypeKind::Protocol
                | TypeKind::Service => stats.interfaces += 1,
                TypeKind::Enum | TypeKind::Union => stats.enums += 1,
                TypeKind::TypeAlias => stats.aliases += 1,
            }
            stats.fields += def.fields.len();
        }

        stats.warnings = self.warnings.len();
        stats
    }

    pub fn into_types(self) -> Vec<TypeDefinition> {
        self.types
    }
}

/// Statistics about a parse result.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParseStats {
    /// Struct-like declarations (structs, classes, models, messages, inputs).
    pub structs: usize,
    /// Contract declarations (interfaces, traits, protocols, services).
    pub interfaces: usize,
    /// Enums and unions.
    pub enums: usize,
    pub aliases: usize,
    pub fields: usize,
    pub warnings: usize,
}

impl std::fmt::Display for ParseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} structs, {} interfaces, {} enums, {} aliases, {} fields",
            self.structs, self.interfaces, self.enums, self.aliases, self.fields
        )?;
        if self.warnings > 0 {
            write!(f, ", {} warnings", self.warnings)?;
        }
        Ok(())
    }
}
