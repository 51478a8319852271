//! Repository extraction driver.
//!
//! Runs every supported file of one repository through the parser registry
//! in parallel, then derives relationships and modules from the combined
//! definitions. File access goes through [`RepoSource`]; nothing here
//! touches the filesystem directly.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ExtractionConfig;
use crate::error::{Result, TypeweaveError};
use crate::model::{TypeDefinition, TypeModule, TypeRelationship};
use crate::parser::ParserRegistry;
use crate::relations::{build_modules, build_relationships};

/// Read access to one repository at one ref.
pub trait RepoSource: Sync {
    /// Repository-relative paths of every file.
    fn list_files(&self) -> Result<Vec<String>>;

    fn read_file(&self, path: &str) -> Result<String>;

    /// Size in bytes, when known without reading the file.
    fn file_size(&self, _path: &str) -> Option<u64> {
        None
    }
}

/// A repository held in memory as path → content.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    files: BTreeMap<String, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl<P: Into<String>, C: Into<String>> FromIterator<(P, C)> for InMemorySource {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (path, content) in iter {
            source.insert(path, content);
        }
        source
    }
}

impl RepoSource for InMemorySource {
    fn list_files(&self) -> Result<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read_file(&self, path: &str) -> Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| TypeweaveError::Read {
                path: path.to_string(),
                message: "no such file".to_string(),
            })
    }

    fn file_size(&self, path: &str) -> Option<u64> {
        self.files.get(path).map(|c| c.len() as u64)
    }
}

/// Counters for one extraction pass.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub files_listed: usize,
    pub files_parsed: usize,
    /// Unsupported extension or over the size limit.
    pub files_skipped: usize,
    /// Read or parse failures.
    pub files_failed: usize,
    pub types: usize,
}

impl std::fmt::Display for ExtractionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Files:")?;
        writeln!(f, "  Listed:  {}", self.files_listed)?;
        writeln!(f, "  Parsed:  {}", self.files_parsed)?;
        writeln!(f, "  Skipped: {}", self.files_skipped)?;
        writeln!(f, "  Failed:  {}", self.files_failed)?;
        writeln!(f, "Types: {}", self.types)
    }
}

/// Everything extracted from one repository at one ref.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoTypeSet {
    pub types: Vec<TypeDefinition>,
    pub relationships: Vec<TypeRelationship>,
    pub modules: Vec<TypeModule>,
    pub stats: ExtractionStats,
}

enum FileOutcome {
    Parsed(Vec<TypeDefinition>),
    Skipped,
    Failed,
}

/// Drives extraction of whole repositories.
pub struct Extractor {
    registry: ParserRegistry,
    config: ExtractionConfig,
}

impl Extractor {
    pub fn new(config: ExtractionConfig) -> Self {
        let registry = ParserRegistry::new().with_supplementary(config.supplementary);
        Self { registry, config }
    }

    /// Use an already-built registry; `config.supplementary` is not applied.
    pub fn with_registry(registry: ParserRegistry, config: ExtractionConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Extract one repository.
    ///
    /// Only a failure to list the repository's files is returned as an
    /// error. Unreadable or unparseable files are logged, counted and
    /// contribute no types.
    pub fn extract<S: RepoSource + ?Sized>(&self, source: &S) -> Result<RepoTypeSet> {
        let files = source.list_files()?;

        let outcomes: Vec<FileOutcome> = files
            .par_iter()
            .map(|path| self.extract_file(source, path))
            .collect();

        let mut stats = ExtractionStats {
            files_listed: files.len(),
            ..Default::default()
        };
        let mut types = Vec::new();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Parsed(found) => {
                    stats.files_parsed += 1;
                    types.extend(found);
                }
                FileOutcome::Skipped => stats.files_skipped += 1,
                FileOutcome::Failed => stats.files_failed += 1,
            }
        }
        stats.types = types.len();

        let relationships = build_relationships(&types);
        let modules = build_modules(&types, &relationships);
        info!(
            "Extracted {} types from {} files ({} skipped, {} failed), {} relationships",
            stats.types,
            stats.files_parsed,
            stats.files_skipped,
            stats.files_failed,
            relationships.len()
        );

        Ok(RepoTypeSet {
            types,
            relationships,
            modules,
            stats,
        })
    }

    fn extract_file<S: RepoSource + ?Sized>(&self, source: &S, path: &str) -> FileOutcome {
        let Some(language) = self.registry.language_for_path(path) else {
            return FileOutcome::Skipped;
        };
        if let Some(size) = source.file_size(path) {
            if size > self.config.max_file_size {
                debug!("Skipping {}: {} bytes exceeds limit", path, size);
                return FileOutcome::Skipped;
            }
        }

        let content = match source.read_file(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("{}", e);
                return FileOutcome::Failed;
            }
        };
        if content.len() as u64 > self.config.max_file_size {
            debug!("Skipping {}: {} bytes exceeds limit", path, content.len());
            return FileOutcome::Skipped;
        }

        match self
            .registry
            .try_parse(language, &content, path, self.config.include_private)
        {
            Ok(types) => FileOutcome::Parsed(types),
            Err(e) => {
                warn!("Failed to parse {}: {}", path, e);
                FileOutcome::Failed
            }
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}
