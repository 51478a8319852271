//! Default values for typeweave configuration.

// ============================================================================
// Extraction Defaults
// ============================================================================

/// Files larger than this are skipped (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Whether non-public declarations are extracted.
pub const DEFAULT_INCLUDE_PRIVATE: bool = false;

/// Whether zod and ORM schema parsers run alongside the primary parsers.
pub const DEFAULT_SUPPLEMENTARY: bool = true;

/// Directory names never walked. Hidden directories are skipped separately.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    "node_modules",
    "bower_components",
    "vendor",
    "third_party",
    "venv",
    "__pycache__",
    "site-packages",
    "target",
    "build",
    "dist",
    "out",
    "bin",
    "obj",
    "coverage",
];

// ============================================================================
// Matching Defaults
// ============================================================================

/// Points for equal normalized names.
pub const DEFAULT_NAME_WEIGHT: u8 = 50;

/// Points for equivalent kinds.
pub const DEFAULT_KIND_WEIGHT: u8 = 20;

/// Maximum points for field-name overlap.
pub const DEFAULT_FIELD_WEIGHT: u8 = 30;

/// Matches below this similarity produce no flow edges; also the lower
/// bound of medium confidence.
pub const DEFAULT_MIN_SIMILARITY: u8 = 60;

/// Lower bound of high confidence.
pub const DEFAULT_HIGH_CONFIDENCE: u8 = 80;

// ============================================================================
// Config Locations
// ============================================================================

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = "typeweave.toml";

/// Directory under the user config dir.
pub const USER_CONFIG_DIR: &str = "typeweave";

/// File name inside [`USER_CONFIG_DIR`].
pub const USER_CONFIG_FILE: &str = "config.toml";
