//! Per-repository structure derived from a fixed set of definitions.
//!
//! Both builders are deterministic functions of their input and are rerun
//! whenever a repository's definitions are re-extracted.

mod builder;
mod modules;

pub use builder::build_relationships;
pub use modules::{build_modules, module_path};
