//! Content loaders for reading attribute/effect data from files.
//!
//! This module provides loaders that convert RON/TOML files into
//! `ability-core` types: effect catalogs and initial-attribute configuration.

pub mod config;
pub mod effects;

pub use config::{ConfigLoader, InitialAttributes};
pub use effects::{EffectCatalog, EffectDef, MagnitudeSpec, ModifierSpec};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
