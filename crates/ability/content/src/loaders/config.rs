//! Initial-attribute configuration loader.
//!
//! Startup values come from a TOML file instead of constructor constants, so
//! designers can retune pools without a rebuild. The values are fed to
//! `AbilitySystem::initialize_attributes`, which deliberately bypasses
//! clamping (file order must not matter).

use std::collections::BTreeMap;
use std::path::Path;

use ability_core::AttributeKey;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Initial attribute values parsed from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialAttributes {
    pub attributes: BTreeMap<AttributeKey, f32>,
}

impl InitialAttributes {
    /// Iterates values in a stable order, ready for attribute initialization.
    pub fn values(&self) -> impl Iterator<Item = (AttributeKey, f32)> + '_ {
        self.attributes.iter().map(|(k, v)| (*k, *v))
    }

    pub fn get(&self, key: AttributeKey) -> Option<f32> {
        self.attributes.get(&key).copied()
    }
}

/// Loader for initial-attribute configuration.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the embedded default configuration.
    pub fn load() -> LoadResult<InitialAttributes> {
        Self::from_toml(include_str!("../../data/config/default.toml"))
    }

    /// Loads configuration from an external TOML file.
    pub fn load_from(path: &Path) -> LoadResult<InitialAttributes> {
        Self::from_toml(&read_file(path)?)
    }

    fn from_toml(content: &str) -> LoadResult<InitialAttributes> {
        toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse initial attributes TOML: {}", e))
    }
}
