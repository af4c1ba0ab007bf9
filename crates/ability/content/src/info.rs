//! Attribute display metadata.
//!
//! Replaces designer-editable data assets with a plain RON file loaded at
//! startup. The registry is an explicit value handed to whatever UI layer
//! needs it; lookups are by [`AttributeKey`].

use std::collections::HashMap;
use std::path::Path;

use ability_core::AttributeKey;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Display metadata for one attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeInfo {
    pub key: AttributeKey,
    pub name: String,
    pub description: String,
    /// Format string for displaying the value (e.g. `"{0}%"` for chances).
    #[serde(default = "default_value_format")]
    pub value_format: String,
    /// Whether this is a primary attribute (affects UI grouping).
    #[serde(default)]
    pub primary: bool,
}

fn default_value_format() -> String {
    "{0}".to_owned()
}

/// Catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeInfoCatalog {
    pub attributes: Vec<AttributeInfo>,
}

/// Registry of attribute display metadata, constructed once at startup.
#[derive(Debug, Clone)]
pub struct AttributeInfoRegistry {
    infos: HashMap<AttributeKey, AttributeInfo>,
}

impl AttributeInfoRegistry {
    /// Loads the embedded default metadata.
    pub fn load() -> LoadResult<Self> {
        Self::from_ron(include_str!("../data/attributes/info.ron"))
    }

    /// Loads metadata from an external RON file.
    pub fn load_from(path: &Path) -> LoadResult<Self> {
        Self::from_ron(&read_file(path)?)
    }

    fn from_ron(content: &str) -> LoadResult<Self> {
        let catalog: AttributeInfoCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse attribute info RON: {}", e))?;
        let infos = catalog
            .attributes
            .into_iter()
            .map(|info| (info.key, info))
            .collect();
        Ok(Self { infos })
    }

    /// Metadata for an attribute, if the data file provides it.
    pub fn get(&self, key: AttributeKey) -> Option<&AttributeInfo> {
        self.infos.get(&key)
    }

    /// All primary-attribute entries.
    pub fn primary(&self) -> impl Iterator<Item = &AttributeInfo> {
        self.infos.values().filter(|info| info.primary)
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}
