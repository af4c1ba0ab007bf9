//! Effect catalog loader.
//!
//! Effect recipes are authored in RON as [`EffectDef`]s and converted into
//! runtime [`EffectSpec`]s on lookup. Magnitudes are data-driven: constants,
//! attribute-based linear transforms, or the single-attribute-plus-level
//! backed calculation. Arbitrary custom calculations stay code-side and are
//! attached by the caller after conversion.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use ability_core::{
    AttributeBasedMagnitude, AttributeCapture, AttributeKey, BackedAttributeCalc, CaptureSource,
    EffectKind, EffectSpec, MagnitudeSource, Modifier, ModifierOp,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Serializable magnitude source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MagnitudeSpec {
    Constant(f32),
    AttributeBased {
        attribute: AttributeKey,
        #[serde(default = "default_capture_source")]
        source: CaptureSource,
        #[serde(default)]
        snapshot: bool,
        #[serde(default = "default_coefficient")]
        coefficient: f32,
        #[serde(default)]
        pre_add: f32,
        #[serde(default)]
        post_add: f32,
    },
    BackedCalculation(BackedAttributeCalc),
}

fn default_capture_source() -> CaptureSource {
    CaptureSource::Target
}

fn default_coefficient() -> f32 {
    1.0
}

impl MagnitudeSpec {
    fn to_source(&self) -> MagnitudeSource {
        match self {
            Self::Constant(c) => MagnitudeSource::Constant(*c),
            Self::AttributeBased {
                attribute,
                source,
                snapshot,
                coefficient,
                pre_add,
                post_add,
            } => {
                let capture = AttributeCapture {
                    attribute: *attribute,
                    source: *source,
                    snapshot: *snapshot,
                };
                MagnitudeSource::AttributeBased(
                    AttributeBasedMagnitude::new(capture)
                        .with_coefficient(*coefficient)
                        .with_pre_add(*pre_add)
                        .with_post_add(*post_add),
                )
            }
            Self::BackedCalculation(calc) => MagnitudeSource::custom(Arc::new(calc.clone())),
        }
    }
}

/// Serializable modifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierSpec {
    pub attribute: AttributeKey,
    pub op: ModifierOp,
    pub magnitude: MagnitudeSpec,
}

/// Serializable effect recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectDef {
    pub name: String,
    pub kind: EffectKind,
    pub modifiers: Vec<ModifierSpec>,
}

impl EffectDef {
    /// Converts this definition into a runtime spec. The context (source
    /// object, instigator, level override) is the applier's business and is
    /// attached afterwards.
    pub fn to_spec(&self) -> EffectSpec {
        let mut spec = EffectSpec::new(self.name.clone(), self.kind);
        for modifier in &self.modifiers {
            spec = spec.with_modifier(Modifier::new(
                modifier.attribute,
                modifier.op,
                modifier.magnitude.to_source(),
            ));
        }
        spec
    }
}

/// Catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EffectCatalogFile {
    effects: Vec<EffectDef>,
}

/// Registry of effect recipes loaded from data files.
#[derive(Debug, Clone)]
pub struct EffectCatalog {
    effects: HashMap<String, EffectDef>,
}

impl EffectCatalog {
    /// Loads the embedded starter catalog.
    pub fn load() -> LoadResult<Self> {
        Self::from_ron(include_str!("../../data/effects/starter.ron"))
    }

    /// Loads a catalog from an external RON file.
    pub fn load_from(path: &Path) -> LoadResult<Self> {
        Self::from_ron(&read_file(path)?)
    }

    fn from_ron(content: &str) -> LoadResult<Self> {
        let file: EffectCatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse effect catalog RON: {}", e))?;
        let effects = file
            .effects
            .into_iter()
            .map(|def| (def.name.clone(), def))
            .collect();
        Ok(Self { effects })
    }

    /// Looks up a recipe by name.
    pub fn get(&self, name: &str) -> Option<&EffectDef> {
        self.effects.get(name)
    }

    /// Builds a runtime spec for a named recipe.
    pub fn spec(&self, name: &str) -> Option<EffectSpec> {
        self.get(name).map(EffectDef::to_spec)
    }

    /// Returns an iterator over all recipe names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.effects.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
