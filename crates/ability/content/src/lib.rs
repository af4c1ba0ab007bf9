//! Data-driven content definitions and loaders.
//!
//! This crate houses static attribute/effect content and provides loaders
//! for RON/TOML data files:
//! - Attribute display metadata (names, descriptions, formats) via RON
//! - Effect catalogs (lifecycle kind + modifier recipes) via RON
//! - Initial attribute values via TOML
//!
//! Content is consumed at startup and converted into `ability-core` types;
//! registries are plain values constructed once and passed where needed,
//! never ambient globals.

pub mod info;
pub mod loaders;

pub use info::{AttributeInfo, AttributeInfoRegistry};
pub use loaders::{
    ConfigLoader, EffectCatalog, EffectDef, InitialAttributes, MagnitudeSpec, ModifierSpec,
};
