//! Deterministic attribute and gameplay-effect resolution.
//!
//! `ability-core` defines the canonical pipeline — attribute store, clamping
//! policy, magnitude resolvers, and the effect application driver — and
//! exposes pure APIs that can be reused by game runtimes and offline tools.
//! All state mutation flows through [`system::AbilitySystem`], and supporting
//! crates depend on the types re-exported here.

pub mod attribute;
pub mod config;
pub mod context;
pub mod diag;
pub mod effect;
pub mod error;
pub mod magnitude;
pub mod system;

pub use attribute::clamp::{ClampPolicy, PairClampPolicy};
pub use attribute::observer::{AttributeChange, AttributeObserver, RecordingObserver};
pub use attribute::{AttributeGroup, AttributeKey, AttributeSet, AttributeValue, CurrentMaxPair};
pub use config::AbilityConfig;
pub use context::{EffectContext, FixedLevel, LevelSource};
pub use diag::{EvalWarning, WarningLog};
pub use effect::{EffectHandle, EffectKind, EffectSpec, Modifier, ModifierOp};
pub use error::EffectError;
pub use magnitude::{
    AttributeBasedMagnitude, AttributeCapture, BackedAttributeCalc, CaptureSource, CapturedValues,
    CustomCalculation, CustomMagnitude, MagnitudeSource, Rounding,
};
pub use system::AbilitySystem;
