//! Effects: ordered modifier lists applied to an attribute set.
//!
//! An effect is a named recipe — a lifecycle kind plus an ordered list of
//! modifiers. Modifier order is significant and preserved exactly as
//! authored: each operation works on the running result of the previous
//! ones, so reordering changes the outcome whenever Multiply/Divide/Override
//! mix with Add.

use arrayvec::ArrayVec;
use strum::Display;

use crate::attribute::AttributeKey;
use crate::config::AbilityConfig;
use crate::context::EffectContext;
use crate::diag::{EvalWarning, WarningLog};
use crate::magnitude::MagnitudeSource;

/// Operation a modifier performs on the running value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierOp {
    Add,
    Multiply,
    Divide,
    Override,
}

/// One modifier: an operation with a magnitude, targeting one attribute.
#[derive(Clone, Debug)]
pub struct Modifier {
    pub attribute: AttributeKey,
    pub op: ModifierOp,
    pub magnitude: MagnitudeSource,
}

impl Modifier {
    pub fn new(attribute: AttributeKey, op: ModifierOp, magnitude: MagnitudeSource) -> Self {
        Self {
            attribute,
            op,
            magnitude,
        }
    }

    pub fn add(attribute: AttributeKey, magnitude: MagnitudeSource) -> Self {
        Self::new(attribute, ModifierOp::Add, magnitude)
    }

    pub fn multiply(attribute: AttributeKey, magnitude: MagnitudeSource) -> Self {
        Self::new(attribute, ModifierOp::Multiply, magnitude)
    }

    pub fn divide(attribute: AttributeKey, magnitude: MagnitudeSource) -> Self {
        Self::new(attribute, ModifierOp::Divide, magnitude)
    }

    pub fn override_to(attribute: AttributeKey, magnitude: MagnitudeSource) -> Self {
        Self::new(attribute, ModifierOp::Override, magnitude)
    }
}

/// Lifecycle kind of an effect application.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    /// One-shot, permanently modifies base.
    Instant,
    /// Temporarily modifies current for a fixed window (seconds), reverted
    /// on expiry.
    HasDuration(f32),
    /// Temporarily modifies current until explicitly removed.
    Infinite,
    /// Executes like a repeated Instant every `period` seconds, permanently
    /// modifying base each tick. `duration: None` runs until removed.
    Periodic { period: f32, duration: Option<f32> },
}

impl EffectKind {
    /// True for kinds whose executions permanently modify base.
    pub const fn modifies_base(self) -> bool {
        matches!(self, Self::Instant | Self::Periodic { .. })
    }

    /// True for kinds that stay active after application.
    pub const fn is_persistent(self) -> bool {
        !matches!(self, Self::Instant)
    }
}

/// A named, ordered recipe for an effect application.
#[derive(Clone, Debug)]
pub struct EffectSpec {
    pub name: String,
    pub kind: EffectKind,
    pub modifiers: ArrayVec<Modifier, { AbilityConfig::MAX_MODIFIERS_PER_EFFECT }>,
    pub context: EffectContext,
}

impl EffectSpec {
    pub fn new(name: impl Into<String>, kind: EffectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers: ArrayVec::new(),
            context: EffectContext::new(),
        }
    }

    /// Appends a modifier. Panics when the effect already carries
    /// [`AbilityConfig::MAX_MODIFIERS_PER_EFFECT`] modifiers; that is an
    /// authoring bug, not a runtime condition.
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_context(mut self, context: EffectContext) -> Self {
        self.context = context;
        self
    }
}

/// Handle to an active (persistent) effect, used for explicit removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectHandle(pub(crate) u32);

/// Applies one operation to the running value, guarding the degenerate
/// cases. A divisor within [`AbilityConfig::DIVISOR_EPSILON`] of zero or a
/// non-finite magnitude skips the modifier (the running value passes through
/// unchanged) and records a warning — Inf/NaN never reach the store.
pub fn apply_op(
    op: ModifierOp,
    running: f32,
    magnitude: f32,
    effect: &str,
    attribute: AttributeKey,
    diag: &mut WarningLog,
) -> f32 {
    if !magnitude.is_finite() {
        diag.record(EvalWarning::NonFiniteMagnitude {
            effect: effect.to_owned(),
            attribute,
        });
        return running;
    }
    match op {
        ModifierOp::Add => running + magnitude,
        ModifierOp::Multiply => running * magnitude,
        ModifierOp::Divide => {
            if magnitude.abs() < AbilityConfig::DIVISOR_EPSILON {
                diag.record(EvalWarning::DivideByZero {
                    effect: effect.to_owned(),
                    attribute,
                });
                running
            } else {
                running / magnitude
            }
        }
        ModifierOp::Override => magnitude,
    }
}
