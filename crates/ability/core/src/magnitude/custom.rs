//! Custom magnitude calculations.
//!
//! A custom calculation combines any number of declared backing attributes
//! with non-attribute context (actor level) into an arbitrary float. It must
//! declare every attribute it reads via [`CustomCalculation::captures`] so
//! the driver knows what to gather — and, for live captures, when the
//! magnitude needs re-evaluation.
//!
//! Hot-path rules: no blocking I/O, no heap allocation, no assumptions about
//! the calling thread beyond "the authoritative side". Changes to
//! non-attribute inputs do **not** re-trigger evaluation; reapply the effect
//! when they change.

use std::fmt;

use crate::attribute::AttributeKey;
use crate::context::EffectContext;
use crate::diag::WarningLog;
use crate::magnitude::{AttributeCapture, CaptureSource, CapturedValues};

/// Arbitrary-logic magnitude resolver.
pub trait CustomCalculation: fmt::Debug + Send + Sync {
    /// Backing attributes this calculation reads.
    fn captures(&self) -> &[AttributeCapture];

    /// Computes the base magnitude from gathered captures and context.
    fn calculate(
        &self,
        captured: &CapturedValues,
        ctx: &EffectContext,
        diag: &mut WarningLog,
    ) -> f32;
}

/// Rounding applied to a calculation's output.
///
/// Display-oriented: max-style attributes read better without ".5" artifacts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rounding {
    #[default]
    None,
    HalfToEven,
    Floor,
    Ceil,
}

impl Rounding {
    pub fn apply(self, value: f32) -> f32 {
        match self {
            Self::None => value,
            Self::HalfToEven => value.round_ties_even(),
            Self::Floor => value.floor(),
            Self::Ceil => value.ceil(),
        }
    }
}

/// Calculation backed by a single attribute plus actor level:
/// `base_magnitude + attribute_multiplier * backing + level_multiplier * level`.
///
/// The backing value is floored at zero so a debuffed-negative attribute
/// cannot invert the result. Level comes from the context's fallback chain.
///
/// This covers the common "max pool grows with a stat and level" shape; the
/// stock [`BackedAttributeCalc::max_stamina`] preset is
/// `80 + 2.5 * Endurance + 10 * level`, captured live on the target.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackedAttributeCalc {
    pub capture: AttributeCapture,
    pub base_magnitude: f32,
    pub attribute_multiplier: f32,
    pub level_multiplier: f32,
    pub rounding: Rounding,
}

impl BackedAttributeCalc {
    pub const fn new(capture: AttributeCapture) -> Self {
        Self {
            capture,
            base_magnitude: 0.0,
            attribute_multiplier: 1.0,
            level_multiplier: 0.0,
            rounding: Rounding::None,
        }
    }

    /// Stock MaxStamina formula from the original game design.
    pub const fn max_stamina() -> Self {
        Self {
            capture: AttributeCapture {
                attribute: AttributeKey::Endurance,
                source: CaptureSource::Target,
                snapshot: false,
            },
            base_magnitude: 80.0,
            attribute_multiplier: 2.5,
            level_multiplier: 10.0,
            rounding: Rounding::HalfToEven,
        }
    }
}

impl CustomCalculation for BackedAttributeCalc {
    fn captures(&self) -> &[AttributeCapture] {
        std::slice::from_ref(&self.capture)
    }

    fn calculate(
        &self,
        captured: &CapturedValues,
        ctx: &EffectContext,
        diag: &mut WarningLog,
    ) -> f32 {
        let backing = captured
            .get(self.capture.attribute, self.capture.source)
            .unwrap_or(0.0)
            .max(0.0);
        let level = ctx.resolve_level(diag) as f32;

        let value =
            self.base_magnitude + self.attribute_multiplier * backing + self.level_multiplier * level;
        self.rounding.apply(value)
    }
}
