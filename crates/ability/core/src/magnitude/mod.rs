//! Magnitude resolution: turning a modifier's magnitude source into a scalar.
//!
//! Three kinds of source:
//! - **Constant**: the scalar is authored directly.
//! - **Attribute-Based**: a linear transform of one backing attribute,
//!   `M = (backing + pre_add) * coefficient + post_add`.
//! - **Custom**: an arbitrary [`CustomCalculation`] combining any number of
//!   backing attributes with non-attribute context (level). The owning
//!   modifier may still wrap the returned base value in a further linear
//!   transform.
//!
//! # Capture semantics
//!
//! Every backing attribute is declared up front as an [`AttributeCapture`]
//! so the driver knows what to gather:
//! - **Source**-side captures are snapshotted when the effect is applied;
//!   the source's attribute set is not retained afterwards.
//! - **Target**-side captures honor the per-capture `snapshot` flag:
//!   `true` freezes the value at application, `false` re-reads it live on
//!   every evaluation.

pub mod custom;

pub use custom::{BackedAttributeCalc, CustomCalculation, Rounding};

use std::sync::Arc;

use crate::attribute::AttributeKey;
use crate::context::EffectContext;
use crate::diag::WarningLog;

/// Which side of the application a capture reads from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaptureSource {
    /// The applier of the effect.
    Source,
    /// The actor the effect is applied to.
    Target,
}

/// Declaration of one backing attribute a magnitude reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeCapture {
    pub attribute: AttributeKey,
    pub source: CaptureSource,
    /// Freeze the value at application time instead of re-reading it live.
    /// An explicit authoring decision, never inferred.
    pub snapshot: bool,
}

impl AttributeCapture {
    pub const fn target(attribute: AttributeKey) -> Self {
        Self {
            attribute,
            source: CaptureSource::Target,
            snapshot: false,
        }
    }

    pub const fn source(attribute: AttributeKey) -> Self {
        Self {
            attribute,
            source: CaptureSource::Source,
            snapshot: true,
        }
    }

    pub const fn snapshotted(mut self) -> Self {
        self.snapshot = true;
        self
    }
}

/// Backing-attribute values gathered for one evaluation.
///
/// Built by the driver: snapshotted captures keep their application-time
/// value, live captures are refreshed before every evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CapturedValues {
    values: Vec<(AttributeKey, CaptureSource, f32)>,
}

impl CapturedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores (or refreshes) the value for a capture.
    pub fn set(&mut self, attribute: AttributeKey, source: CaptureSource, value: f32) {
        if let Some(entry) = self
            .values
            .iter_mut()
            .find(|(a, s, _)| *a == attribute && *s == source)
        {
            entry.2 = value;
            return;
        }
        self.values.push((attribute, source, value));
    }

    /// Value of a capture, if it was gathered.
    pub fn get(&self, attribute: AttributeKey, source: CaptureSource) -> Option<f32> {
        self.values
            .iter()
            .find(|(a, s, _)| *a == attribute && *s == source)
            .map(|(_, _, v)| *v)
    }
}

/// Attribute-Based magnitude: linear transform of one backing attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeBasedMagnitude {
    pub capture: AttributeCapture,
    pub coefficient: f32,
    pub pre_add: f32,
    pub post_add: f32,
}

impl AttributeBasedMagnitude {
    pub const fn new(capture: AttributeCapture) -> Self {
        Self {
            capture,
            coefficient: 1.0,
            pre_add: 0.0,
            post_add: 0.0,
        }
    }

    pub const fn with_coefficient(mut self, coefficient: f32) -> Self {
        self.coefficient = coefficient;
        self
    }

    pub const fn with_pre_add(mut self, pre_add: f32) -> Self {
        self.pre_add = pre_add;
        self
    }

    pub const fn with_post_add(mut self, post_add: f32) -> Self {
        self.post_add = post_add;
        self
    }

    /// `(backing + pre_add) * coefficient + post_add`. Total for finite
    /// inputs; NaN/Inf inputs are the caller's responsibility to avoid.
    pub fn evaluate(&self, backing: f32) -> f32 {
        (backing + self.pre_add) * self.coefficient + self.post_add
    }
}

/// Custom-calculation magnitude with the optional outer linear transform.
#[derive(Clone, Debug)]
pub struct CustomMagnitude {
    pub calculation: Arc<dyn CustomCalculation>,
    pub coefficient: f32,
    pub pre_add: f32,
    pub post_add: f32,
}

impl CustomMagnitude {
    pub fn new(calculation: Arc<dyn CustomCalculation>) -> Self {
        Self {
            calculation,
            coefficient: 1.0,
            pre_add: 0.0,
            post_add: 0.0,
        }
    }
}

/// Where a modifier's magnitude comes from.
#[derive(Clone, Debug)]
pub enum MagnitudeSource {
    Constant(f32),
    AttributeBased(AttributeBasedMagnitude),
    Custom(CustomMagnitude),
}

impl MagnitudeSource {
    /// Convenience constructor for a custom calculation with no outer scaling.
    pub fn custom(calculation: Arc<dyn CustomCalculation>) -> Self {
        Self::Custom(CustomMagnitude::new(calculation))
    }

    /// Captures this magnitude needs gathered before evaluation.
    pub fn captures(&self) -> Vec<AttributeCapture> {
        match self {
            Self::Constant(_) => Vec::new(),
            Self::AttributeBased(ab) => vec![ab.capture],
            Self::Custom(cm) => cm.calculation.captures().to_vec(),
        }
    }

    /// Resolves this magnitude against gathered captures and context.
    ///
    /// Missing captures fail closed to zero; the driver records the warning
    /// when it fails to gather them.
    pub fn resolve(
        &self,
        captured: &CapturedValues,
        ctx: &EffectContext,
        diag: &mut WarningLog,
    ) -> f32 {
        match self {
            Self::Constant(c) => *c,
            Self::AttributeBased(ab) => {
                let backing = captured
                    .get(ab.capture.attribute, ab.capture.source)
                    .unwrap_or(0.0);
                ab.evaluate(backing)
            }
            Self::Custom(cm) => {
                let base = cm.calculation.calculate(captured, ctx, diag);
                (base + cm.pre_add) * cm.coefficient + cm.post_add
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_based_linear_transform() {
        let m = AttributeBasedMagnitude::new(AttributeCapture::target(AttributeKey::Vigor))
            .with_pre_add(2.0)
            .with_coefficient(3.0)
            .with_post_add(-1.0);
        // (10 + 2) * 3 - 1
        assert_eq!(m.evaluate(10.0), 35.0);
    }

    #[test]
    fn missing_capture_fails_closed_to_zero() {
        let m = MagnitudeSource::AttributeBased(
            AttributeBasedMagnitude::new(AttributeCapture::source(AttributeKey::Strength))
                .with_post_add(5.0),
        );
        let mut diag = WarningLog::new(4);
        let v = m.resolve(&CapturedValues::new(), &EffectContext::new(), &mut diag);
        // (0 + 0) * 1 + 5
        assert_eq!(v, 5.0);
    }

    #[test]
    fn captured_values_refresh_in_place() {
        let mut captured = CapturedValues::new();
        captured.set(AttributeKey::Endurance, CaptureSource::Target, 10.0);
        captured.set(AttributeKey::Endurance, CaptureSource::Target, 12.0);
        assert_eq!(
            captured.get(AttributeKey::Endurance, CaptureSource::Target),
            Some(12.0)
        );
        assert_eq!(
            captured.get(AttributeKey::Endurance, CaptureSource::Source),
            None
        );
    }
}
