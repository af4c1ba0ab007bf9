//! API-boundary errors.
//!
//! Only structurally invalid requests surface as errors. Evaluation
//! anomalies (divide-by-zero, missing captures, exhausted fallbacks) are
//! recoverable by design and reported through [`crate::diag`] instead.

use crate::effect::EffectHandle;

/// Errors returned by the effect driver's public API.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EffectError {
    /// The bounded active-effect list is full.
    #[error("active effect limit reached ({max})")]
    TooManyActiveEffects { max: usize },

    /// No active effect with this handle (never issued, or already removed).
    #[error("unknown effect handle {0:?}")]
    UnknownEffect(EffectHandle),

    /// A periodic effect was authored with a non-positive period.
    #[error("periodic effect '{name}' has non-positive period {period}")]
    InvalidPeriod { name: String, period: f32 },
}
