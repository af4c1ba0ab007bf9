//! Diagnostics for recoverable evaluation anomalies.
//!
//! Nothing in the resolution pipeline propagates errors across its boundary:
//! anomalies are absorbed into a safe numeric default and reported here. Each
//! warning goes through `tracing` and is additionally retained in a bounded
//! per-system log so tests and tooling can assert on them.

use std::collections::VecDeque;

use tracing::warn;

use crate::attribute::AttributeKey;
use crate::magnitude::CaptureSource;

/// A recoverable anomaly observed while resolving magnitudes or folding
/// modifiers. All of these indicate authoring/configuration mistakes, never
/// runtime failures.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalWarning {
    /// A Divide modifier resolved to (effectively) zero and was skipped.
    #[error("divide-by-zero magnitude on {attribute} in effect '{effect}', modifier skipped")]
    DivideByZero {
        effect: String,
        attribute: AttributeKey,
    },

    /// A resolved magnitude was NaN/Inf and was skipped.
    #[error("non-finite magnitude on {attribute} in effect '{effect}', modifier skipped")]
    NonFiniteMagnitude {
        effect: String,
        attribute: AttributeKey,
    },

    /// A backing-attribute capture could not be resolved (e.g. source-side
    /// capture with no source system). Fails closed to zero.
    ///
    /// The field is named `side` rather than `source`: thiserror treats a
    /// `source` field as the error's cause.
    #[error("missing {side:?}-side capture of {attribute} in effect '{effect}', using 0")]
    MissingCapture {
        effect: String,
        attribute: AttributeKey,
        side: CaptureSource,
    },

    /// Every step of the level-resolution fallback chain was exhausted.
    #[error("level resolution exhausted all fallbacks, using default level {default}")]
    LevelFallbackExhausted { default: i32 },

    /// Current-value re-derivation hit its pass limit while values were
    /// still moving (live capture chain too deep, or cyclic). The committed
    /// values may be stale.
    #[error("current values did not settle after {passes} recompute passes")]
    UnsettledRecompute { passes: usize },
}

/// Bounded ring of recent warnings.
#[derive(Debug)]
pub struct WarningLog {
    entries: VecDeque<EvalWarning>,
    capacity: usize,
}

impl WarningLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records a warning, emitting it through `tracing` and retaining it.
    /// The oldest entry is dropped once the log is full.
    pub fn record(&mut self, warning: EvalWarning) {
        warn!(target: "ability_core", "{warning}");
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(warning);
    }

    /// Retained warnings, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &EvalWarning> {
        self.entries.iter()
    }

    /// True if any retained warning matches the predicate.
    pub fn any(&self, mut pred: impl FnMut(&&EvalWarning) -> bool) -> bool {
        self.entries.iter().any(|w| pred(&w))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
