//! Effect context: who applied an effect, and the non-attribute inputs
//! custom calculations may read from it.
//!
//! The only capability the resolution pipeline needs from the surrounding
//! game is "what level is this thing" — modeled as [`LevelSource`] instead
//! of any particular object-model cast. Context candidates are tried most
//! specific first; a step is only taken when the previous one produced an
//! invalid (non-positive) or absent level.
//!
//! Level is *not* an attribute: changing it does not re-trigger magnitude
//! resolution. Effects whose magnitude depends on level must be reapplied
//! when it changes (or level must be modeled as an attribute). Documented
//! limitation, same as the original system.

use std::fmt;
use std::sync::Arc;

use crate::config::AbilityConfig;
use crate::diag::{EvalWarning, WarningLog};

/// Capability query for actor level.
pub trait LevelSource: Send + Sync {
    fn actor_level(&self) -> i32;
}

/// Fixed-level source, mostly for content tooling and tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedLevel(pub i32);

impl LevelSource for FixedLevel {
    fn actor_level(&self) -> i32 {
        self.0
    }
}

/// Context attached to an effect application.
///
/// Carries the chain of collaborators a custom calculation may resolve
/// non-attribute inputs against, ordered most specific first.
#[derive(Clone, Default)]
pub struct EffectContext {
    /// Explicit source object set by the applier (most specific).
    pub source_object: Option<Arc<dyn LevelSource>>,
    /// The original instigator of the effect chain.
    pub original_instigator: Option<Arc<dyn LevelSource>>,
    /// The immediate causer (e.g. a projectile rather than its owner).
    pub effect_causer: Option<Arc<dyn LevelSource>>,
    /// Per-application override, tried after all object candidates.
    pub level_override: Option<i32>,
}

impl EffectContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_object(mut self, source: Arc<dyn LevelSource>) -> Self {
        self.source_object = Some(source);
        self
    }

    pub fn with_original_instigator(mut self, instigator: Arc<dyn LevelSource>) -> Self {
        self.original_instigator = Some(instigator);
        self
    }

    pub fn with_effect_causer(mut self, causer: Arc<dyn LevelSource>) -> Self {
        self.effect_causer = Some(causer);
        self
    }

    pub fn with_level_override(mut self, level: i32) -> Self {
        self.level_override = Some(level);
        self
    }

    /// Resolves actor level through the fallback chain:
    /// source object → original instigator → effect causer → override →
    /// [`AbilityConfig::DEFAULT_LEVEL`].
    ///
    /// Only positive levels are accepted at each step. Exhausting the chain
    /// records a warning and yields the default — gameplay must continue.
    pub fn resolve_level(&self, diag: &mut WarningLog) -> i32 {
        let candidates = [
            self.source_object.as_ref(),
            self.original_instigator.as_ref(),
            self.effect_causer.as_ref(),
        ];
        for candidate in candidates.into_iter().flatten() {
            let level = candidate.actor_level();
            if level > 0 {
                return level;
            }
        }
        if let Some(level) = self.level_override {
            if level > 0 {
                return level;
            }
        }
        diag.record(EvalWarning::LevelFallbackExhausted {
            default: AbilityConfig::DEFAULT_LEVEL,
        });
        AbilityConfig::DEFAULT_LEVEL
    }
}

impl fmt::Debug for EffectContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectContext")
            .field("source_object", &self.source_object.is_some())
            .field("original_instigator", &self.original_instigator.is_some())
            .field("effect_causer", &self.effect_causer.is_some())
            .field("level_override", &self.level_override)
            .finish()
    }
}
