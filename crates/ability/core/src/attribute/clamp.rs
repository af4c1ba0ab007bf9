//! Clamping policy: the three callback points around attribute mutation.
//!
//! The effect driver invokes these at fixed points in its lifecycle:
//!
//! 1. [`ClampPolicy::pre_current_change`] — before *any* change to a current
//!    value, regardless of source (instant, duration, infinite, periodic, or
//!    a direct set). Only the value surfaced to the store is clamped; the
//!    underlying modifier list is untouched. That is a documented limitation,
//!    not something the policy may "fix": with several temporary modifiers
//!    active, the clamped-away contribution is still present underneath and
//!    reappears in the raw fold when another modifier is removed.
//! 2. [`ClampPolicy::pre_base_change`] — before base changes from instant or
//!    periodic executions (duration/infinite never touch base). Prevents the
//!    permanent overflow that pre-current-change cannot reach.
//! 3. [`ClampPolicy::post_effect_execute`] — after an instant/periodic
//!    execution fully completes. This is the single point of truth for
//!    keeping a dependent attribute consistent after its max shifted, and it
//!    runs with final authority via the store's direct setters.
//!
//! Callbacks must stay pure with respect to unrelated attributes: touch only
//! the target attribute and, in the post hook, its registered dependents.

use super::{AttributeKey, AttributeSet};

/// Callback contract invoked by the effect driver around attribute changes.
pub trait ClampPolicy: Send + Sync {
    /// Maps a proposed current value to the value actually stored.
    fn pre_current_change(&self, set: &AttributeSet, key: AttributeKey, proposed: f32) -> f32;

    /// Maps a proposed base value to the value actually stored.
    ///
    /// Fires only for instant/periodic executions.
    fn pre_base_change(&self, set: &AttributeSet, key: AttributeKey, proposed: f32) -> f32;

    /// Runs after an instant/periodic execution changed `changed`.
    ///
    /// The default pair-driven policy re-clamps dependents when a max
    /// attribute moved. Implementations may mutate `set` directly through
    /// its final-authority setters.
    fn post_effect_execute(&self, set: &mut AttributeSet, changed: AttributeKey);
}

/// Default policy: clamp every registered current↔max pair to `[0, max]`.
///
/// Unpaired attributes pass through unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct PairClampPolicy;

impl PairClampPolicy {
    fn clamp_to_pair(&self, set: &AttributeSet, key: AttributeKey, proposed: f32) -> f32 {
        match set.max_of(key) {
            Some(max_key) => proposed.clamp(0.0, set.current(max_key)),
            None => proposed,
        }
    }
}

impl ClampPolicy for PairClampPolicy {
    fn pre_current_change(&self, set: &AttributeSet, key: AttributeKey, proposed: f32) -> f32 {
        self.clamp_to_pair(set, key, proposed)
    }

    fn pre_base_change(&self, set: &AttributeSet, key: AttributeKey, proposed: f32) -> f32 {
        self.clamp_to_pair(set, key, proposed)
    }

    fn post_effect_execute(&self, set: &mut AttributeSet, changed: AttributeKey) {
        // When a max attribute shifts down, pull its dependent back into the
        // new range. A max increase only raises the ceiling; the dependent is
        // never force-raised.
        let dependents: Vec<AttributeKey> = set.dependents_of(changed).collect();
        for dependent in dependents {
            let max = set.current(changed);
            let current = set.current(dependent);
            let clamped = current.clamp(0.0, max);
            if clamped != current {
                set.set_current(dependent, clamped);
            }
            let base = set.base(dependent);
            let base_clamped = base.clamp(0.0, max);
            if base_clamped != base {
                set.set_base(dependent, base_clamped);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with_health(current: f32, max: f32) -> AttributeSet {
        let mut set = AttributeSet::new();
        set.initialize([
            (AttributeKey::MaxHealth, max),
            (AttributeKey::Health, current),
        ]);
        set
    }

    #[test]
    fn pre_current_change_clamps_paired_attribute() {
        let set = set_with_health(50.0, 100.0);
        let policy = PairClampPolicy;
        assert_eq!(
            policy.pre_current_change(&set, AttributeKey::Health, 150.0),
            100.0
        );
        assert_eq!(
            policy.pre_current_change(&set, AttributeKey::Health, -20.0),
            0.0
        );
        assert_eq!(
            policy.pre_current_change(&set, AttributeKey::Health, 73.5),
            73.5
        );
    }

    #[test]
    fn unpaired_attributes_pass_through() {
        let set = AttributeSet::new();
        let policy = PairClampPolicy;
        assert_eq!(
            policy.pre_current_change(&set, AttributeKey::Strength, -42.0),
            -42.0
        );
        assert_eq!(
            policy.pre_base_change(&set, AttributeKey::Armor, 1e9),
            1e9
        );
    }

    #[test]
    fn post_effect_execute_clamps_dependent_after_max_drop() {
        // Scenario: current sits above a freshly lowered max.
        let mut set = set_with_health(150.0, 100.0);
        let policy = PairClampPolicy;
        policy.post_effect_execute(&mut set, AttributeKey::MaxHealth);
        assert_eq!(set.current(AttributeKey::Health), 100.0);
    }

    #[test]
    fn post_effect_execute_never_force_raises_dependent() {
        let mut set = set_with_health(40.0, 100.0);
        set.set_current(AttributeKey::MaxHealth, 200.0);
        let policy = PairClampPolicy;
        policy.post_effect_execute(&mut set, AttributeKey::MaxHealth);
        // Ceiling rose, the dependent stays put.
        assert_eq!(set.current(AttributeKey::Health), 40.0);
    }

    #[test]
    fn post_effect_execute_ignores_non_max_attributes() {
        let mut set = set_with_health(150.0, 100.0);
        let policy = PairClampPolicy;
        policy.post_effect_execute(&mut set, AttributeKey::Strength);
        // No pair registered for Strength, nothing moves.
        assert_eq!(set.current(AttributeKey::Health), 150.0);
    }
}
