//! The effect application driver.
//!
//! [`AbilitySystem`] owns one actor's canonical attribute state and is the
//! single writer for it: effect applications, periodic executions, and
//! removals run synchronously, one at a time, in arrival order. There is no
//! locking because there is nothing to race — cross-actor applications must
//! execute on the *target's* authoritative owner. Non-authoritative
//! observers only ever see committed current values through the observer
//! contract; they never run clamping or resolution themselves.
//!
//! # Lifecycle
//!
//! - **Instant** effects execute immediately against base values.
//! - **Duration/Infinite** effects are stored and contribute to current
//!   values until expiry/removal; they never touch base.
//! - **Periodic** effects execute like a repeated Instant every period.
//!
//! After every mutation the driver recomputes current values from scratch:
//! for each attribute, base is folded through every active modifier in
//! application order, then passed through the pre-current-change clamp.
//! Because the visible value is always re-derived from base and clamped, it
//! can never exceed its max after any add/remove sequence — the retained
//! (and documented) limitation is that the clamped-away contribution of
//! stacked temporary modifiers is not tracked per modifier, so removing one
//! of them may leave the visible value pinned at max rather than dropping.

use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::attribute::clamp::{ClampPolicy, PairClampPolicy};
use crate::attribute::observer::{AttributeChange, AttributeObserver};
use crate::attribute::{AttributeKey, AttributeSet};
use crate::config::AbilityConfig;
use crate::diag::{EvalWarning, WarningLog};
use crate::effect::{EffectHandle, EffectKind, EffectSpec, apply_op};
use crate::error::EffectError;
use crate::magnitude::{CaptureSource, CapturedValues};

/// Maximum fixpoint passes when re-deriving current values. Bounds chained
/// live captures (primary → secondary → vital max) without risking cycles.
const MAX_RECOMPUTE_PASSES: usize = 8;

/// A stored persistent effect.
#[derive(Clone, Debug)]
struct ActiveEffect {
    handle: EffectHandle,
    spec: EffectSpec,
    /// Application-time snapshots (all Source-side captures plus Target-side
    /// captures authored with `snapshot: true`).
    captured: CapturedValues,
    /// Remaining lifetime in seconds; `None` runs until removed.
    remaining: Option<f32>,
    /// Execution period for periodic effects.
    period: Option<f32>,
    /// Countdown to the next periodic execution.
    until_next_execution: f32,
}

/// Authoritative attribute and effect state for a single actor.
pub struct AbilitySystem {
    attributes: AttributeSet,
    clamp: Box<dyn ClampPolicy>,
    observers: Vec<Arc<dyn AttributeObserver>>,
    active: ArrayVec<ActiveEffect, { AbilityConfig::MAX_ACTIVE_EFFECTS }>,
    next_handle: u32,
    diag: WarningLog,
}

impl AbilitySystem {
    /// Creates a system with the default pair-driven clamp policy and a
    /// freshly zeroed attribute set.
    pub fn new() -> Self {
        Self::with_config(AbilityConfig::default())
    }

    pub fn with_config(config: AbilityConfig) -> Self {
        Self {
            attributes: AttributeSet::new(),
            clamp: Box::new(PairClampPolicy),
            observers: Vec::new(),
            active: ArrayVec::new(),
            next_handle: 0,
            diag: WarningLog::new(config.warning_log_capacity),
        }
    }

    /// Replaces the clamp policy. Intended for construction time, before
    /// any effect has been applied.
    pub fn with_clamp_policy(mut self, clamp: Box<dyn ClampPolicy>) -> Self {
        self.clamp = clamp;
        self
    }

    /// Writes initial attribute values without triggering clamping, then
    /// syncs current values once.
    pub fn initialize_attributes(
        &mut self,
        initial: impl IntoIterator<Item = (AttributeKey, f32)>,
    ) {
        self.attributes.initialize(initial);
    }

    /// Read-only view of the attribute store.
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Diagnostics recorded by the resolution pipeline.
    pub fn warnings(&self) -> &WarningLog {
        &self.diag
    }

    pub fn clear_warnings(&mut self) {
        self.diag.clear();
    }

    /// Number of stored persistent effects.
    pub fn active_effect_count(&self) -> usize {
        self.active.len()
    }

    /// True while `handle` refers to a stored effect.
    pub fn has_effect(&self, handle: EffectHandle) -> bool {
        self.active.iter().any(|e| e.handle == handle)
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Subscribes an observer. Observers are notified synchronously, in
    /// subscription order, after each committed change.
    pub fn subscribe(&mut self, observer: Arc<dyn AttributeObserver>) {
        self.observers.push(observer);
    }

    /// Emits one notification per attribute with its current value
    /// (`old == new`). Call once after wiring subscribers, before relying on
    /// incremental updates.
    pub fn broadcast_initial_values(&self) {
        for (key, value) in self.attributes.iter() {
            let change = AttributeChange {
                key,
                old: value.current,
                new: value.current,
            };
            for observer in &self.observers {
                observer.on_attribute_changed(&change);
            }
        }
    }

    fn notify_diff(&self, before: &AttributeSet) {
        for (key, value) in self.attributes.iter() {
            let old = before.get(key).current;
            if old != value.current {
                let change = AttributeChange {
                    key,
                    old,
                    new: value.current,
                };
                for observer in &self.observers {
                    observer.on_attribute_changed(&change);
                }
            }
        }
    }

    // ========================================================================
    // Effect application
    // ========================================================================

    /// Applies a self-sourced effect (source and target are the same actor).
    ///
    /// Returns a handle for persistent kinds, `None` for instant effects.
    pub fn apply_effect(&mut self, spec: EffectSpec) -> Result<Option<EffectHandle>, EffectError> {
        self.apply_effect_from(None, spec)
    }

    /// Applies an effect from another actor's system. Runs entirely on this
    /// (the target's) system; `source` is only read for source-side captures,
    /// which are snapshotted here and never re-read.
    pub fn apply_effect_from(
        &mut self,
        source: Option<&AbilitySystem>,
        spec: EffectSpec,
    ) -> Result<Option<EffectHandle>, EffectError> {
        if let EffectKind::Periodic { period, .. } = spec.kind {
            if period <= 0.0 {
                return Err(EffectError::InvalidPeriod {
                    name: spec.name.clone(),
                    period,
                });
            }
        }
        if spec.kind.is_persistent() && self.active.is_full() {
            return Err(EffectError::TooManyActiveEffects {
                max: AbilityConfig::MAX_ACTIVE_EFFECTS,
            });
        }

        let before = self.attributes.clone();
        let captured = self.capture_on_apply(&spec, source);

        let result = match spec.kind {
            EffectKind::Instant => {
                self.execute_on_base(&spec, &captured);
                None
            }
            EffectKind::HasDuration(duration) => {
                Some(self.store_active(spec, captured, Some(duration), None))
            }
            EffectKind::Infinite => Some(self.store_active(spec, captured, None, None)),
            EffectKind::Periodic { period, duration } => {
                // First execution happens at the end of the first period.
                Some(self.store_active(spec, captured, duration, Some(period)))
            }
        };

        self.recompute_currents();
        self.notify_diff(&before);
        Ok(result)
    }

    /// Removes a stored effect and re-derives current values.
    pub fn remove_effect(&mut self, handle: EffectHandle) -> Result<(), EffectError> {
        let index = self
            .active
            .iter()
            .position(|e| e.handle == handle)
            .ok_or(EffectError::UnknownEffect(handle))?;

        let before = self.attributes.clone();
        self.active.remove(index);
        self.recompute_currents();
        self.notify_diff(&before);
        Ok(())
    }

    /// Advances time by `dt` seconds: runs due periodic executions (multiple
    /// periods per call are processed in order), expires finished durations,
    /// then re-derives current values.
    ///
    /// Periodic executions run before expiry so an effect ending exactly on
    /// a period boundary still applies its final execution.
    pub fn tick(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let before = self.attributes.clone();

        // Periodic executions, in insertion order.
        for index in 0..self.active.len() {
            let (period, advance) = {
                let effect = &self.active[index];
                let Some(period) = effect.period else {
                    continue;
                };
                // Never execute past the effect's own lifetime.
                let advance = match effect.remaining {
                    Some(remaining) => dt.min(remaining.max(0.0)),
                    None => dt,
                };
                (period, advance)
            };

            self.active[index].until_next_execution -= advance;
            while self.active[index].until_next_execution <= 0.0 {
                self.active[index].until_next_execution += period;
                let (spec, captured) = {
                    let effect = &self.active[index];
                    (effect.spec.clone(), effect.captured.clone())
                };
                self.execute_on_base(&spec, &captured);
            }
        }

        // Expire durations after the final execution above.
        for effect in self.active.iter_mut() {
            if let Some(remaining) = effect.remaining.as_mut() {
                *remaining -= dt;
            }
        }
        self.active
            .retain(|e| e.remaining.is_none_or(|remaining| remaining > 0.0));

        self.recompute_currents();
        self.notify_diff(&before);
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn store_active(
        &mut self,
        spec: EffectSpec,
        captured: CapturedValues,
        remaining: Option<f32>,
        period: Option<f32>,
    ) -> EffectHandle {
        let handle = EffectHandle(self.next_handle);
        self.next_handle += 1;
        self.active.push(ActiveEffect {
            handle,
            spec,
            captured,
            remaining,
            period,
            until_next_execution: period.unwrap_or(0.0),
        });
        handle
    }

    /// Gathers application-time snapshots: every Source-side capture (from
    /// `source`, failing closed to zero when absent) and every Target-side
    /// capture authored with `snapshot: true`.
    fn capture_on_apply(
        &mut self,
        spec: &EffectSpec,
        source: Option<&AbilitySystem>,
    ) -> CapturedValues {
        let mut captured = CapturedValues::new();
        for modifier in &spec.modifiers {
            for capture in modifier.magnitude.captures() {
                match capture.source {
                    CaptureSource::Source => {
                        let value = match source {
                            Some(system) => system.attributes.current(capture.attribute),
                            None => {
                                self.diag.record(EvalWarning::MissingCapture {
                                    effect: spec.name.clone(),
                                    attribute: capture.attribute,
                                    side: CaptureSource::Source,
                                });
                                0.0
                            }
                        };
                        captured.set(capture.attribute, CaptureSource::Source, value);
                    }
                    CaptureSource::Target => {
                        if capture.snapshot {
                            let value = self.attributes.current(capture.attribute);
                            captured.set(capture.attribute, CaptureSource::Target, value);
                        }
                        // Live target captures are refreshed at evaluation.
                    }
                }
            }
        }
        captured
    }

    /// Clones the stored snapshots and refreshes every live Target-side
    /// capture from the current attribute state.
    fn resolve_captures(&self, spec: &EffectSpec, stored: &CapturedValues) -> CapturedValues {
        let mut captured = stored.clone();
        for modifier in &spec.modifiers {
            for capture in modifier.magnitude.captures() {
                if capture.source == CaptureSource::Target && !capture.snapshot {
                    captured.set(
                        capture.attribute,
                        CaptureSource::Target,
                        self.attributes.current(capture.attribute),
                    );
                }
            }
        }
        captured
    }

    /// Executes an instant/periodic payload against base values: per target
    /// attribute, fold the effect's modifiers in authored order over the
    /// stored base, clamp through pre-base-change, commit, then run the
    /// post-effect-execute hook.
    fn execute_on_base(&mut self, spec: &EffectSpec, captured: &CapturedValues) {
        let resolved = self.resolve_captures(spec, captured);

        // Attributes in order of first appearance in the modifier list.
        let mut touched: Vec<AttributeKey> = Vec::new();
        for modifier in &spec.modifiers {
            if !touched.contains(&modifier.attribute) {
                touched.push(modifier.attribute);
            }
        }

        for attribute in touched {
            let mut running = self.attributes.base(attribute);
            for modifier in spec.modifiers.iter().filter(|m| m.attribute == attribute) {
                let magnitude = modifier
                    .magnitude
                    .resolve(&resolved, &spec.context, &mut self.diag);
                running = apply_op(
                    modifier.op,
                    running,
                    magnitude,
                    &spec.name,
                    attribute,
                    &mut self.diag,
                );
            }
            let clamped = self
                .clamp
                .pre_base_change(&self.attributes, attribute, running);
            self.attributes.set_base(attribute, clamped);
            // Sync the executed attribute's current before the post hook so
            // dependent re-clamping sees the fresh value. The full
            // re-derivation (overlaying active modifiers) runs afterwards.
            let provisional = self
                .clamp
                .pre_current_change(&self.attributes, attribute, clamped);
            self.attributes.set_current(attribute, provisional);
            self.clamp.post_effect_execute(&mut self.attributes, attribute);
        }
    }

    /// Re-derives every current value: base folded through all active
    /// current-modifiers in application order, then clamped.
    ///
    /// Runs to a fixpoint (bounded by [`MAX_RECOMPUTE_PASSES`]) so chained
    /// live captures settle: an effect backing off Endurance feeds Armor,
    /// which may in turn back a block-chance effect, and so on. Unpaired
    /// attributes commit before paired ones within a pass so clamping always
    /// sees the freshest max values.
    fn recompute_currents(&mut self) {
        let mut settled = false;
        for _ in 0..MAX_RECOMPUTE_PASSES {
            let resolved: Vec<CapturedValues> = self
                .active
                .iter()
                .map(|e| self.resolve_captures(&e.spec, &e.captured))
                .collect();

            let keys: Vec<AttributeKey> = self.attributes.iter().map(|(k, _)| k).collect();
            let mut proposed: Vec<(AttributeKey, f32)> = Vec::with_capacity(keys.len());
            for key in keys {
                let mut running = self.attributes.base(key);
                for (index, effect) in self.active.iter().enumerate() {
                    if effect.spec.kind.modifies_base() {
                        continue; // periodic payloads apply to base, not here
                    }
                    for modifier in effect.spec.modifiers.iter().filter(|m| m.attribute == key) {
                        let magnitude = modifier.magnitude.resolve(
                            &resolved[index],
                            &effect.spec.context,
                            &mut self.diag,
                        );
                        running = apply_op(
                            modifier.op,
                            running,
                            magnitude,
                            &effect.spec.name,
                            key,
                            &mut self.diag,
                        );
                    }
                }
                proposed.push((key, running));
            }

            // Commit maxes (unpaired) first so paired clamps read fresh values.
            let mut changed = false;
            for paired_pass in [false, true] {
                for (key, raw) in &proposed {
                    if (self.attributes.max_of(*key).is_some()) != paired_pass {
                        continue;
                    }
                    let clamped = self.clamp.pre_current_change(&self.attributes, *key, *raw);
                    if clamped != self.attributes.current(*key) {
                        self.attributes.set_current(*key, clamped);
                        changed = true;
                    }
                }
            }

            if !changed {
                settled = true;
                break;
            }
        }
        if !settled {
            self.diag.record(EvalWarning::UnsettledRecompute {
                passes: MAX_RECOMPUTE_PASSES,
            });
        }
    }
}

impl Default for AbilitySystem {
    fn default() -> Self {
        Self::new()
    }
}
