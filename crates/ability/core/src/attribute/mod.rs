//! Attribute store: named numeric quantities with Base and Current values.
//!
//! Each attribute carries two values:
//! - **Base**: the permanent component, changed only by instant/periodic
//!   effect executions.
//! - **Current**: the transient effective value, recomputed from Base plus
//!   every active duration/infinite modifier.
//!
//! Vital attributes (Health, Mana, Stamina) are paired with a max attribute
//! (MaxHealth, MaxMana, MaxStamina) that bounds them. Pairs are registered
//! once at construction; the clamping policy reads the registry to keep
//! `0 <= current <= max` and `0 <= base <= max` after every change.

pub mod clamp;
pub mod observer;

use std::collections::BTreeMap;

use strum::{Display, EnumIter, IntoEnumIterator};

/// Identifier for every attribute the engine knows about.
///
/// Grouping follows the original game design:
/// - **Primary**: raw character stats, set at spawn and by level-ups.
/// - **Secondary**: derived combat stats, usually driven by infinite effects
///   backed by primary attributes.
/// - **Vital**: consumable pools, each bounded by a paired max attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeKey {
    // ========================================================================
    // Primary Attributes
    // ========================================================================
    Strength,
    Dexterity,
    Intelligence,
    Endurance,
    Vigor,

    // ========================================================================
    // Secondary Attributes
    // ========================================================================
    Armor,
    ArmorPenetration,
    BlockChance,
    CriticalHitChance,
    CriticalHitDamage,
    CriticalHitResistance,
    HealthRegeneration,
    MaxHealth,
    ManaRegeneration,
    MaxMana,
    StaminaRegeneration,
    MaxStamina,

    // ========================================================================
    // Vital Attributes
    // ========================================================================
    Health,
    Mana,
    Stamina,
}

/// Coarse grouping of attributes, used by UI layers and content tooling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeGroup {
    Primary,
    Secondary,
    Vital,
}

impl AttributeKey {
    /// Returns the group this attribute belongs to.
    pub const fn group(self) -> AttributeGroup {
        use AttributeKey::*;
        match self {
            Strength | Dexterity | Intelligence | Endurance | Vigor => AttributeGroup::Primary,
            Health | Mana | Stamina => AttributeGroup::Vital,
            _ => AttributeGroup::Secondary,
        }
    }
}

/// Base and current value of a single attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeValue {
    /// Permanent value, modified only by instant/periodic executions.
    pub base: f32,
    /// Transient effective value including active modifiers.
    pub current: f32,
}

impl AttributeValue {
    /// Creates a value with base and current both set to `v`.
    pub const fn init(v: f32) -> Self {
        Self {
            base: v,
            current: v,
        }
    }
}

/// A registered current↔max pairing (e.g. Health bounded by MaxHealth).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurrentMaxPair {
    pub current: AttributeKey,
    pub max: AttributeKey,
}

/// The attribute store for a single actor.
///
/// Holds every [`AttributeKey`] (all initialized to zero until explicitly
/// initialized) plus the current↔max pair registry consumed by the clamping
/// policy.
///
/// Initialization goes through [`AttributeSet::initialize`], which writes
/// base and current directly and deliberately bypasses the pre-change
/// callbacks: running clamping during setup would order-couple initial values
/// (e.g. Health before MaxHealth is set would clamp to zero).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeSet {
    values: BTreeMap<AttributeKey, AttributeValue>,
    pairs: Vec<CurrentMaxPair>,
}

impl AttributeSet {
    /// Creates a store with every attribute zeroed and the standard vital
    /// pairs (Health↔MaxHealth, Mana↔MaxMana, Stamina↔MaxStamina) registered.
    pub fn new() -> Self {
        let values = AttributeKey::iter()
            .map(|key| (key, AttributeValue::default()))
            .collect();

        let mut set = Self {
            values,
            pairs: Vec::new(),
        };
        set.register_pair(AttributeKey::Health, AttributeKey::MaxHealth);
        set.register_pair(AttributeKey::Mana, AttributeKey::MaxMana);
        set.register_pair(AttributeKey::Stamina, AttributeKey::MaxStamina);
        set
    }

    /// Registers a current↔max pairing. Re-registering an existing current
    /// key replaces its max.
    pub fn register_pair(&mut self, current: AttributeKey, max: AttributeKey) {
        if let Some(pair) = self.pairs.iter_mut().find(|p| p.current == current) {
            pair.max = max;
            return;
        }
        self.pairs.push(CurrentMaxPair { current, max });
    }

    /// Writes initial values (base and current) without triggering clamping.
    pub fn initialize(&mut self, initial: impl IntoIterator<Item = (AttributeKey, f32)>) {
        for (key, v) in initial {
            self.values.insert(key, AttributeValue::init(v));
        }
    }

    /// Base and current values of an attribute.
    pub fn get(&self, key: AttributeKey) -> AttributeValue {
        // Every variant is inserted at construction, so the lookup is total.
        self.values.get(&key).copied().unwrap_or_default()
    }

    /// Base value of an attribute.
    pub fn base(&self, key: AttributeKey) -> f32 {
        self.get(key).base
    }

    /// Current value of an attribute.
    pub fn current(&self, key: AttributeKey) -> f32 {
        self.get(key).current
    }

    /// Sets the current value directly, with final authority.
    ///
    /// This bypasses the pre-change callbacks and must only be used on the
    /// authoritative side, from the post-effect-execute path or equivalent.
    pub fn set_current(&mut self, key: AttributeKey, value: f32) {
        if let Some(v) = self.values.get_mut(&key) {
            v.current = value;
        }
    }

    /// Sets the base value directly, with final authority.
    ///
    /// Same caveats as [`AttributeSet::set_current`].
    pub fn set_base(&mut self, key: AttributeKey, value: f32) {
        if let Some(v) = self.values.get_mut(&key) {
            v.base = value;
        }
    }

    /// Returns the max attribute paired with `current`, if registered.
    pub fn max_of(&self, current: AttributeKey) -> Option<AttributeKey> {
        self.pairs
            .iter()
            .find(|p| p.current == current)
            .map(|p| p.max)
    }

    /// Returns the current attributes bounded by `max` (usually zero or one).
    pub fn dependents_of(&self, max: AttributeKey) -> impl Iterator<Item = AttributeKey> + '_ {
        self.pairs
            .iter()
            .filter(move |p| p.max == max)
            .map(|p| p.current)
    }

    /// Iterates over all attributes in a stable, deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (AttributeKey, AttributeValue)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::new()
    }
}
