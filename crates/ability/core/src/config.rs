/// Engine configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityConfig {
    /// Maximum number of retained diagnostic warnings per system.
    /// Older entries are dropped once the log is full.
    pub warning_log_capacity: usize,
}

impl AbilityConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of simultaneously active (duration/infinite/periodic)
    /// effects on a single actor.
    pub const MAX_ACTIVE_EFFECTS: usize = 32;

    /// Maximum number of modifiers a single effect may carry.
    pub const MAX_MODIFIERS_PER_EFFECT: usize = 16;

    // ===== numeric policy constants =====
    /// Divisors with absolute value below this are treated as zero and the
    /// offending modifier is skipped instead of producing Inf/NaN.
    pub const DIVISOR_EPSILON: f32 = 1e-6;

    /// Level used when every step of the level-resolution fallback chain
    /// fails to produce a positive value.
    pub const DEFAULT_LEVEL: i32 = 1;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_WARNING_LOG_CAPACITY: usize = 64;

    pub fn new() -> Self {
        Self {
            warning_log_capacity: Self::DEFAULT_WARNING_LOG_CAPACITY,
        }
    }
}

impl Default for AbilityConfig {
    fn default() -> Self {
        Self::new()
    }
}
