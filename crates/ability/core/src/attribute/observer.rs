//! Change notification for attribute values.
//!
//! The UI/broadcast layer subscribes to the effect driver with trait-object
//! observers instead of framework delegates. Observers are invoked
//! synchronously and in subscription order after each committed change, so
//! the "initial broadcast then incremental updates" contract holds: call
//! `broadcast_initial_values` once after wiring, then rely on per-change
//! notifications.

use std::sync::{Arc, Mutex};

use super::AttributeKey;

/// A single committed attribute change.
///
/// For the initial broadcast, `old` equals `new`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeChange {
    pub key: AttributeKey,
    pub old: f32,
    pub new: f32,
}

/// Subscriber for attribute change notifications.
pub trait AttributeObserver: Send + Sync {
    fn on_attribute_changed(&self, change: &AttributeChange);
}

/// Observer that records every notification, for tests and debugging.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    changes: Mutex<Vec<AttributeChange>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All notifications received so far, in delivery order.
    pub fn changes(&self) -> Vec<AttributeChange> {
        self.changes.lock().expect("observer lock poisoned").clone()
    }

    /// Notifications for one attribute, in delivery order.
    pub fn changes_for(&self, key: AttributeKey) -> Vec<AttributeChange> {
        self.changes()
            .into_iter()
            .filter(|c| c.key == key)
            .collect()
    }
}

impl AttributeObserver for RecordingObserver {
    fn on_attribute_changed(&self, change: &AttributeChange) {
        self.changes
            .lock()
            .expect("observer lock poisoned")
            .push(*change);
    }
}
