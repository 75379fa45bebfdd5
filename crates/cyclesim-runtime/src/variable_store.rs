//! Name → (current value, optional history) map.
//!
//! [`VariableStore::configure_lag`] grows a variable's history buffer in
//! place via [`RingBuffer::grow_to`] when a deeper lag reference is
//! discovered, rather than rebuilding a fresh buffer and discarding
//! whatever history was already collected.

use crate::ring_buffer::RingBuffer;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct VariableState {
    value: f64,
    history: Option<RingBuffer>,
}

/// Mapping of variable/attribute name to current value and optional
/// lag-indexed history.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    vars: HashMap<String, VariableState>,
}

impl VariableStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `name` exists, defaulting its value to `0.0` if new.
    /// Returns the current value either way.
    pub fn ensure(&mut self, name: &str) -> f64 {
        self.vars.entry(name.to_string()).or_default().value
    }

    /// Write the current value for `name`, auto-materializing the entry,
    /// and append to history if a buffer is configured.
    pub fn set(&mut self, name: &str, value: f64) {
        let entry = self.vars.entry(name.to_string()).or_default();
        entry.value = value;
        if let Some(history) = entry.history.as_mut() {
            history.append(value);
        }
    }

    /// Current value for `name`, or `default` if never set.
    #[must_use]
    pub fn get(&self, name: &str, default: f64) -> f64 {
        self.vars.get(name).map_or(default, |v| v.value)
    }

    /// Current value for `name`, or `None` if it has never been written.
    /// Used by attribute resolution to fall back to an instance's live
    /// attribute only when the store genuinely has nothing for it yet.
    #[must_use]
    pub fn get_opt(&self, name: &str) -> Option<f64> {
        self.vars.get(name).map(|v| v.value)
    }

    /// Value for `name` lagged `k` cycles, or `default` if no history is
    /// configured or not enough samples have been recorded yet.
    #[must_use]
    pub fn get_lag(&self, name: &str, k: i64, default: f64) -> f64 {
        self.vars
            .get(name)
            .and_then(|v| v.history.as_ref())
            .map_or(default, |h| h.get(k, default))
    }

    /// Ensure `name`'s history capacity is at least `depth`, preserving
    /// already-buffered samples. `depth <= 0` drops the history buffer
    /// entirely (idempotent if none exists).
    pub fn configure_lag(&mut self, name: &str, depth: i64) {
        let entry = self.vars.entry(name.to_string()).or_default();
        if depth <= 0 {
            entry.history = None;
            return;
        }
        let depth = depth as usize;
        match entry.history.as_mut() {
            Some(history) => history.grow_to(depth),
            None => entry.history = Some(RingBuffer::new(depth)),
        }
    }

    /// Flat `{name -> value}` view of every variable currently known.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, f64> {
        self.vars.iter().map(|(k, v)| (k.clone(), v.value)).collect()
    }
}
