//! The per-cycle snapshot record and its reserved-name check.
//!
//! A flat variable-value view plus five reserved fields that must never
//! collide with a declared variable or instance attribute name.

use cyclesim_common::{EngineError, EngineResult};
use serde::Serialize;
use std::collections::HashMap;

/// The five reserved field names a variable/attribute must never collide
/// with.
pub const RESERVED_FIELDS: &[&str] = &["cycleCount", "needSample", "timeStr", "simTime", "execRatio"];

/// Immutable record emitted once per cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Current value of every variable and projected instance attribute.
    pub variables: HashMap<String, f64>,
    /// Cycles executed so far, including this one.
    pub cycle_count: u64,
    /// Whether this cycle's values should be sampled into history.
    pub need_sample: bool,
    /// Formatted simulated time.
    pub time_str: String,
    /// Simulated time in seconds.
    pub sim_time: f64,
    /// Fraction of the cycle period consumed by work this cycle, `[0, 1]`.
    pub exec_ratio: f64,
}

/// Check that no name in `names` collides with a [`RESERVED_FIELDS`] entry.
/// Intended to run once at program-load time over every declared variable
/// and instance-attribute projection name.
pub fn check_no_reserved_collisions<'a>(names: impl IntoIterator<Item = &'a str>) -> EngineResult<()> {
    for name in names {
        if RESERVED_FIELDS.contains(&name) {
            return Err(EngineError::config(format!(
                "variable name '{name}' collides with a reserved snapshot field"
            )));
        }
    }
    Ok(())
}
