//! Slew-rate-limited control valve.
//!
//! The current opening moves toward the target at a fixed speed derived
//! from the valve's full-travel time, never overshooting in one cycle.

use crate::args::get_f64;
use cyclesim_common::EngineResult;
use cyclesim_runtime::ProgramInstance;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A travel-time-limited valve model instance.
pub struct Valve {
    current_opening: f64,
    min_opening: f64,
    max_opening: f64,
    full_travel_time: f64,
    cycle_time: f64,
}

/// Construct a [`Valve`] from its declared init arguments.
pub fn construct(cycle_time: f64, args: &Map<String, Value>) -> EngineResult<Box<dyn ProgramInstance>> {
    Ok(Box::new(Valve {
        current_opening: get_f64(args, "initial_opening", 0.0)?,
        min_opening: get_f64(args, "min_opening", 0.0)?,
        max_opening: get_f64(args, "max_opening", 100.0)?,
        full_travel_time: get_f64(args, "full_travel_time", 10.0)?,
        cycle_time,
    }))
}

impl ProgramInstance for Valve {
    fn execute(&mut self, kwargs: &HashMap<String, f64>) -> EngineResult<()> {
        let target = kwargs
            .get("target_opening")
            .copied()
            .unwrap_or(self.current_opening)
            .clamp(self.min_opening, self.max_opening);

        let range = self.max_opening - self.min_opening;
        let speed = if self.full_travel_time > 0.0 && range > 0.0 {
            range / self.full_travel_time
        } else {
            f64::INFINITY
        };
        let distance = speed * self.cycle_time;
        let diff = target - self.current_opening;
        self.current_opening = if diff.abs() <= distance {
            target
        } else {
            self.current_opening + distance * diff.signum()
        };
        self.current_opening = self.current_opening.clamp(self.min_opening, self.max_opening);
        Ok(())
    }

    fn stored_attributes(&self) -> &[&'static str] {
        &["current_opening"]
    }

    fn get_attribute(&self, name: &str) -> Option<f64> {
        (name == "current_opening").then_some(self.current_opening)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valve(full_travel_time: f64) -> Box<dyn ProgramInstance> {
        let args: Map<String, Value> = [
            ("min_opening".to_string(), json!(0.0)),
            ("max_opening".to_string(), json!(100.0)),
            ("full_travel_time".to_string(), json!(full_travel_time)),
            ("initial_opening".to_string(), json!(0.0)),
        ]
        .into_iter()
        .collect();
        construct(1.0, &args).unwrap()
    }

    #[test]
    fn moves_toward_target_at_fixed_speed() {
        let mut v = valve(10.0);
        let mut kwargs = HashMap::new();
        kwargs.insert("target_opening".to_string(), 100.0);
        v.execute(&kwargs).unwrap();
        assert_eq!(v.get_attribute("current_opening"), Some(10.0));
    }

    #[test]
    fn does_not_overshoot_a_near_target() {
        let mut v = valve(10.0);
        let mut kwargs = HashMap::new();
        kwargs.insert("target_opening".to_string(), 3.0);
        v.execute(&kwargs).unwrap();
        assert_eq!(v.get_attribute("current_opening"), Some(3.0));
    }

    #[test]
    fn zero_travel_time_snaps_instantly() {
        let mut v = valve(0.0);
        let mut kwargs = HashMap::new();
        kwargs.insert("target_opening".to_string(), 75.0);
        v.execute(&kwargs).unwrap();
        assert_eq!(v.get_attribute("current_opening"), Some(75.0));
    }
}
