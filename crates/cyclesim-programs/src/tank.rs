//! Cylindrical tank with a free-draining outlet.
//!
//! Torricelli outflow through a fixed outlet area, clamped inlet valve
//! percentage, Euler-integrated level.

use crate::args::get_f64;
use cyclesim_common::EngineResult;
use cyclesim_runtime::ProgramInstance;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Standard gravity, m/s^2, matching the source's module-level constant.
const GRAVITY: f64 = 9.81;

/// A cylindrical tank model instance.
pub struct CylindricalTank {
    level: f64,
    height: f64,
    radius: f64,
    inlet_area: f64,
    inlet_velocity: f64,
    outlet_area: f64,
    initial_level: f64,
    valve_opening: f64,
    base_area: f64,
    cycle_time: f64,
}

/// Construct a [`CylindricalTank`] from its declared init arguments.
pub fn construct(cycle_time: f64, args: &Map<String, Value>) -> EngineResult<Box<dyn ProgramInstance>> {
    let height = get_f64(args, "height", 10.0)?;
    let radius = get_f64(args, "radius", 1.0)?;
    let initial_level = get_f64(args, "initial_level", 0.0)?;
    Ok(Box::new(CylindricalTank {
        level: initial_level,
        height,
        radius,
        inlet_area: get_f64(args, "inlet_area", 0.01)?,
        inlet_velocity: get_f64(args, "inlet_velocity", 1.0)?,
        outlet_area: get_f64(args, "outlet_area", 0.01)?,
        initial_level,
        valve_opening: 0.0,
        base_area: std::f64::consts::PI * radius * radius,
        cycle_time,
    }))
}

impl ProgramInstance for CylindricalTank {
    fn execute(&mut self, kwargs: &HashMap<String, f64>) -> EngineResult<()> {
        let valve_opening = kwargs
            .get("valve_opening")
            .copied()
            .unwrap_or(self.valve_opening)
            .clamp(0.0, 100.0);
        self.valve_opening = valve_opening;

        let inlet_flow = self.inlet_area * self.inlet_velocity * (valve_opening / 100.0);
        let outlet_flow = if self.level > 0.0 {
            self.outlet_area * (2.0 * GRAVITY * self.level).sqrt()
        } else {
            0.0
        };
        self.level += (inlet_flow - outlet_flow) * self.cycle_time / self.base_area;
        self.level = self.level.clamp(0.0, self.height);
        Ok(())
    }

    fn stored_attributes(&self) -> &[&'static str] {
        &[
            "level",
            "height",
            "radius",
            "inlet_area",
            "inlet_velocity",
            "outlet_area",
            "initial_level",
            "valve_opening",
        ]
    }

    fn get_attribute(&self, name: &str) -> Option<f64> {
        match name {
            "level" => Some(self.level),
            "height" => Some(self.height),
            "radius" => Some(self.radius),
            "inlet_area" => Some(self.inlet_area),
            "inlet_velocity" => Some(self.inlet_velocity),
            "outlet_area" => Some(self.outlet_area),
            "initial_level" => Some(self.initial_level),
            "valve_opening" => Some(self.valve_opening),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tank() -> Box<dyn ProgramInstance> {
        let args: Map<String, Value> = [
            ("height".to_string(), json!(5.0)),
            ("radius".to_string(), json!(1.0)),
            ("inlet_area".to_string(), json!(0.1)),
            ("inlet_velocity".to_string(), json!(1.0)),
            ("outlet_area".to_string(), json!(0.0)),
            ("initial_level".to_string(), json!(0.0)),
        ]
        .into_iter()
        .collect();
        construct(1.0, &args).unwrap()
    }

    #[test]
    fn filling_with_no_outlet_only_rises() {
        let mut t = tank();
        let mut kwargs = HashMap::new();
        kwargs.insert("valve_opening".to_string(), 100.0);
        t.execute(&kwargs).unwrap();
        let level1 = t.get_attribute("level").unwrap();
        assert!(level1 > 0.0);
        t.execute(&kwargs).unwrap();
        let level2 = t.get_attribute("level").unwrap();
        assert!(level2 > level1);
    }

    #[test]
    fn level_never_exceeds_height() {
        let mut t = tank();
        let mut kwargs = HashMap::new();
        kwargs.insert("valve_opening".to_string(), 100.0);
        for _ in 0..10_000 {
            t.execute(&kwargs).unwrap();
        }
        assert!(t.get_attribute("level").unwrap() <= 5.0);
    }

    #[test]
    fn valve_opening_out_of_range_is_clamped() {
        let mut t = tank();
        let mut kwargs = HashMap::new();
        kwargs.insert("valve_opening".to_string(), 150.0);
        t.execute(&kwargs).unwrap();
        assert_eq!(t.get_attribute("valve_opening"), Some(100.0));
    }
}
