//! Triangle wave generator.
//!
//! A phase position wrapped into `[0, 1)`, ramping linearly up through
//! the first half and back down through the second.

use crate::args::get_f64;
use cyclesim_common::EngineResult;
use cyclesim_runtime::ProgramInstance;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A triangle wave generator instance.
pub struct TriangleWave {
    out: f64,
    amplitude: f64,
    period: f64,
    phase: f64,
    cycle_count: u64,
    cycles_per_period: f64,
}

/// Construct a [`TriangleWave`] from its declared init arguments.
pub fn construct(cycle_time: f64, args: &Map<String, Value>) -> EngineResult<Box<dyn ProgramInstance>> {
    let amplitude = get_f64(args, "amplitude", 1.0)?;
    let period = get_f64(args, "period", 10.0)?;
    Ok(Box::new(TriangleWave {
        out: 0.0,
        amplitude,
        period,
        phase: get_f64(args, "phase", 0.0)?,
        cycle_count: 0,
        cycles_per_period: period / cycle_time,
    }))
}

impl ProgramInstance for TriangleWave {
    fn execute(&mut self, _kwargs: &HashMap<String, f64>) -> EngineResult<()> {
        let position = ((self.cycle_count as f64).rem_euclid(self.cycles_per_period) / self.cycles_per_period
            + self.phase)
            .rem_euclid(1.0);
        self.out = if position < 0.5 {
            -self.amplitude + 4.0 * self.amplitude * position
        } else {
            self.amplitude - 4.0 * self.amplitude * (position - 0.5)
        };
        self.cycle_count += 1;
        Ok(())
    }

    fn stored_attributes(&self) -> &[&'static str] {
        &["out", "amplitude", "period", "phase"]
    }

    fn get_attribute(&self, name: &str) -> Option<f64> {
        match name {
            "out" => Some(self.out),
            "amplitude" => Some(self.amplitude),
            "period" => Some(self.period),
            "phase" => Some(self.phase),
            _ => None,
        }
    }
}
