//! Sine wave generator.
//!
//! Phase advances one cycle's worth of angle per call, wrapping on
//! `cycles_per_period` rather than accumulating unbounded angle.

use crate::args::get_f64;
use cyclesim_common::EngineResult;
use cyclesim_runtime::ProgramInstance;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::f64::consts::TAU;

/// A sine wave generator instance.
pub struct SineWave {
    out: f64,
    amplitude: f64,
    period: f64,
    phase: f64,
    cycle_count: u64,
    cycles_per_period: f64,
}

/// Construct a [`SineWave`] from its declared init arguments.
pub fn construct(cycle_time: f64, args: &Map<String, Value>) -> EngineResult<Box<dyn ProgramInstance>> {
    let amplitude = get_f64(args, "amplitude", 1.0)?;
    let period = get_f64(args, "period", 10.0)?;
    Ok(Box::new(SineWave {
        out: 0.0,
        amplitude,
        period,
        phase: get_f64(args, "phase", 0.0)?,
        cycle_count: 0,
        cycles_per_period: period / cycle_time,
    }))
}

impl ProgramInstance for SineWave {
    fn execute(&mut self, _kwargs: &HashMap<String, f64>) -> EngineResult<()> {
        let position = (self.cycle_count as f64).rem_euclid(self.cycles_per_period) / self.cycles_per_period;
        let angle = TAU * position + self.phase;
        self.out = self.amplitude * angle.sin();
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completes_one_period_back_to_zero_crossing() {
        let args: Map<String, Value> = [
            ("amplitude".to_string(), json!(2.0)),
            ("period".to_string(), json!(4.0)),
            ("phase".to_string(), json!(0.0)),
        ]
        .into_iter()
        .collect();
        let mut w = construct(1.0, &args).unwrap();
        for _ in 0..4 {
            w.execute(&HashMap::new()).unwrap();
        }
        assert!(w.get_attribute("out").unwrap().abs() < 1e-9);
    }

    #[test]
    fn amplitude_bounds_the_output() {
        let args: Map<String, Value> = [
            ("amplitude".to_string(), json!(3.0)),
            ("period".to_string(), json!(8.0)),
        ]
        .into_iter()
        .collect();
        let mut w = construct(1.0, &args).unwrap();
        for _ in 0..8 {
            w.execute(&HashMap::new()).unwrap();
            assert!(w.get_attribute("out").unwrap().abs() <= 3.0 + 1e-9);
        }
    }
}
