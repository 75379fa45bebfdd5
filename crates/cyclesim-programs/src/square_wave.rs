//! Square wave generator.
//!
//! A phase position wrapped into `[0, 1)`, high for the first half of
//! the period and low for the second.

use crate::args::get_f64;
use cyclesim_common::EngineResult;
use cyclesim_runtime::ProgramInstance;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A square wave generator instance.
pub struct SquareWave {
    out: f64,
    amplitude: f64,
    period: f64,
    phase: f64,
    cycle_count: u64,
    cycles_per_period: f64,
}

/// Construct a [`SquareWave`] from its declared init arguments.
pub fn construct(cycle_time: f64, args: &Map<String, Value>) -> EngineResult<Box<dyn ProgramInstance>> {
    let amplitude = get_f64(args, "amplitude", 1.0)?;
    let period = get_f64(args, "period", 10.0)?;
    Ok(Box::new(SquareWave {
        out: 0.0,
        amplitude,
        period,
        phase: get_f64(args, "phase", 0.0)?,
        cycle_count: 0,
        cycles_per_period: period / cycle_time,
    }))
}

impl ProgramInstance for SquareWave {
    fn execute(&mut self, _kwargs: &HashMap<String, f64>) -> EngineResult<()> {
        let position = ((self.cycle_count as f64).rem_euclid(self.cycles_per_period) / self.cycles_per_period
            + self.phase)
            .rem_euclid(1.0);
        self.out = if position < 0.5 { self.amplitude } else { -self.amplitude };
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
    fn first_half_period_is_high() {
        let args: Map<String, Value> = [
            ("amplitude".to_string(), json!(5.0)),
            ("period".to_string(), json!(10.0)),
        ]
        .into_iter()
        .collect();
        let mut w = construct(1.0, &args).unwrap();
        w.execute(&HashMap::new()).unwrap();
        assert_eq!(w.get_attribute("out"), Some(5.0));
    }

    #[test]
    fn second_half_period_is_low() {
        let args: Map<String, Value> = [
            ("amplitude".to_string(), json!(5.0)),
            ("period".to_string(), json!(10.0)),
        ]
        .into_iter()
        .collect();
        let mut w = construct(1.0, &args).unwrap();
        for _ in 0..6 {
            w.execute(&HashMap::new()).unwrap();
        }
        assert_eq!(w.get_attribute("out"), Some(-5.0));
    }
}
