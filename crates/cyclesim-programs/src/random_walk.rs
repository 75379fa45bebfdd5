//! Bounded random walk generator.
//!
//! Each cycle picks a new uniform target and steps toward it by at most
//! `max_step`, clamped to `[l, h]`.

use crate::args::get_f64;
use cyclesim_common::EngineResult;
use cyclesim_runtime::ProgramInstance;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A bounded random walk instance.
pub struct RandomWalk {
    out: f64,
    l: f64,
    h: f64,
    max_step: f64,
    rng: StdRng,
}

/// Construct a [`RandomWalk`] from its declared init arguments.
pub fn construct(_cycle_time: f64, args: &Map<String, Value>) -> EngineResult<Box<dyn ProgramInstance>> {
    let l = get_f64(args, "l", 0.0)?;
    let h = get_f64(args, "h", 100.0)?;
    let max_step = get_f64(args, "max_step", 3.0)?;
    let mut rng = StdRng::from_entropy();
    let out = rng.gen_range(l..=h);
    Ok(Box::new(RandomWalk { out, l, h, max_step, rng }))
}

impl ProgramInstance for RandomWalk {
    fn execute(&mut self, _kwargs: &HashMap<String, f64>) -> EngineResult<()> {
        let target = self.rng.gen_range(self.l..=self.h);
        let change = (target - self.out).clamp(-self.max_step, self.max_step);
        self.out = (self.out + change).clamp(self.l, self.h);
        Ok(())
    }

    fn stored_attributes(&self) -> &[&'static str] {
        &["out"]
    }

    fn get_attribute(&self, name: &str) -> Option<f64> {
        (name == "out").then_some(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn walk() -> Box<dyn ProgramInstance> {
        let args: Map<String, Value> = [
            ("l".to_string(), json!(0.0)),
            ("h".to_string(), json!(100.0)),
            ("max_step".to_string(), json!(3.0)),
        ]
        .into_iter()
        .collect();
        construct(1.0, &args).unwrap()
    }

    #[test]
    fn initial_value_is_within_bounds() {
        let w = walk();
        let out = w.get_attribute("out").unwrap();
        assert!((0.0..=100.0).contains(&out));
    }

    #[test]
    fn stays_within_bounds_after_many_steps() {
        let mut w = walk();
        for _ in 0..1_000 {
            w.execute(&HashMap::new()).unwrap();
            let out = w.get_attribute("out").unwrap();
            assert!((0.0..=100.0).contains(&out));
        }
    }

    #[test]
    fn never_steps_more_than_max_step_per_cycle() {
        let mut w = walk();
        let before = w.get_attribute("out").unwrap();
        w.execute(&HashMap::new()).unwrap();
        let after = w.get_attribute("out").unwrap();
        assert!((after - before).abs() <= 3.0 + 1e-9);
    }
}
