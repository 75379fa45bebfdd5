//! Scripted value/duration waveform.
//!
//! A list of `(value, duration)` segments, each held for its duration's
//! worth of cycles before advancing, wrapping back to the first segment
//! after the last.

use crate::args::get_pairs;
use cyclesim_common::{EngineError, EngineResult};
use cyclesim_runtime::ProgramInstance;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A scripted value/duration waveform instance.
///
/// Only `out` is projected into the variable store — the segment list
/// itself is configuration, not a per-cycle scalar.
pub struct ListWave {
    out: f64,
    segments: Vec<(f64, f64)>,
    cycle_counts: Vec<u64>,
    current_segment: usize,
    segment_cycle_count: u64,
}

/// Construct a [`ListWave`] from its declared init arguments.
pub fn construct(cycle_time: f64, args: &Map<String, Value>) -> EngineResult<Box<dyn ProgramInstance>> {
    let segments = get_pairs(args, "wave_list")?;
    if cycle_time <= 0.0 {
        return Err(EngineError::config("cycle_time must be positive"));
    }
    let cycle_counts = segments
        .iter()
        .map(|(_, duration)| ((duration / cycle_time).round() as u64).max(1))
        .collect();
    let out = segments[0].0;
    Ok(Box::new(ListWave {
        out,
        segments,
        cycle_counts,
        current_segment: 0,
        segment_cycle_count: 0,
    }))
}

impl ProgramInstance for ListWave {
    fn execute(&mut self, _kwargs: &HashMap<String, f64>) -> EngineResult<()> {
        self.out = self.segments[self.current_segment].0;
        self.segment_cycle_count += 1;
        if self.segment_cycle_count >= self.cycle_counts[self.current_segment] {
            self.current_segment = (self.current_segment + 1) % self.segments.len();
            self.segment_cycle_count = 0;
        }
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

    fn wave() -> Box<dyn ProgramInstance> {
        let args: Map<String, Value> = [(
            "wave_list".to_string(),
            json!([[1.0, 2.0], [2.0, 1.0], [3.0, 2.0]]),
        )]
        .into_iter()
        .collect();
        construct(1.0, &args).unwrap()
    }

    #[test]
    fn holds_each_segment_for_its_duration() {
        let mut w = wave();
        let kwargs = HashMap::new();
        w.execute(&kwargs).unwrap();
        assert_eq!(w.get_attribute("out"), Some(1.0));
        w.execute(&kwargs).unwrap();
        assert_eq!(w.get_attribute("out"), Some(1.0));
        w.execute(&kwargs).unwrap();
        assert_eq!(w.get_attribute("out"), Some(2.0));
        w.execute(&kwargs).unwrap();
        assert_eq!(w.get_attribute("out"), Some(3.0));
    }

    #[test]
    fn wraps_around_after_the_last_segment() {
        let mut w = wave();
        let kwargs = HashMap::new();
        for _ in 0..6 {
            w.execute(&kwargs).unwrap();
        }
        assert_eq!(w.get_attribute("out"), Some(1.0));
    }

    #[test]
    fn rejects_an_empty_wave_list() {
        let args: Map<String, Value> = [("wave_list".to_string(), json!([]))].into_iter().collect();
        assert!(construct(1.0, &args).is_err());
    }
}
