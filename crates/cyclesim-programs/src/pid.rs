//! PID controller.
//!
//! Textbook position-form PID with clamped output and no anti-windup
//! beyond the output clamp itself.

use crate::args::get_f64;
use cyclesim_common::EngineResult;
use cyclesim_runtime::ProgramInstance;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A PID controller instance.
///
/// `pb`/`ti`/`td` are proportional band, integral time, and derivative
/// time; `h`/`l` clamp the manipulated variable. Setting `ti` to `0.0`
/// disables the integral term entirely, matching the source's
/// `if self.ti > 0` guard rather than dividing by it.
pub struct Pid {
    mv: f64,
    pv: f64,
    sv: f64,
    pb: f64,
    ti: f64,
    td: f64,
    h: f64,
    l: f64,
    last_error: f64,
    integral: f64,
    cycle_time: f64,
}

/// Construct a [`Pid`] from its declared init arguments.
pub fn construct(cycle_time: f64, args: &Map<String, Value>) -> EngineResult<Box<dyn ProgramInstance>> {
    Ok(Box::new(Pid {
        mv: 0.0,
        pv: get_f64(args, "pv", 0.0)?,
        sv: get_f64(args, "sv", 0.0)?,
        pb: get_f64(args, "pb", 1.0)?,
        ti: get_f64(args, "ti", 1.0)?,
        td: get_f64(args, "td", 0.0)?,
        h: get_f64(args, "h", 100.0)?,
        l: get_f64(args, "l", 0.0)?,
        last_error: 0.0,
        integral: 0.0,
        cycle_time,
    }))
}

impl ProgramInstance for Pid {
    fn execute(&mut self, kwargs: &HashMap<String, f64>) -> EngineResult<()> {
        if let Some(&pv) = kwargs.get("pv") {
            self.pv = pv;
        }
        if let Some(&sv) = kwargs.get("sv") {
            self.sv = sv;
        }
        let error = self.sv - self.pv;
        let p_term = self.pb * error;
        self.integral += error * self.cycle_time;
        let i_term = if self.ti > 0.0 {
            self.pb / self.ti * self.integral
        } else {
            0.0
        };
        let d_term = self.pb * self.td * (error - self.last_error) / self.cycle_time;
        self.last_error = error;
        self.mv = (p_term + i_term + d_term).clamp(self.l, self.h);
        Ok(())
    }

    fn stored_attributes(&self) -> &[&'static str] {
        &["mv", "pv", "sv", "pb", "ti", "td", "h", "l"]
    }

    fn get_attribute(&self, name: &str) -> Option<f64> {
        match name {
            "mv" => Some(self.mv),
            "pv" => Some(self.pv),
            "sv" => Some(self.sv),
            "pb" => Some(self.pb),
            "ti" => Some(self.ti),
            "td" => Some(self.td),
            "h" => Some(self.h),
            "l" => Some(self.l),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn proportional_only_tracks_error() {
        let args: Map<String, Value> = [
            ("pb".to_string(), json!(2.0)),
            ("ti".to_string(), json!(0.0)),
            ("td".to_string(), json!(0.0)),
            ("h".to_string(), json!(100.0)),
            ("l".to_string(), json!(-100.0)),
        ]
        .into_iter()
        .collect();
        let instance = construct(1.0, &args).unwrap();
        let mut instance = instance;
        let mut kwargs = HashMap::new();
        kwargs.insert("pv".to_string(), 0.0);
        kwargs.insert("sv".to_string(), 10.0);
        instance.execute(&kwargs).unwrap();
        assert_eq!(instance.get_attribute("mv"), Some(20.0));
    }

    #[test]
    fn output_is_clamped_to_h_and_l() {
        let args: Map<String, Value> = [
            ("pb".to_string(), json!(100.0)),
            ("ti".to_string(), json!(0.0)),
            ("td".to_string(), json!(0.0)),
            ("h".to_string(), json!(50.0)),
            ("l".to_string(), json!(0.0)),
        ]
        .into_iter()
        .collect();
        let mut instance = construct(1.0, &args).unwrap();
        let mut kwargs = HashMap::new();
        kwargs.insert("pv".to_string(), 0.0);
        kwargs.insert("sv".to_string(), 10.0);
        instance.execute(&kwargs).unwrap();
        assert_eq!(instance.get_attribute("mv"), Some(50.0));
    }
}
