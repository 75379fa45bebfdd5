//! The `ProgramInstance` lifecycle contract.
//!
//! Construct with `cycle_time` plus init kwargs, `execute` updates
//! internal state and attributes each cycle, `stored_attributes` declares
//! the projection set published to collaborators. A small required
//! surface with default methods where one makes sense.

use cyclesim_common::EngineResult;
use std::collections::HashMap;

/// A concrete algorithm or model instance driven once per cycle.
///
/// Implementations own their own internal state (integrators, phase
/// counters, etc.) privately; only the attributes named by
/// [`ProgramInstance::stored_attributes`] are visible to the engine and
/// projected into the variable store.
pub trait ProgramInstance {
    /// Advance the instance by one cycle, given the resolved keyword
    /// arguments from its `execute(...)` call in the program text.
    fn execute(&mut self, kwargs: &HashMap<String, f64>) -> EngineResult<()>;

    /// Names of the attributes the engine projects into the variable
    /// store as `<instance_name>.<attr>` after every `execute`.
    fn stored_attributes(&self) -> &[&'static str];

    /// Read a stored attribute's current value. Returns `None` for a
    /// name not in `stored_attributes()`.
    fn get_attribute(&self, name: &str) -> Option<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        value: f64,
    }

    impl ProgramInstance for Counter {
        fn execute(&mut self, kwargs: &HashMap<String, f64>) -> EngineResult<()> {
            self.value += kwargs.get("step").copied().unwrap_or(1.0);
            Ok(())
        }

        fn stored_attributes(&self) -> &[&'static str] {
            &["value"]
        }

        fn get_attribute(&self, name: &str) -> Option<f64> {
            match name {
                "value" => Some(self.value),
                _ => None,
            }
        }
    }

    #[test]
    fn execute_mutates_state_and_attribute_is_visible() {
        let mut c = Counter { value: 0.0 };
        let mut kwargs = HashMap::new();
        kwargs.insert("step".to_string(), 2.0);
        c.execute(&kwargs).unwrap();
        assert_eq!(c.get_attribute("value"), Some(2.0));
        assert_eq!(c.get_attribute("unknown"), None);
    }
}
