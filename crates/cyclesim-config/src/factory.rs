//! Builds live program instances from parsed configuration items.
//!
//! Looks up the item's type in the registry (rejecting `VARIABLE`, which
//! never names an instance), invokes the constructor with the shared
//! cycle time plus the item's init args, and keeps the result addressable
//! by name.

use crate::schema::{init_args_to_json, ProgramItemDoc};
use cyclesim_common::{EngineError, EngineResult};
use cyclesim_runtime::{InstanceRegistry, ProgramInstance};
use std::collections::HashMap;

/// Constructs and owns one [`ProgramInstance`] per non-`VARIABLE` item.
pub struct InstanceFactory {
    cycle_time: f64,
    instances: HashMap<String, Box<dyn ProgramInstance>>,
}

impl InstanceFactory {
    /// A factory that injects `cycle_time` into every instance it builds.
    #[must_use]
    pub fn new(cycle_time: f64) -> Self {
        Self {
            cycle_time,
            instances: HashMap::new(),
        }
    }

    /// Build (or return the already-built) instance for `item`.
    ///
    /// `VARIABLE` items never reach this: the loader routes them to
    /// `ExpressionNode` construction directly.
    pub fn create_instance(&mut self, item: &ProgramItemDoc, registry: &InstanceRegistry) -> EngineResult<()> {
        if item.item_type.eq_ignore_ascii_case("VARIABLE") {
            return Err(EngineError::config(format!(
                "'{}' is a VARIABLE item and does not need an instance",
                item.name
            )));
        }
        if self.instances.contains_key(&item.name) {
            return Ok(());
        }
        let ctor = registry.lookup_constructor(&item.item_type)?;
        let args = init_args_to_json(&item.init_args)?;
        let instance = ctor(self.cycle_time, &args)?;
        self.instances.insert(item.name.clone(), instance);
        Ok(())
    }

    /// Consume the factory, handing its instance map to the engine.
    #[must_use]
    pub fn into_instances(self) -> HashMap<String, Box<dyn ProgramInstance>> {
        self.instances
    }

    /// Names of every instance built so far, sorted.
    #[must_use]
    pub fn list_instances(&self) -> Vec<String> {
        let mut names: Vec<String> = self.instances.keys().cloned().collect();
        names.sort();
        names
    }
}
