//! Adapter wiring the concrete engine state into `cyclesim_dsl::EvalContext`.
//!
//! Each trait method resolves against the engine's actual
//! `VariableStore`, instance map, and function registry directly, with
//! no intermediate proxy objects.

use crate::instance::ProgramInstance;
use crate::registry::InstanceRegistry;
use crate::variable_store::VariableStore;
use cyclesim_common::{EngineError, EngineResult};
use cyclesim_dsl::eval::EvalContext;
use cyclesim_dsl::functions::BuiltinFn;
use std::collections::HashMap;

/// Borrowed view over the store, the live instance map, and the function
/// registry, sufficient to evaluate one expression.
pub struct EngineEvalContext<'a> {
    store: &'a VariableStore,
    instances: &'a HashMap<String, Box<dyn ProgramInstance>>,
    registry: &'a InstanceRegistry,
}

impl<'a> EngineEvalContext<'a> {
    /// Borrow the pieces needed to evaluate expressions this cycle.
    pub fn new(
        store: &'a VariableStore,
        instances: &'a HashMap<String, Box<dyn ProgramInstance>>,
        registry: &'a InstanceRegistry,
    ) -> Self {
        Self {
            store,
            instances,
            registry,
        }
    }
}

impl EvalContext for EngineEvalContext<'_> {
    fn is_instance(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    fn get_variable(&self, name: &str) -> f64 {
        self.store.get(name, 0.0)
    }

    fn get_variable_lag(&self, name: &str, k: i64) -> f64 {
        self.store.get_lag(name, k, 0.0)
    }

    fn get_attr(&self, instance: &str, attr: &str) -> EngineResult<f64> {
        let inst = self.instances.get(instance).ok_or_else(|| {
            EngineError::expression(
                format!("'{instance}' is not a known instance"),
                format!("{instance}.{attr}"),
            )
        })?;
        let key = format!("{instance}.{attr}");
        Ok(self
            .store
            .get_opt(&key)
            .unwrap_or_else(|| inst.get_attribute(attr).unwrap_or(0.0)))
    }

    fn get_attr_lag(&self, instance: &str, attr: &str, k: i64) -> EngineResult<f64> {
        if !self.instances.contains_key(instance) {
            return Err(EngineError::expression(
                format!("'{instance}' is not a known instance"),
                format!("{instance}.{attr}[-{k}]"),
            ));
        }
        let key = format!("{instance}.{attr}");
        Ok(self.store.get_lag(&key, k, 0.0))
    }

    fn lookup_function(&self, name: &str) -> Option<BuiltinFn> {
        self.registry.lookup_function(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclesim_dsl::eval::eval;
    use cyclesim_dsl::parser::parse_expr;

    struct Noop;
    impl ProgramInstance for Noop {
        fn execute(&mut self, _kwargs: &HashMap<String, f64>) -> EngineResult<()> {
            Ok(())
        }
        fn stored_attributes(&self) -> &[&'static str] {
            &["out"]
        }
        fn get_attribute(&self, name: &str) -> Option<f64> {
            (name == "out").then_some(42.0)
        }
    }

    #[test]
    fn falls_back_to_live_attribute_when_store_has_nothing() {
        let store = VariableStore::new();
        let mut instances: HashMap<String, Box<dyn ProgramInstance>> = HashMap::new();
        instances.insert("sin1".to_string(), Box::new(Noop));
        let registry = InstanceRegistry::new();
        let ctx = EngineEvalContext::new(&store, &instances, &registry);
        let e = parse_expr("sin1.out").unwrap();
        assert_eq!(eval(&e, &ctx).unwrap(), 42.0);
    }

    #[test]
    fn prefers_stored_value_once_written() {
        let mut store = VariableStore::new();
        store.set("sin1.out", 7.0);
        let mut instances: HashMap<String, Box<dyn ProgramInstance>> = HashMap::new();
        instances.insert("sin1".to_string(), Box::new(Noop));
        let registry = InstanceRegistry::new();
        let ctx = EngineEvalContext::new(&store, &instances, &registry);
        let e = parse_expr("sin1.out").unwrap();
        assert_eq!(eval(&e, &ctx).unwrap(), 7.0);
    }
}
