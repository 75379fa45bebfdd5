//! Type name → constructor registry.
//!
//! Three disjoint namespaces (algorithms, models, pure functions). The
//! first two are case-insensitive on lookup (type names are upper-cased
//! before storing or looking them up); functions are case-sensitive.

use crate::instance::ProgramInstance;
use cyclesim_common::{EngineError, EngineResult};
use cyclesim_dsl::functions::{self, BuiltinFn};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Builds one boxed [`ProgramInstance`] from a cycle time and its
/// declared init arguments.
pub type Constructor = fn(f64, &Map<String, Value>) -> EngineResult<Box<dyn ProgramInstance>>;

/// Holds the three namespaces program construction and expression
/// evaluation draw from.
#[derive(Default)]
pub struct InstanceRegistry {
    algorithms: HashMap<String, Constructor>,
    models: HashMap<String, Constructor>,
    functions: HashMap<String, BuiltinFn>,
}

impl InstanceRegistry {
    /// An empty registry with the fixed built-in function set pre-seeded
    /// (no algorithms/models registered — see `cyclesim_programs::register_defaults`).
    #[must_use]
    pub fn new() -> Self {
        let mut functions = HashMap::new();
        for name in cyclesim_dsl::functions::BUILTIN_NAMES {
            if let Some(f) = functions::lookup(name) {
                functions.insert((*name).to_string(), f);
            }
        }
        Self {
            algorithms: HashMap::new(),
            models: HashMap::new(),
            functions,
        }
    }

    /// Register an algorithm type constructor under `type_name`
    /// (case-insensitive). Registering the same name twice replaces the
    /// earlier constructor, matching the source's plain dict assignment.
    pub fn register_algorithm(&mut self, type_name: &str, ctor: Constructor) {
        self.algorithms.insert(type_name.to_ascii_uppercase(), ctor);
    }

    /// Register a model type constructor under `type_name` (case-insensitive).
    pub fn register_model(&mut self, type_name: &str, ctor: Constructor) {
        self.models.insert(type_name.to_ascii_uppercase(), ctor);
    }

    /// Register (or override) a pure function under `name` (case-sensitive).
    pub fn register_function(&mut self, name: &str, f: BuiltinFn) {
        self.functions.insert(name.to_string(), f);
    }

    /// Look up a constructor by type name, checking algorithms then models.
    pub fn lookup_constructor(&self, type_name: &str) -> EngineResult<Constructor> {
        let key = type_name.to_ascii_uppercase();
        self.algorithms
            .get(&key)
            .or_else(|| self.models.get(&key))
            .copied()
            .ok_or_else(|| {
                EngineError::config(format!("unknown instance type '{type_name}'"))
            })
    }

    /// Look up a pure function by name (case-sensitive).
    #[must_use]
    pub fn lookup_function(&self, name: &str) -> Option<BuiltinFn> {
        self.functions.get(name).copied()
    }

    /// True if `name` is a registered algorithm type (case-insensitive).
    #[must_use]
    pub fn is_algorithm(&self, type_name: &str) -> bool {
        self.algorithms.contains_key(&type_name.to_ascii_uppercase())
    }

    /// True if `name` is a registered model type (case-insensitive).
    #[must_use]
    pub fn is_model(&self, type_name: &str) -> bool {
        self.models.contains_key(&type_name.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_ctor(_cycle_time: f64, _args: &Map<String, Value>) -> EngineResult<Box<dyn ProgramInstance>> {
        Err(EngineError::config("dummy"))
    }

    #[test]
    fn new_registry_has_every_builtin_function() {
        let reg = InstanceRegistry::new();
        assert!(reg.lookup_function("sqrt").is_some());
        assert!(reg.lookup_function("nonexistent").is_none());
    }

    #[test]
    fn algorithm_lookup_is_case_insensitive() {
        let mut reg = InstanceRegistry::new();
        reg.register_algorithm("PID", dummy_ctor);
        assert!(reg.lookup_constructor("pid").is_ok());
        assert!(reg.lookup_constructor("Pid").is_ok());
        assert!(reg.is_algorithm("pid"));
    }

    #[test]
    fn unknown_type_is_a_config_error() {
        let reg = InstanceRegistry::new();
        assert!(reg.lookup_constructor("NOPE").is_err());
    }

    #[test]
    fn function_lookup_is_case_sensitive() {
        let reg = InstanceRegistry::new();
        assert!(reg.lookup_function("sqrt").is_some());
        assert!(reg.lookup_function("SQRT").is_none());
    }
}
