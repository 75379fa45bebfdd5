//! The `Value` tagged union produced by reference-position evaluation.
//!
//! The source this engine is distilled from represents variable and
//! attribute access with operator-overloaded proxy objects that coerce to
//! a scalar lazily. This implementation instead resolves a reference
//! expression (the base of a `Sub` node, or a bare `Name`/`Attr`) to one
//! of three concrete cases up front, and only reduces it to a scalar when
//! an arithmetic context actually needs a number. Keeping the reference
//! alive this way is what lets `Sub` evaluation look up lag history
//! instead of the current value.

use crate::eval::EvalContext;
use cyclesim_common::EngineResult;

/// A resolved but not-yet-reduced expression value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An already-computed number (literal, arithmetic result, function
    /// call result).
    Scalar(f64),
    /// A reference to a plain variable by name.
    VarRef(String),
    /// A reference to a stored instance attribute, `instance.attr`.
    AttrRef(String, String),
}

impl Value {
    /// Reduce to the current scalar value, resolving variable/attribute
    /// references against `ctx`.
    pub fn current(&self, ctx: &dyn EvalContext) -> EngineResult<f64> {
        match self {
            Value::Scalar(v) => Ok(*v),
            Value::VarRef(name) => Ok(ctx.get_variable(name)),
            Value::AttrRef(instance, attr) => ctx.get_attr(instance, attr),
        }
    }

    /// Reduce to the scalar value `k` cycles ago, resolving against `ctx`.
    pub fn lagged(&self, k: i64, ctx: &dyn EvalContext) -> EngineResult<f64> {
        match self {
            Value::Scalar(v) => Ok(*v),
            Value::VarRef(name) => Ok(ctx.get_variable_lag(name, k)),
            Value::AttrRef(instance, attr) => ctx.get_attr_lag(instance, attr, k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeCtx {
        vars: HashMap<String, f64>,
    }

    impl EvalContext for FakeCtx {
        fn is_instance(&self, _name: &str) -> bool {
            false
        }
        fn get_variable(&self, name: &str) -> f64 {
            *self.vars.get(name).unwrap_or(&0.0)
        }
        fn get_variable_lag(&self, name: &str, k: i64) -> f64 {
            self.get_variable(name) + k as f64
        }
        fn get_attr(&self, _instance: &str, _attr: &str) -> EngineResult<f64> {
            Ok(0.0)
        }
        fn get_attr_lag(&self, _instance: &str, _attr: &str, _k: i64) -> EngineResult<f64> {
            Ok(0.0)
        }
        fn lookup_function(&self, _name: &str) -> Option<crate::functions::BuiltinFn> {
            None
        }
    }

    #[test]
    fn scalar_reduces_to_itself() {
        let ctx = FakeCtx {
            vars: HashMap::new(),
        };
        assert_eq!(Value::Scalar(4.0).current(&ctx).unwrap(), 4.0);
    }

    #[test]
    fn var_ref_resolves_against_context() {
        let mut vars = HashMap::new();
        vars.insert("v1".to_string(), 7.0);
        let ctx = FakeCtx { vars };
        assert_eq!(Value::VarRef("v1".into()).current(&ctx).unwrap(), 7.0);
    }
}
