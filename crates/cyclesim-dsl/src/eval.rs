//! Tree-walking evaluator.
//!
//! Variable references, instance attribute lookups, and bare instance
//! names each resolve to one of the three [`crate::value::Value`]
//! variants, against an [`EvalContext`] the runtime crate implements over
//! its concrete `VariableStore` and instance map. A bare instance name in
//! expression position resolves inline to that instance's `out`
//! attribute rather than through a separate rewrite pass. Keeping this
//! trait in the DSL crate (instead of depending on `cyclesim-runtime`
//! directly) is what lets the DSL be unit-tested with a fake context and
//! reused by anything that can supply one.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::functions::BuiltinFn;
use crate::value::Value;
use cyclesim_common::{EngineError, EngineResult};

/// Everything the evaluator needs from the host to resolve names.
///
/// Implementations own the actual variable store and instance registry;
/// this trait only exposes the read operations expression evaluation
/// needs. All methods return the engine's default of `0.0` for a variable
/// that has never been written, matching the store's auto-materializing
/// `get(name, default)` contract — only attribute access against an
/// *unknown instance* is an error.
pub trait EvalContext {
    /// True if `name` is a live instance in the current program.
    fn is_instance(&self, name: &str) -> bool;

    /// Current value of a plain variable, or `0.0` if never set.
    fn get_variable(&self, name: &str) -> f64;

    /// Value of a plain variable `k` cycles ago, or `0.0` if unavailable.
    fn get_variable_lag(&self, name: &str, k: i64) -> f64;

    /// Current value of `instance.attr`. An unknown instance is an error;
    /// an attribute not present on the instance returns `0.0`.
    fn get_attr(&self, instance: &str, attr: &str) -> EngineResult<f64>;

    /// Value of `instance.attr` lagged by `k` cycles.
    fn get_attr_lag(&self, instance: &str, attr: &str, k: i64) -> EngineResult<f64>;

    /// Resolve a built-in function by name.
    fn lookup_function(&self, name: &str) -> Option<BuiltinFn>;
}

/// Evaluate `expr` to a scalar against `ctx`.
///
/// A bare instance name in value position (not a method receiver, not
/// already under attribute access, not a function callee) is resolved
/// to that instance's default `out` attribute, matching the source's
/// `InstanceNameTransformer` rewrite — done here contextually, against
/// `ctx.is_instance`, rather than as a separate AST pass, since the full
/// instance set is only known once every program item is resolved.
pub fn eval(expr: &Expr, ctx: &dyn EvalContext) -> EngineResult<f64> {
    eval_ref(expr, ctx)?.current(ctx)
}

/// Evaluate `expr` to an unreduced [`Value`], preserving variable/attribute
/// identity so a surrounding `Sub` can do a lag lookup instead of reading
/// the current value.
fn eval_ref(expr: &Expr, ctx: &dyn EvalContext) -> EngineResult<Value> {
    match expr {
        Expr::Number(n, _) => Ok(Value::Scalar(*n)),
        Expr::Name(name, _) => {
            if ctx.is_instance(name) {
                // A bare instance name in expression position reads its
                // default output attribute.
                Ok(Value::AttrRef(name.clone(), "out".to_string()))
            } else {
                Ok(Value::VarRef(name.clone()))
            }
        }
        Expr::Attr { base, attr, span } => match base.as_ref() {
            Expr::Name(inst_name, _) => {
                if ctx.is_instance(inst_name) {
                    Ok(Value::AttrRef(inst_name.clone(), attr.clone()))
                } else {
                    Err(EngineError::expression(
                        format!("'{inst_name}' is not a known instance"),
                        span_text(*span, expr),
                    ))
                }
            }
            _ => Err(EngineError::expression(
                "attribute access requires an instance name as its base",
                span_text(*span, expr),
            )),
        },
        Expr::Sub { base, index, span } => {
            let base_val = eval_ref(base, ctx)?;
            if matches!(base_val, Value::Scalar(_)) {
                return Err(EngineError::expression(
                    "cannot subscript a scalar value",
                    span_text(*span, expr),
                ));
            }
            let idx = eval(index, ctx)?;
            let k = idx.abs().round() as i64;
            Ok(Value::Scalar(base_val.lagged(k, ctx)?))
        }
        Expr::Call {
            callee,
            args,
            kwargs,
            span,
        } => {
            if !kwargs.is_empty() {
                return Err(EngineError::expression(
                    "keyword arguments are only permitted in an AlgorithmNode's `execute(...)` call, not in a value expression",
                    span_text(*span, expr),
                ));
            }
            match callee.as_ref() {
                Expr::Name(fname, _) => match ctx.lookup_function(fname) {
                    Some(f) => {
                        let argv = args
                            .iter()
                            .map(|a| eval(a, ctx))
                            .collect::<EngineResult<Vec<f64>>>()?;
                        Ok(Value::Scalar(f(&argv)?))
                    }
                    None => Err(EngineError::expression(
                        format!("unknown function '{fname}'"),
                        span_text(*span, expr),
                    )),
                },
                Expr::Attr { .. } => Err(EngineError::expression(
                    "method calls are not permitted in a value expression",
                    span_text(*span, expr),
                )),
                _ => Err(EngineError::expression(
                    "call target must be a function name",
                    span_text(*span, expr),
                )),
            }
        }
        Expr::BinOp {
            left, op, right, ..
        } => {
            let l = eval(left, ctx)?;
            let r = eval(right, ctx)?;
            let value = match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => {
                    if r == 0.0 {
                        return Err(EngineError::expression(
                            "division by zero",
                            format!("{left} / {right}"),
                        ));
                    }
                    l / r
                }
            };
            Ok(Value::Scalar(value))
        }
        Expr::UnaryOp { op, operand, .. } => {
            let v = eval(operand, ctx)?;
            let value = match op {
                UnaryOp::Plus => v,
                UnaryOp::Neg => -v,
            };
            Ok(Value::Scalar(value))
        }
        Expr::Paren(inner, _) => eval_ref(inner, ctx),
    }
}

fn span_text(_span: crate::ast::Span, expr: &Expr) -> String {
    expr.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions;
    use crate::parser::parse_expr;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct TestCtx {
        vars: RefCell<HashMap<String, f64>>,
        instances: HashMap<String, HashMap<String, f64>>,
    }

    impl EvalContext for TestCtx {
        fn is_instance(&self, name: &str) -> bool {
            self.instances.contains_key(name)
        }
        fn get_variable(&self, name: &str) -> f64 {
            *self.vars.borrow().get(name).unwrap_or(&0.0)
        }
        fn get_variable_lag(&self, name: &str, k: i64) -> f64 {
            self.get_variable(name) - k as f64
        }
        fn get_attr(&self, instance: &str, attr: &str) -> EngineResult<f64> {
            self.instances
                .get(instance)
                .map(|attrs| *attrs.get(attr).unwrap_or(&0.0))
                .ok_or_else(|| EngineError::expression("unknown instance", instance))
        }
        fn get_attr_lag(&self, instance: &str, attr: &str, k: i64) -> EngineResult<f64> {
            Ok(self.get_attr(instance, attr)? - k as f64)
        }
        fn lookup_function(&self, name: &str) -> Option<BuiltinFn> {
            functions::lookup(name)
        }
    }

    fn ctx() -> TestCtx {
        let mut vars = HashMap::new();
        vars.insert("v1".to_string(), 5.0);
        let mut tank1 = HashMap::new();
        tank1.insert("level".to_string(), 3.0);
        tank1.insert("out".to_string(), 3.0);
        let mut instances = HashMap::new();
        instances.insert("tank1".to_string(), tank1);
        TestCtx {
            vars: RefCell::new(vars),
            instances,
        }
    }

    #[test]
    fn evaluates_plain_arithmetic() {
        let c = ctx();
        let e = parse_expr("1 + 2 * 3").unwrap();
        assert_eq!(eval(&e, &c).unwrap(), 7.0);
    }

    #[test]
    fn evaluates_variable_reference() {
        let c = ctx();
        let e = parse_expr("v1 * 2").unwrap();
        assert_eq!(eval(&e, &c).unwrap(), 10.0);
    }

    #[test]
    fn evaluates_instance_attribute() {
        let c = ctx();
        let e = parse_expr("tank1.level + 1").unwrap();
        assert_eq!(eval(&e, &c).unwrap(), 4.0);
    }

    #[test]
    fn evaluates_lagged_access() {
        let c = ctx();
        let e = parse_expr("v1[-2]").unwrap();
        assert_eq!(eval(&e, &c).unwrap(), 3.0);
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let c = ctx();
        let e = parse_expr("v1 / 0").unwrap();
        assert!(eval(&e, &c).is_err());
    }

    #[test]
    fn unknown_instance_attribute_is_an_error() {
        let c = ctx();
        let e = parse_expr("nope.level").unwrap();
        assert!(eval(&e, &c).is_err());
    }

    #[test]
    fn builtin_function_call_works() {
        let c = ctx();
        let e = parse_expr("sqrt(v1 + 4)").unwrap();
        assert_eq!(eval(&e, &c).unwrap(), 3.0);
    }

    #[test]
    fn method_call_in_value_position_is_rejected() {
        let c = ctx();
        let e = parse_expr("tank1.execute(valve_opening=1)").unwrap();
        assert!(eval(&e, &c).is_err());
    }
}
