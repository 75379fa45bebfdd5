//! Cycle-driven program nodes.
//!
//! Both node kinds parse their expression exactly once, at construction
//! time, and step from a stored sub-AST rather than reparsing on every
//! cycle.

use crate::eval_context::EngineEvalContext;
use crate::instance::ProgramInstance;
use crate::variable_store::VariableStore;
use cyclesim_common::{EngineError, EngineResult};
use cyclesim_dsl::ast::{Expr, KwArg, Stmt};
use cyclesim_dsl::{eval, parser};
use std::collections::HashMap;

/// Wraps one `ProgramInstance` plus its parsed keyword-argument
/// sub-expressions.
pub struct AlgorithmNode {
    /// Name of the instance this node drives, e.g. `"pid1"`.
    pub instance_name: String,
    /// Parsed `name -> subExpression` keyword map, in declaration order.
    pub kwargs: Vec<(String, Expr)>,
}

impl AlgorithmNode {
    /// Parse `source`; it must be a call of the shape
    /// `instance.execute(k1=e1, k2=e2, ...)` with no positional arguments.
    pub fn parse(source: &str) -> EngineResult<Self> {
        let expr = parser::parse_expr(source)?;
        let Expr::Call {
            callee,
            args,
            kwargs,
            ..
        } = expr
        else {
            return Err(EngineError::expression(
                "an algorithm node's expression must be an instance method call",
                source,
            ));
        };
        if !args.is_empty() {
            return Err(EngineError::expression(
                "algorithm node calls accept only keyword arguments",
                source,
            ));
        }
        let Expr::Attr { base, attr, .. } = *callee else {
            return Err(EngineError::expression(
                "an algorithm node's call target must be `instance.execute`",
                source,
            ));
        };
        if attr != "execute" {
            return Err(EngineError::expression(
                format!("expected a call to `execute`, found `{attr}`"),
                source,
            ));
        }
        let Expr::Name(instance_name, _) = *base else {
            return Err(EngineError::expression(
                "an algorithm node's receiver must be a bare instance name",
                source,
            ));
        };
        let kwargs = kwargs
            .into_iter()
            .map(|KwArg { name, value }| (name, value))
            .collect();
        Ok(Self {
            instance_name,
            kwargs,
        })
    }

    /// Evaluate the keyword sub-expressions against `ctx`, producing the
    /// scalar map to pass to `execute`.
    pub fn resolve_kwargs(&self, ctx: &EngineEvalContext<'_>) -> EngineResult<HashMap<String, f64>> {
        self.kwargs
            .iter()
            .map(|(name, expr)| Ok((name.clone(), eval::eval(expr, ctx)?)))
            .collect()
    }

    /// Project an instance's declared stored attributes into the store
    /// under `<instance_name>.<attr>`.
    pub fn project_stored_attributes(&self, instance: &dyn ProgramInstance, store: &mut VariableStore) {
        for attr in instance.stored_attributes() {
            if let Some(v) = instance.get_attribute(attr) {
                store.set(&format!("{}.{attr}", self.instance_name), v);
            }
        }
    }
}

/// Wraps a name and a parsed arithmetic expression evaluated every cycle.
pub struct ExpressionNode {
    /// The variable name this node writes to.
    pub name: String,
    /// The parsed right-hand-side expression.
    pub expr: Expr,
}

impl ExpressionNode {
    /// Parse `source` as `name = expr` or a bare `expr`. When an
    /// assignment target is present, it must equal `declared_name`.
    pub fn parse(declared_name: &str, source: &str) -> EngineResult<Self> {
        let stmt = parser::parse_stmt(source)?;
        let expr = match stmt {
            Stmt::Assign { target, value } => {
                if target != declared_name {
                    return Err(EngineError::expression(
                        format!(
                            "assignment target `{target}` does not match the declared name `{declared_name}`"
                        ),
                        source,
                    ));
                }
                value
            }
            Stmt::Expr(value) => value,
        };
        Ok(Self {
            name: declared_name.to_string(),
            expr,
        })
    }

    /// Evaluate the expression against `ctx`, returning the scalar result.
    ///
    /// Takes `ctx` rather than a `&mut VariableStore` directly because
    /// `ctx` already holds an immutable borrow of the store; the caller
    /// writes the result back after `ctx` goes out of scope.
    pub fn eval_value(&self, ctx: &EngineEvalContext<'_>) -> EngineResult<f64> {
        eval::eval(&self.expr, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_node_parses_keyword_call() {
        let node = AlgorithmNode::parse("pid1.execute(pv=tank1.level, sv=sin1.out)").unwrap();
        assert_eq!(node.instance_name, "pid1");
        assert_eq!(node.kwargs.len(), 2);
        assert_eq!(node.kwargs[0].0, "pv");
    }

    #[test]
    fn algorithm_node_rejects_positional_args() {
        assert!(AlgorithmNode::parse("pid1.execute(1)").is_err());
    }

    #[test]
    fn algorithm_node_rejects_non_execute_method() {
        assert!(AlgorithmNode::parse("pid1.reset()").is_err());
    }

    #[test]
    fn algorithm_node_rejects_bare_expression() {
        assert!(AlgorithmNode::parse("1 + 1").is_err());
    }

    #[test]
    fn expression_node_accepts_matching_assignment_target() {
        let node = ExpressionNode::parse("v1", "v1 = tank1.level + 1").unwrap();
        assert_eq!(node.name, "v1");
    }

    #[test]
    fn expression_node_rejects_mismatched_assignment_target() {
        assert!(ExpressionNode::parse("v1", "v2 = 1").is_err());
    }

    #[test]
    fn expression_node_accepts_bare_expression_without_target() {
        let node = ExpressionNode::parse("v1", "tank1.level * 2").unwrap();
        assert_eq!(node.name, "v1");
    }
}
