//! Static lag analysis.
//!
//! A plain recursive walk over the typed `cyclesim_dsl::ast::Expr` tree,
//! collecting the deepest negative subscript referenced against each
//! variable so the store can provision history buffers up front.

use cyclesim_dsl::ast::Expr;
use std::collections::HashMap;

/// Walk every expression in `exprs`, accumulating the maximum negative
/// subscript magnitude seen per base name.
///
/// Only `Sub` nodes whose index is a literal negative integer (`-k`, k >
/// 0, possibly wrapped in parens) count as a lag reference; any other
/// subscript shape is skipped, matching the source's "anything else:
/// not a history reference" fallthrough.
#[must_use]
pub fn analyze<'a>(exprs: impl IntoIterator<Item = &'a Expr>) -> HashMap<String, i64> {
    let mut requirements: HashMap<String, i64> = HashMap::new();
    for expr in exprs {
        walk(expr, &mut requirements);
    }
    requirements
}

fn walk(expr: &Expr, out: &mut HashMap<String, i64>) {
    match expr {
        Expr::Number(..) | Expr::Name(..) => {}
        Expr::Attr { base, .. } => walk(base, out),
        Expr::Sub { base, index, .. } => {
            if let (Some(name), Some(k)) = (base_name(base), literal_negative_lag(index)) {
                let entry = out.entry(name).or_insert(0);
                *entry = (*entry).max(k);
            }
            walk(base, out);
            walk(index, out);
        }
        Expr::Call { callee, args, kwargs, .. } => {
            walk(callee, out);
            for a in args {
                walk(a, out);
            }
            for kw in kwargs {
                walk(&kw.value, out);
            }
        }
        Expr::BinOp { left, right, .. } => {
            walk(left, out);
            walk(right, out);
        }
        Expr::UnaryOp { operand, .. } => walk(operand, out),
        Expr::Paren(inner, _) => walk(inner, out),
    }
}

/// Extract the lag-reference base name: a bare identifier, or
/// `instance.attr` for an attribute chain one level deep.
fn base_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Name(name, _) => Some(name.clone()),
        Expr::Attr { base, attr, .. } => match base.as_ref() {
            Expr::Name(name, _) => Some(format!("{name}.{attr}")),
            _ => None,
        },
        _ => None,
    }
}

/// If `expr` is a literal negative integer (`-k`, possibly parenthesized),
/// return `k` (positive). Anything else — a variable, a computed
/// expression, a positive literal — is not a lag reference.
fn literal_negative_lag(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::UnaryOp {
            op: cyclesim_dsl::ast::UnaryOp::Neg,
            operand,
            ..
        } => match operand.as_ref() {
            Expr::Number(n, _) if *n > 0.0 && n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        },
        Expr::Paren(inner, _) => literal_negative_lag(inner),
        _ => None,
    }
}
