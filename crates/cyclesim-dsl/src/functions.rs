//! Built-in pure scalar functions available to the evaluator.
//!
//! Each function is a pure `fn(&[f64]) -> EngineResult<f64>` held by
//! reference in the lookup table; none hold state. Extends the source's
//! `abs_func`/`sqrt_func` pattern to the full built-in list, including the
//! hyperbolic trio the original registry never wired up but the
//! user-facing documentation for this DSL promises.

use cyclesim_common::{EngineError, EngineResult};

/// Signature shared by every built-in function.
pub type BuiltinFn = fn(&[f64]) -> EngineResult<f64>;

/// Every name [`lookup`] resolves, for registries that want to seed
/// themselves with the full built-in set up front.
pub const BUILTIN_NAMES: &[&str] = &[
    "abs", "fabs", "sqrt", "sin", "cos", "tan", "asin", "acos", "atan", "sinh", "cosh", "tanh",
    "log", "exp", "floor", "ceil", "min", "max",
];

/// Resolve a built-in function by name, or `None` if `name` is not one of
/// the fixed set this host provides.
pub fn lookup(name: &str) -> Option<BuiltinFn> {
    let f: BuiltinFn = match name {
        "abs" | "fabs" => fabs,
        "sqrt" => sqrt,
        "sin" => sin,
        "cos" => cos,
        "tan" => tan,
        "asin" => asin,
        "acos" => acos,
        "atan" => atan,
        "sinh" => sinh,
        "cosh" => cosh,
        "tanh" => tanh,
        "log" => log,
        "exp" => exp,
        "floor" => floor,
        "ceil" => ceil,
        "min" => min,
        "max" => max,
        _ => return None,
    };
    Some(f)
}

fn arity1(name: &str, args: &[f64]) -> EngineResult<f64> {
    match args {
        [x] => Ok(*x),
        _ => Err(EngineError::expression(
            format!("{name}() takes exactly one argument, got {}", args.len()),
            name,
        )),
    }
}

fn fabs(args: &[f64]) -> EngineResult<f64> {
    Ok(arity1("abs", args)?.abs())
}

fn sqrt(args: &[f64]) -> EngineResult<f64> {
    let x = arity1("sqrt", args)?;
    if x < 0.0 {
        return Err(EngineError::expression(
            format!("sqrt() rejects negative argument {x}"),
            "sqrt",
        ));
    }
    Ok(x.sqrt())
}

fn sin(args: &[f64]) -> EngineResult<f64> {
    Ok(arity1("sin", args)?.sin())
}

fn cos(args: &[f64]) -> EngineResult<f64> {
    Ok(arity1("cos", args)?.cos())
}

fn tan(args: &[f64]) -> EngineResult<f64> {
    Ok(arity1("tan", args)?.tan())
}

fn asin(args: &[f64]) -> EngineResult<f64> {
    Ok(arity1("asin", args)?.asin())
}

fn acos(args: &[f64]) -> EngineResult<f64> {
    Ok(arity1("acos", args)?.acos())
}

fn atan(args: &[f64]) -> EngineResult<f64> {
    Ok(arity1("atan", args)?.atan())
}

fn sinh(args: &[f64]) -> EngineResult<f64> {
    Ok(arity1("sinh", args)?.sinh())
}

fn cosh(args: &[f64]) -> EngineResult<f64> {
    Ok(arity1("cosh", args)?.cosh())
}

fn tanh(args: &[f64]) -> EngineResult<f64> {
    Ok(arity1("tanh", args)?.tanh())
}

fn log(args: &[f64]) -> EngineResult<f64> {
    let x = arity1("log", args)?;
    if x <= 0.0 {
        return Err(EngineError::expression(
            format!("log() rejects non-positive argument {x}"),
            "log",
        ));
    }
    Ok(x.ln())
}

fn exp(args: &[f64]) -> EngineResult<f64> {
    Ok(arity1("exp", args)?.exp())
}

fn floor(args: &[f64]) -> EngineResult<f64> {
    Ok(arity1("floor", args)?.floor())
}

fn ceil(args: &[f64]) -> EngineResult<f64> {
    Ok(arity1("ceil", args)?.ceil())
}

fn min(args: &[f64]) -> EngineResult<f64> {
    if args.len() < 2 {
        return Err(EngineError::expression(
            format!("min() takes at least two arguments, got {}", args.len()),
            "min",
        ));
    }
    Ok(args.iter().copied().fold(f64::INFINITY, f64::min))
}

fn max(args: &[f64]) -> EngineResult<f64> {
    if args.len() < 2 {
        return Err(EngineError::expression(
            format!("max() takes at least two arguments, got {}", args.len()),
            "max",
        ));
    }
    Ok(args.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_name_resolves() {
        for name in BUILTIN_NAMES {
            assert!(lookup(name).is_some(), "missing lookup for '{name}'");
        }
    }

    #[test]
    fn looks_up_known_names() {
        assert!(lookup("sqrt").is_some());
        assert!(lookup("sinh").is_some());
        assert!(lookup("nonexistent").is_none());
    }

    #[test]
    fn sqrt_rejects_negative_input() {
        let f = lookup("sqrt").unwrap();
        assert!(f(&[-1.0]).is_err());
        assert_eq!(f(&[4.0]).unwrap(), 2.0);
    }

    #[test]
    fn abs_and_fabs_are_aliases() {
        assert_eq!(lookup("abs").unwrap()(&[-3.0]).unwrap(), 3.0);
        assert_eq!(lookup("fabs").unwrap()(&[-3.0]).unwrap(), 3.0);
    }

    #[test]
    fn min_max_take_at_least_two_args() {
        assert!(lookup("min").unwrap()(&[1.0]).is_err());
        assert_eq!(lookup("min").unwrap()(&[1.0, 2.0, -3.0]).unwrap(), -3.0);
        assert_eq!(lookup("max").unwrap()(&[1.0, 2.0, -3.0]).unwrap(), 2.0);
    }

    #[test]
    fn log_rejects_non_positive() {
        assert!(lookup("log").unwrap()(&[0.0]).is_err());
        assert!(lookup("log").unwrap()(&[-1.0]).is_err());
    }
}
