#![doc = "Restricted arithmetic expression DSL for the cyclesim engine."]

pub mod ast;
pub mod eval;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod value;

pub use ast::{BinOp, Expr, KwArg, Span, Stmt, UnaryOp};
pub use eval::{eval, EvalContext};
pub use functions::BuiltinFn;
pub use value::Value;
