//! Typed AST for the restricted arithmetic expression grammar.
//!
//! The grammar is intentionally small: numeric literals, identifiers,
//! attribute access, subscript (lag) access, calls with positional and
//! keyword arguments, binary/unary arithmetic, grouping, and a single
//! top-level assignment form. See [`crate::parser`] for the parser that
//! produces these nodes and is the only thing that may construct them.

use std::fmt;

/// Source span, byte-offset based, used for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Construct a span covering `[start, end)`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Merge two spans into one covering both.
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        };
        f.write_str(s)
    }
}

/// A unary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Unary `+`.
    Plus,
    /// Unary `-`.
    Neg,
}

/// A keyword argument in a call: `name = expr`.
#[derive(Debug, Clone, PartialEq)]
pub struct KwArg {
    /// Argument name.
    pub name: String,
    /// Argument value expression.
    pub value: Expr,
}

/// An expression node.
///
/// Exactly the node kinds in the grammar: `Number`, `Name`, `Attr`, `Sub`,
/// `Call`, `BinOp`, `UnaryOp`, and `Paren`. There is no other variant to
/// construct, so a parser that only emits these can never produce a
/// disallowed AST shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A floating-point literal.
    Number(f64, Span),
    /// A bare identifier.
    Name(String, Span),
    /// `base.attr`
    Attr {
        /// The base expression.
        base: Box<Expr>,
        /// Attribute identifier.
        attr: String,
        /// Span of the whole expression.
        span: Span,
    },
    /// `base[index]`
    Sub {
        /// The base expression.
        base: Box<Expr>,
        /// Index expression (meaningful only for negative integer literals).
        index: Box<Expr>,
        /// Span of the whole expression.
        span: Span,
    },
    /// `callee(args, kwargs)`
    Call {
        /// Callee expression.
        callee: Box<Expr>,
        /// Positional arguments.
        args: Vec<Expr>,
        /// Keyword arguments.
        kwargs: Vec<KwArg>,
        /// Span of the whole expression.
        span: Span,
    },
    /// `left op right`
    BinOp {
        /// Left-hand operand.
        left: Box<Expr>,
        /// The operator.
        op: BinOp,
        /// Right-hand operand.
        right: Box<Expr>,
        /// Span of the whole expression.
        span: Span,
    },
    /// `op operand`
    UnaryOp {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
        /// Span of the whole expression.
        span: Span,
    },
    /// `(inner)`
    Paren(Box<Expr>, Span),
}

impl Expr {
    /// The span covering this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(_, s) => *s,
            Expr::Name(_, s) => *s,
            Expr::Attr { span, .. } => *span,
            Expr::Sub { span, .. } => *span,
            Expr::Call { span, .. } => *span,
            Expr::BinOp { span, .. } => *span,
            Expr::UnaryOp { span, .. } => *span,
            Expr::Paren(_, s) => *s,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n, _) => write!(f, "{n}"),
            Expr::Name(n, _) => write!(f, "{n}"),
            Expr::Attr { base, attr, .. } => write!(f, "{base}.{attr}"),
            Expr::Sub { base, index, .. } => write!(f, "{base}[{index}]"),
            Expr::Call {
                callee,
                args,
                kwargs,
                ..
            } => {
                write!(f, "{callee}(")?;
                let mut first = true;
                for a in args {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                    first = false;
                }
                for kw in kwargs {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", kw.name, kw.value)?;
                    first = false;
                }
                write!(f, ")")
            }
            Expr::BinOp {
                left, op, right, ..
            } => write!(f, "{left} {op} {right}"),
            Expr::UnaryOp { op, operand, .. } => {
                let sign = match op {
                    UnaryOp::Plus => "+",
                    UnaryOp::Neg => "-",
                };
                write!(f, "{sign}{operand}")
            }
            Expr::Paren(inner, _) => write!(f, "({inner})"),
        }
    }
}

/// A parsed top-level statement: either a bare expression, or an
/// assignment `name = expr` used by `ExpressionNode`'s declaration form.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `name = expr`
    Assign {
        /// Target variable name.
        target: String,
        /// Right-hand side expression.
        value: Expr,
    },
    /// A bare expression with no assignment target.
    Expr(Expr),
}
