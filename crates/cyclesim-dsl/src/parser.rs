//! Hand-written recursive-descent parser for the restricted arithmetic grammar.
//!
//! A grammar file (`pest`) was deliberately not used here: the grammar is
//! tiny and fixed, and a hand-written parser can only ever construct the
//! node kinds [`crate::ast::Expr`] defines, which gives the "whitelisted
//! AST" property for free instead of needing a post-hoc validation pass.
//!
//! ```text
//! Expr    := Number | Name | Attr | Sub | Call | BinOp | UnaryOp | "(" Expr ")"
//! Attr    := Expr "." Ident
//! Sub     := Expr "[" Expr "]"
//! Call    := Expr "(" ArgList ")"
//! ArgList := PosArgs? KwArgs?
//! KwArg   := Ident "=" Expr
//! BinOp   := Expr ("+"|"-"|"*"|"/") Expr
//! UnaryOp := ("+"|"-") Expr
//! ```
//!
//! Precedence, lowest to highest: additive (`+ -`), multiplicative (`* /`),
//! unary (`+ -`), postfix (`. [ ] (`), primary.

use crate::ast::{BinOp, Expr, KwArg, Span, Stmt, UnaryOp};
use crate::lexer::{self, Token, TokenKind};
use cyclesim_common::EngineError;

/// Parse a full top-level statement: `Ident "=" Expr` or a bare `Expr`.
///
/// This is the entry point used by `ExpressionNode` construction. The
/// resulting assignment target, if any, is the caller's to validate
/// against the node's declared name.
pub fn parse_stmt(source: &str) -> Result<Stmt, EngineError> {
    let tokens = lexer::lex(source)?;
    let mut p = Parser {
        tokens,
        pos: 0,
        source,
    };
    let stmt = p.parse_top_level_stmt()?;
    p.expect_eof()?;
    Ok(stmt)
}

/// Parse a bare expression, rejecting a top-level assignment.
///
/// Used by `AlgorithmNode`'s keyword-argument sub-expressions, which are
/// never themselves assignments.
pub fn parse_expr(source: &str) -> Result<Expr, EngineError> {
    let tokens = lexer::lex(source)?;
    let mut p = Parser {
        tokens,
        pos: 0,
        source,
    };
    let expr = p.parse_additive()?;
    p.expect_eof()?;
    Ok(expr)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn err(&self, message: impl Into<String>) -> EngineError {
        EngineError::expression(message, self.source)
    }

    fn expect_eof(&self) -> Result<(), EngineError> {
        if matches!(self.peek(), TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.err(format!("unexpected trailing token {:?}", self.peek())))
        }
    }

    /// `Ident "=" Expr` when the first two tokens are `Ident Equals`, else a bare `Expr`.
    fn parse_top_level_stmt(&mut self) -> Result<Stmt, EngineError> {
        if let (TokenKind::Ident(name), TokenKind::Equals) = (self.peek(), self.peek_at(1)) {
            let target = name.clone();
            self.advance(); // ident
            self.advance(); // '='
            let value = self.parse_additive()?;
            return Ok(Stmt::Assign { target, value });
        }
        Ok(Stmt::Expr(self.parse_additive()?))
    }

    fn parse_additive(&mut self) -> Result<Expr, EngineError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            let span = left.span().merge(right.span());
            left = Expr::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, EngineError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            let span = left.span().merge(right.span());
            left = Expr::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, EngineError> {
        let start = self.tokens[self.pos].span;
        let op = match self.peek() {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span());
            return Ok(Expr::UnaryOp {
                op,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, EngineError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    let attr = match self.advance().kind {
                        TokenKind::Ident(name) => name,
                        other => return Err(self.err(format!("expected identifier after '.', found {other:?}"))),
                    };
                    let span = expr.span().merge(self.tokens[self.pos - 1].span);
                    expr = Expr::Attr {
                        base: Box::new(expr),
                        attr,
                        span,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_additive()?;
                    self.expect(TokenKind::RBracket)?;
                    let span = expr.span().merge(self.tokens[self.pos - 1].span);
                    expr = Expr::Sub {
                        base: Box::new(expr),
                        index: Box::new(index),
                        span,
                    };
                }
                TokenKind::LParen => {
                    self.advance();
                    let (args, kwargs) = self.parse_arg_list()?;
                    self.expect(TokenKind::RParen)?;
                    let span = expr.span().merge(self.tokens[self.pos - 1].span);
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        kwargs,
                        span,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_arg_list(&mut self) -> Result<(Vec<Expr>, Vec<KwArg>), EngineError> {
        let mut args = Vec::new();
        let mut kwargs = Vec::new();
        if matches!(self.peek(), TokenKind::RParen) {
            return Ok((args, kwargs));
        }
        loop {
            if let (TokenKind::Ident(name), TokenKind::Equals) = (self.peek(), self.peek_at(1)) {
                let name = name.clone();
                self.advance();
                self.advance();
                let value = self.parse_additive()?;
                kwargs.push(KwArg { name, value });
            } else {
                if !kwargs.is_empty() {
                    return Err(self.err("positional arguments cannot follow keyword arguments"));
                }
                args.push(self.parse_additive()?);
            }
            if matches!(self.peek(), TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok((args, kwargs))
    }

    fn parse_primary(&mut self) -> Result<Expr, EngineError> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Number(n) => Ok(Expr::Number(n, tok.span)),
            TokenKind::Ident(name) => Ok(Expr::Name(name, tok.span)),
            TokenKind::LParen => {
                let inner = self.parse_additive()?;
                let close = self.expect(TokenKind::RParen)?;
                Ok(Expr::Paren(Box::new(inner), tok.span.merge(close.span)))
            }
            other => Err(self.err(format!("unexpected token {other:?} in expression"))),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, EngineError> {
        if *self.peek() == kind {
            Ok(self.advance())
        } else {
            Err(self.err(format!("expected {:?}, found {:?}", kind, self.peek())))
        }
    }
}
