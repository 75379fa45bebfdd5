//! Hand-written tokenizer for the restricted arithmetic grammar.
//!
//! Only the characters the grammar needs are lexed: digits (with an
//! optional fractional part and exponent), identifiers, and the fixed
//! punctuation set `. [ ] ( ) , = + - * /`. There is no keyword table —
//! every identifier is a name, resolved later by the evaluator.

use crate::ast::Span;
use cyclesim_common::EngineError;

/// A lexical token kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A floating-point literal.
    Number(f64),
    /// An identifier.
    Ident(String),
    /// `.`
    Dot,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `=`
    Equals,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// End of input.
    Eof,
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// Its source span.
    pub span: Span,
}

/// Tokenizes `source` into a flat vector terminated by [`TokenKind::Eof`].
pub fn lex(source: &str) -> Result<Vec<Token>, EngineError> {
    let bytes = source.as_bytes();
    let mut pos = 0usize;
    let mut tokens = Vec::new();

    while pos < bytes.len() {
        let c = bytes[pos] as char;

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        let kind = match c {
            '.' => {
                pos += 1;
                TokenKind::Dot
            }
            '[' => {
                pos += 1;
                TokenKind::LBracket
            }
            ']' => {
                pos += 1;
                TokenKind::RBracket
            }
            '(' => {
                pos += 1;
                TokenKind::LParen
            }
            ')' => {
                pos += 1;
                TokenKind::RParen
            }
            ',' => {
                pos += 1;
                TokenKind::Comma
            }
            '=' => {
                pos += 1;
                TokenKind::Equals
            }
            '+' => {
                pos += 1;
                TokenKind::Plus
            }
            '-' => {
                pos += 1;
                TokenKind::Minus
            }
            '*' => {
                pos += 1;
                TokenKind::Star
            }
            '/' => {
                pos += 1;
                TokenKind::Slash
            }
            c if c.is_ascii_digit() => {
                while pos < bytes.len() && (bytes[pos] as char).is_ascii_digit() {
                    pos += 1;
                }
                if pos < bytes.len() && bytes[pos] as char == '.' {
                    pos += 1;
                    while pos < bytes.len() && (bytes[pos] as char).is_ascii_digit() {
                        pos += 1;
                    }
                }
                if pos < bytes.len() && matches!(bytes[pos] as char, 'e' | 'E') {
                    let mut lookahead = pos + 1;
                    if lookahead < bytes.len() && matches!(bytes[lookahead] as char, '+' | '-') {
                        lookahead += 1;
                    }
                    if lookahead < bytes.len() && (bytes[lookahead] as char).is_ascii_digit() {
                        pos = lookahead;
                        while pos < bytes.len() && (bytes[pos] as char).is_ascii_digit() {
                            pos += 1;
                        }
                    }
                }
                let text = &source[start..pos];
                let value = text.parse::<f64>().map_err(|_| {
                    EngineError::expression(format!("invalid numeric literal '{text}'"), source)
                })?;
                TokenKind::Number(value)
            }
            c if c.is_alphabetic() || c == '_' => {
                while pos < bytes.len() {
                    let ch = bytes[pos] as char;
                    if ch.is_alphanumeric() || ch == '_' {
                        pos += 1;
                    } else {
                        break;
                    }
                }
                TokenKind::Ident(source[start..pos].to_string())
            }
            other => {
                return Err(EngineError::expression(
                    format!("unexpected character '{other}' at byte {start}"),
                    source,
                ));
            }
        };

        tokens.push(Token {
            kind,
            span: Span::new(start, pos),
        });
    }

    let end = bytes.len();
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
    });
    Ok(tokens)
}
