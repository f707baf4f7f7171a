//! Abstract Syntax Tree for queries
//!
//! Arithmetic is a tree of `Expr` nodes. The sequence productions
//! (phrase, compound list, statements) are flat vectors, never nested
//! right-recursive lists.

use crate::{Position, Token};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parsed query text: statements in source order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// Comma-separated list of phrases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub phrases: Vec<Phrase>,
}

impl Statement {
    /// All terms of all phrases, in order
    pub fn terms(&self) -> impl Iterator<Item = &Expr> {
        self.phrases.iter().flat_map(|p| p.terms.iter())
    }
}

/// Successive words and sub-expressions of one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phrase {
    pub terms: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(Token),
    /// A bare identifier: a literal word or a symbol
    Symbol(Token),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        name: Token,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Equal,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
            BinOp::Equal => "=",
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            BinOp::Equal => 0,
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
            BinOp::Pow => 3,
        }
    }
}

impl Expr {
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary { op, left: Box::new(left), right: Box::new(right) }
    }

    /// Position of the leftmost token
    pub fn position(&self) -> Position {
        match self {
            Expr::Number(t) | Expr::Symbol(t) => t.position,
            Expr::Binary { left, .. } => left.position(),
            Expr::Call { name, .. } => name.position,
        }
    }

    /// The word, if this node is a bare identifier
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Expr::Symbol(t) => Some(&t.text),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Expr::Number(_))
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            _ => u8::MAX,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(t) | Expr::Symbol(t) => f.write_str(&t.text),
            Expr::Binary { op, left, right } => {
                let prec = op.precedence();
                // Operators chain to the left; an exponent is a single primary.
                let left_parens = left.precedence() < prec
                    || (*op == BinOp::Pow && left.precedence() == prec);
                let right_parens = right.precedence() < prec
                    || (matches!(op, BinOp::Sub | BinOp::Div | BinOp::Pow)
                        && right.precedence() == prec);
                write_operand(f, left, left_parens)?;
                match op {
                    BinOp::Add | BinOp::Sub | BinOp::Equal => write!(f, " {} ", op.symbol())?,
                    _ => f.write_str(op.symbol())?,
                }
                write_operand(f, right, right_parens)
            }
            Expr::Call { name, args } => {
                write!(f, "{}(", name.text)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenKind;

    fn num(s: &str) -> Expr {
        Expr::Number(Token::new(TokenKind::Number, s, Position::default()))
    }

    fn sym(s: &str) -> Expr {
        Expr::Symbol(Token::new(TokenKind::Identifier, s, Position::default()))
    }

    #[test]
    fn test_display_precedence() {
        let e = Expr::binary(
            BinOp::Mul,
            Expr::binary(BinOp::Add, num("1"), sym("x")),
            sym("y"),
        );
        assert_eq!(e.to_string(), "(1 + x)*y");
    }

    #[test]
    fn test_display_right_grouping() {
        let e = Expr::binary(
            BinOp::Sub,
            sym("a"),
            Expr::binary(BinOp::Sub, sym("b"), sym("c")),
        );
        assert_eq!(e.to_string(), "a - (b - c)");
    }

    #[test]
    fn test_as_word() {
        assert_eq!(sym("reduce").as_word(), Some("reduce"));
        assert_eq!(num("2").as_word(), None);
    }
}
