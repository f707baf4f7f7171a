//! Query parser
//!
//! Recursive descent, loosest to tightest:
//!
//! ```text
//! Program   := Statement*
//! Statement := Phrase (',' Phrase)*
//! Phrase    := Equation+                 (until ',' or end of input)
//! Equation  := Term ('=' Term)?
//! Term      := Factor (('+' | '-') Factor)*
//! Factor    := Unary (('*' | '/' | <adjacent>) Unary)*
//! Unary     := '-' Binary | '+'? Binary
//! Binary    := Primary ('^' Primary)?
//! Primary   := '(' Term ')' | Identifier | Identifier '(' Args ')' | Number
//! ```
//!
//! Binary operators associate to the left. `<adjacent>` is an implicit
//! product: the next token follows the previous primary with no whitespace
//! and the pair reads as a product (`2x`, `3(x+1)`, `f(x)2`, `(a)(b)`).
//! Digits directly after letters belong to the identifier, so `x2` is one
//! symbol.

use crate::lexer::Lexer;
use magic_core::{
    BinOp, Expr, MagicError, ParseError, Phrase, Program, Statement, Token, TokenKind,
};

/// Shape of the most recently parsed primary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Number,
    Symbol,
    Call,
    Group,
}

/// Parse query text into a program
pub fn parse(source: &str) -> Result<Program, MagicError> {
    Parser::new(source)?.program()
}

pub struct Parser {
    lexer: Lexer,
    last: Last,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, MagicError> {
        Ok(Self { lexer: Lexer::new(source)?, last: Last::Number })
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.lexer.current().is(kind)
    }

    fn advance(&mut self) -> Result<Token, MagicError> {
        Ok(self.lexer.next()?.token)
    }

    pub fn program(&mut self) -> Result<Program, MagicError> {
        let mut statements = Vec::new();
        while !self.at(TokenKind::Eof) {
            statements.push(self.statement()?);
        }
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Statement, MagicError> {
        let mut phrases = vec![self.phrase()?];
        while self.at(TokenKind::Comma) {
            self.advance()?;
            phrases.push(self.phrase()?);
        }
        Ok(Statement { phrases })
    }

    fn phrase(&mut self) -> Result<Phrase, MagicError> {
        let mut terms = vec![self.equation()?];
        while !self.at(TokenKind::Eof) && !self.at(TokenKind::Comma) {
            terms.push(self.equation()?);
        }
        Ok(Phrase { terms })
    }

    fn equation(&mut self) -> Result<Expr, MagicError> {
        let left = self.term()?;
        if !self.at(TokenKind::Equal) {
            return Ok(left);
        }
        self.advance()?;
        let right = self.term()?;
        Ok(Expr::binary(BinOp::Equal, left, right))
    }

    fn term(&mut self) -> Result<Expr, MagicError> {
        let mut left = self.factor()?;
        loop {
            let kind = self.lexer.current().token.kind;
            let op = match kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => return Ok(left),
            };
            self.advance()?;
            let right = self.factor()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn factor(&mut self) -> Result<Expr, MagicError> {
        let mut left = self.unary()?;
        loop {
            let kind = self.lexer.current().token.kind;
            let op = match kind {
                TokenKind::Star => {
                    self.advance()?;
                    BinOp::Mul
                }
                TokenKind::Slash => {
                    self.advance()?;
                    BinOp::Div
                }
                _ if self.implicit_product() => BinOp::Mul,
                _ => return Ok(left),
            };
            let right = self.unary()?;
            left = Expr::binary(op, left, right);
        }
    }

    /// Whether the current token multiplies the previous primary
    fn implicit_product(&self) -> bool {
        let next = self.lexer.current();
        if !next.is_adjacent() {
            return false;
        }
        let kind = next.token.kind;
        match self.last {
            Last::Number => matches!(kind, TokenKind::OpenParen | TokenKind::Identifier),
            Last::Symbol => kind == TokenKind::Number,
            Last::Call | Last::Group => matches!(
                kind,
                TokenKind::OpenParen | TokenKind::Identifier | TokenKind::Number
            ),
        }
    }

    fn unary(&mut self) -> Result<Expr, MagicError> {
        let kind = self.lexer.current().token.kind;
        match kind {
            TokenKind::Minus => {
                let minus = self.advance()?;
                let operand = self.binary()?;
                let minus_one = Token::new(TokenKind::Number, "-1", minus.position);
                Ok(Expr::binary(BinOp::Mul, Expr::Number(minus_one), operand))
            }
            TokenKind::Plus => {
                self.advance()?;
                self.binary()
            }
            _ => self.binary(),
        }
    }

    fn binary(&mut self) -> Result<Expr, MagicError> {
        let base = self.primary()?;
        if !self.at(TokenKind::Caret) {
            return Ok(base);
        }
        self.advance()?;
        let exponent = self.primary()?;
        Ok(Expr::binary(BinOp::Pow, base, exponent))
    }

    fn primary(&mut self) -> Result<Expr, MagicError> {
        let kind = self.lexer.current().token.kind;
        match kind {
            TokenKind::OpenParen => {
                self.advance()?;
                let inner = self.term()?;
                self.lexer.next_of(TokenKind::CloseParen)?;
                self.last = Last::Group;
                Ok(inner)
            }
            TokenKind::Number => {
                let token = self.advance()?;
                self.last = Last::Number;
                Ok(Expr::Number(token))
            }
            TokenKind::Identifier => {
                let name = self.advance()?;
                let next = self.lexer.current();
                if next.is(TokenKind::OpenParen) && next.is_adjacent() {
                    let args = self.call_args(&name)?;
                    self.last = Last::Call;
                    Ok(Expr::Call { name, args })
                } else {
                    self.last = Last::Symbol;
                    Ok(Expr::Symbol(name))
                }
            }
            _ => Err(self.lexer.current().unexpected("an expression").into()),
        }
    }

    /// Arguments of a call, from the opening parenthesis through the closing one
    fn call_args(&mut self, name: &Token) -> Result<Vec<Expr>, MagicError> {
        self.lexer.next_of(TokenKind::OpenParen)?;
        let mut args = Vec::new();
        if self.at(TokenKind::CloseParen) {
            self.advance()?;
            return Ok(args);
        }
        loop {
            args.push(self.term()?);
            let kind = self.lexer.current().token.kind;
            match kind {
                TokenKind::CloseParen => {
                    self.advance()?;
                    return Ok(args);
                }
                TokenKind::Comma => {
                    let comma = self.advance()?;
                    if self.at(TokenKind::CloseParen) || self.at(TokenKind::Eof) {
                        return Err(ParseError::MissingArgument {
                            function: name.text.clone(),
                            position: comma.position,
                        }
                        .into());
                    }
                }
                TokenKind::Eof => {
                    return Err(ParseError::UnterminatedCall {
                        function: name.text.clone(),
                        position: name.position,
                    }
                    .into());
                }
                _ => return Err(self.lexer.current().unexpected("',' or ')'").into()),
            }
        }
    }
}
