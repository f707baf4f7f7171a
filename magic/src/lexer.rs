//! Query lexer
//!
//! Produces one `Lexeme` at a time. Whether whitespace preceded a token is
//! part of the lexeme because the parser needs it to tell `2x` (a product)
//! from `2 x` (two phrase terms).

use magic_core::{LexError, MagicError, ParseError, Position, Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub preceding_whitespace: bool,
}

impl Lexeme {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.token.is(kind)
    }

    /// True when this token directly follows the previous one
    pub fn is_adjacent(&self) -> bool {
        !self.preceding_whitespace
    }

    pub(crate) fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found_text(&self.token),
            position: self.token.position,
        }
    }
}

/// How a token reads in an error message
pub(crate) fn found_text(token: &Token) -> String {
    if token.is(TokenKind::Eof) {
        TokenKind::Eof.describe().to_string()
    } else {
        token.text.clone()
    }
}

pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Character cursor with 1-based line/column tracking
pub(crate) struct Cursor {
    chars: Vec<char>,
    offset: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    pub fn new(source: &str) -> Self {
        Self { chars: source.chars().collect(), offset: 0, line: 1, column: 1 }
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.offset).copied()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Skip whitespace, reporting whether there was any
    pub fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(is_whitespace) {
            self.bump();
            skipped = true;
        }
        skipped
    }

    pub fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek().filter(|c| pred(*c)) {
            self.bump();
            text.push(c);
        }
        text
    }

    /// Digits with at most one decimal point
    pub fn number(&mut self, position: Position) -> Result<String, LexError> {
        let mut literal = self.take_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') {
            self.bump();
            literal.push('.');
            literal.push_str(&self.take_while(|c| c.is_ascii_digit()));
            if self.peek() == Some('.') {
                literal.push_str(&self.take_while(|c| c == '.' || c.is_ascii_digit()));
                return Err(LexError::MalformedNumber { literal, position });
            }
        }
        Ok(literal)
    }
}

pub struct Lexer {
    cursor: Cursor,
    current: Lexeme,
}

impl Lexer {
    /// Create a lexer positioned on the first token of `source`
    pub fn new(source: &str) -> Result<Self, LexError> {
        let mut lexer = Self {
            cursor: Cursor::new(source),
            current: Lexeme {
                token: Token::eof(Position::default()),
                preceding_whitespace: false,
            },
        };
        lexer.current = lexer.scan()?;
        Ok(lexer)
    }

    pub fn current(&self) -> &Lexeme {
        &self.current
    }

    /// Move past the current token, returning it
    pub fn next(&mut self) -> Result<Lexeme, LexError> {
        let upcoming = self.scan()?;
        Ok(std::mem::replace(&mut self.current, upcoming))
    }

    /// Consume the current token if it is of `kind`, otherwise fail
    pub fn next_of(&mut self, kind: TokenKind) -> Result<Token, MagicError> {
        if !self.current.is(kind) {
            return Err(self.current.unexpected(kind.describe()).into());
        }
        Ok(self.next()?.token)
    }

    fn scan(&mut self) -> Result<Lexeme, LexError> {
        let preceding_whitespace = self.cursor.skip_whitespace();
        let position = self.cursor.position();
        let token = match self.cursor.peek() {
            None => Token::eof(position),
            Some(c) if c.is_ascii_digit() => {
                Token::new(TokenKind::Number, self.cursor.number(position)?, position)
            }
            Some(c) => match TokenKind::punctuation(c) {
                Some(kind) => {
                    self.cursor.bump();
                    Token::new(kind, c, position)
                }
                None if c.is_alphanumeric() => {
                    let text = self.cursor.take_while(char::is_alphanumeric);
                    Token::new(TokenKind::Identifier, text, position)
                }
                None => return Err(LexError::UnexpectedCharacter { character: c, position }),
            },
        };

        Ok(Lexeme { token, preceding_whitespace })
    }
}

/// Lex `source` to the end, including the final EOF lexeme
pub fn tokenize(source: &str) -> Result<Vec<Lexeme>, LexError> {
    let mut lexer = Lexer::new(source)?;
    let mut lexemes = Vec::new();
    loop {
        let lexeme = lexer.next()?;
        let done = lexeme.is(TokenKind::Eof);
        lexemes.push(lexeme);
        if done {
            return Ok(lexemes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().iter().map(|l| l.token.kind).collect()
    }

    #[test]
    fn test_numbers_lex_whole() {
        for literal in ["0", "42", "3.25", "3.", "1234567890123456789"] {
            let lexemes = tokenize(literal).unwrap();
            assert_eq!(lexemes.len(), 2);
            assert_eq!(lexemes[0].token.kind, TokenKind::Number);
            assert_eq!(lexemes[0].token.text, literal);
        }
    }

    #[test]
    fn test_two_points_is_malformed() {
        let err = tokenize("1.2.3").unwrap_err();
        assert_eq!(
            err,
            LexError::MalformedNumber { literal: "1.2.3".to_string(), position: Position::new(1, 1) }
        );
    }

    #[test]
    fn test_punctuation_and_words() {
        assert_eq!(
            kinds("f(x, 2) = y^2"),
            vec![
                TokenKind::Identifier,
                TokenKind::OpenParen,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Number,
                TokenKind::CloseParen,
                TokenKind::Equal,
                TokenKind::Identifier,
                TokenKind::Caret,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_preceding_whitespace() {
        let lexemes = tokenize("2x 3").unwrap();
        assert!(!lexemes[0].preceding_whitespace);
        assert!(!lexemes[1].preceding_whitespace);
        assert!(lexemes[2].preceding_whitespace);
    }

    #[test]
    fn test_newline_positions() {
        let lexemes = tokenize("a\n  b").unwrap();
        assert_eq!(lexemes[1].token.position, Position::new(2, 3));
        assert!(lexemes[1].preceding_whitespace);
    }

    #[test]
    fn test_unicode_identifier() {
        let lexemes = tokenize("dérivée").unwrap();
        assert_eq!(lexemes[0].token.text, "dérivée");
    }

    #[test]
    fn test_unexpected_character() {
        assert!(matches!(
            tokenize("x # y"),
            Err(LexError::UnexpectedCharacter { character: '#', .. })
        ));
    }

    #[test]
    fn test_next_of_reports_kind() {
        let mut lexer = Lexer::new("x").unwrap();
        let err = lexer.next_of(TokenKind::Number).unwrap_err();
        assert_eq!(err.position(), Some(Position::new(1, 1)));
        assert!(lexer.next_of(TokenKind::Identifier).is_ok());
        assert!(lexer.current().is(TokenKind::Eof));
    }
}
