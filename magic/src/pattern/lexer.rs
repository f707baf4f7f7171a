//! Pattern DSL lexer

use crate::lexer::{is_whitespace, Cursor};
use magic_core::{LexError, MagicError, ParseError, Position};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternTokenKind {
    Eof,
    Identifier,
    Number,
    /// A run of other symbols, such as `=` or `/`
    Punctuation,
    OpenBrace,
    CloseBrace,
    Colon,
}

impl PatternTokenKind {
    pub fn describe(&self) -> &'static str {
        match self {
            PatternTokenKind::Eof => "end of pattern",
            PatternTokenKind::Identifier => "identifier",
            PatternTokenKind::Number => "number",
            PatternTokenKind::Punctuation => "punctuation",
            PatternTokenKind::OpenBrace => "'{'",
            PatternTokenKind::CloseBrace => "'}'",
            PatternTokenKind::Colon => "':'",
        }
    }
}

impl fmt::Display for PatternTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternToken {
    pub kind: PatternTokenKind,
    pub text: String,
    pub position: Position,
}

impl PatternToken {
    pub fn is(&self, kind: PatternTokenKind) -> bool {
        self.kind == kind
    }

    pub(crate) fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        let found = if self.is(PatternTokenKind::Eof) {
            self.kind.describe().to_string()
        } else {
            self.text.clone()
        };
        ParseError::UnexpectedToken { expected: expected.into(), found, position: self.position }
    }
}

fn is_punctuation(c: char) -> bool {
    !(c.is_alphanumeric() || is_whitespace(c) || matches!(c, '{' | '}' | ':'))
}

pub struct PatternLexer {
    cursor: Cursor,
    current: PatternToken,
}

impl PatternLexer {
    pub fn new(source: &str) -> Result<Self, LexError> {
        let mut lexer = Self {
            cursor: Cursor::new(source),
            current: PatternToken {
                kind: PatternTokenKind::Eof,
                text: String::new(),
                position: Position::default(),
            },
        };
        lexer.current = lexer.scan()?;
        Ok(lexer)
    }

    pub fn current(&self) -> &PatternToken {
        &self.current
    }

    pub fn next(&mut self) -> Result<PatternToken, LexError> {
        let upcoming = self.scan()?;
        Ok(std::mem::replace(&mut self.current, upcoming))
    }

    pub fn next_of(&mut self, kind: PatternTokenKind) -> Result<PatternToken, MagicError> {
        if !self.current.is(kind) {
            return Err(self.current.unexpected(kind.describe()).into());
        }
        Ok(self.next()?)
    }

    fn scan(&mut self) -> Result<PatternToken, LexError> {
        self.cursor.skip_whitespace();
        let position = self.cursor.position();
        let token = |kind, text: String| PatternToken { kind, text, position };

        let Some(c) = self.cursor.peek() else {
            return Ok(token(PatternTokenKind::Eof, String::new()));
        };
        if c.is_ascii_digit() {
            let mut literal = self.cursor.number(position)?;
            if self.cursor.peek().is_some_and(char::is_alphanumeric) {
                literal.push_str(&self.cursor.take_while(|c| c.is_alphanumeric() || c == '.'));
                return Err(LexError::MalformedNumber { literal, position });
            }
            return Ok(token(PatternTokenKind::Number, literal));
        }
        let kind = match c {
            '{' => PatternTokenKind::OpenBrace,
            '}' => PatternTokenKind::CloseBrace,
            ':' => PatternTokenKind::Colon,
            c if c.is_alphanumeric() => {
                let text = self.cursor.take_while(char::is_alphanumeric);
                return Ok(token(PatternTokenKind::Identifier, text));
            }
            _ => {
                let text = self.cursor.take_while(is_punctuation);
                return Ok(token(PatternTokenKind::Punctuation, text));
            }
        };
        self.cursor.bump();
        Ok(token(kind, c.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<PatternTokenKind> {
        let mut lexer = PatternLexer::new(source).unwrap();
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next().unwrap();
            kinds.push(token.kind);
            if token.is(PatternTokenKind::Eof) {
                return kinds;
            }
        }
    }

    #[test]
    fn test_slot_tokens() {
        use PatternTokenKind::*;
        assert_eq!(
            kinds("reduce {0:expression}"),
            vec![Identifier, OpenBrace, Number, Colon, Identifier, CloseBrace, Eof]
        );
    }

    #[test]
    fn test_number_glued_to_word() {
        assert!(matches!(
            PatternLexer::new("2x"),
            Err(LexError::MalformedNumber { ref literal, .. }) if literal == "2x"
        ));
    }

    #[test]
    fn test_punctuation_runs() {
        use PatternTokenKind::*;
        assert_eq!(kinds("{0} => {output}"), vec![
            OpenBrace, Number, CloseBrace, Punctuation, OpenBrace, Identifier, CloseBrace, Eof
        ]);
        let mut lexer = PatternLexer::new("d/dx").unwrap();
        assert_eq!(lexer.next().unwrap().text, "d");
        assert_eq!(lexer.next().unwrap().text, "/");
        assert_eq!(lexer.next().unwrap().text, "dx");
    }
}
