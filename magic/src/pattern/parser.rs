//! Pattern DSL parser
//!
//! ```text
//! Pattern  := Primary+
//! Primary  := '{' Argument '}' | Identifier | Number | Punctuation
//! Argument := "output" | Number ':' Type | Number
//! Type     := "expression" | "string" | "integer"
//! ```

use super::lexer::{PatternLexer, PatternToken, PatternTokenKind};
use super::{ArgSlot, Pattern, PatternContext, PatternTerm, TemplateRef};
use magic_core::{ArgType, MagicError, ParseError};

pub struct PatternParser {
    lexer: PatternLexer,
    context: PatternContext,
}

impl PatternParser {
    pub fn new(source: &str, context: PatternContext) -> Result<Self, MagicError> {
        Ok(Self { lexer: PatternLexer::new(source)?, context })
    }

    fn at(&self, kind: PatternTokenKind) -> bool {
        self.lexer.current().is(kind)
    }

    pub fn pattern(&mut self) -> Result<Pattern, MagicError> {
        let mut terms = vec![self.primary()?];
        while !self.at(PatternTokenKind::Eof) {
            terms.push(self.primary()?);
        }
        Ok(Pattern { terms })
    }

    fn primary(&mut self) -> Result<PatternTerm, MagicError> {
        let kind = self.lexer.current().kind;
        match kind {
            PatternTokenKind::OpenBrace => self.argument(),
            PatternTokenKind::Identifier | PatternTokenKind::Number => {
                Ok(PatternTerm::Literal(self.lexer.next()?.text))
            }
            // queries only ever contain words, so symbols are template text
            PatternTokenKind::Punctuation if self.context == PatternContext::Template => {
                Ok(PatternTerm::Literal(self.lexer.next()?.text))
            }
            _ => Err(self.lexer.current().unexpected("a word or '{'").into()),
        }
    }

    fn argument(&mut self) -> Result<PatternTerm, MagicError> {
        let open = self.lexer.next_of(PatternTokenKind::OpenBrace)?;
        let kind = self.lexer.current().kind;
        let term = match kind {
            PatternTokenKind::Identifier => {
                let name = self.lexer.next()?;
                if name.text != "output" {
                    return Err(ParseError::InvalidTemplateName {
                        name: name.text,
                        position: name.position,
                    }
                    .into());
                }
                PatternTerm::Template(TemplateRef::Output)
            }
            PatternTokenKind::Number => {
                let index_token = self.lexer.next()?;
                let index = slot_index(&index_token)?;
                if self.at(PatternTokenKind::Colon) {
                    self.lexer.next()?;
                    let ty = self.arg_type(&open)?;
                    PatternTerm::Slot(ArgSlot { index, ty })
                } else {
                    PatternTerm::Template(TemplateRef::Arg(index))
                }
            }
            PatternTokenKind::Eof => {
                return Err(ParseError::UnterminatedSlot { position: open.position }.into());
            }
            _ => {
                let found = self.lexer.current();
                return Err(ParseError::InvalidSlotIndex {
                    found: found.text.clone(),
                    position: found.position,
                }
                .into());
            }
        };

        self.close(&open)?;
        self.check_context(&term, &open)?;
        Ok(term)
    }

    fn arg_type(&mut self, open: &PatternToken) -> Result<ArgType, MagicError> {
        let kind = self.lexer.current().kind;
        match kind {
            PatternTokenKind::Identifier => {
                let name = self.lexer.next()?;
                name.text.parse::<ArgType>().map_err(|_| {
                    ParseError::UnknownType { name: name.text.clone(), position: name.position }.into()
                })
            }
            PatternTokenKind::Eof => Err(ParseError::UnterminatedSlot { position: open.position }.into()),
            _ => {
                let current = self.lexer.current();
                Err(ParseError::UnknownType {
                    name: current.text.clone(),
                    position: current.position,
                }
                .into())
            }
        }
    }

    fn close(&mut self, open: &PatternToken) -> Result<(), MagicError> {
        let kind = self.lexer.current().kind;
        match kind {
            PatternTokenKind::CloseBrace => {
                self.lexer.next()?;
                Ok(())
            }
            PatternTokenKind::Eof => Err(ParseError::UnterminatedSlot { position: open.position }.into()),
            _ => Err(self.lexer.current().unexpected("'}'").into()),
        }
    }

    fn check_context(&self, term: &PatternTerm, open: &PatternToken) -> Result<(), MagicError> {
        let kind = match (self.context, term) {
            (PatternContext::Query, PatternTerm::Template(_)) => "a slot reference",
            (PatternContext::Template, PatternTerm::Slot(_)) => "a slot declaration",
            _ => return Ok(()),
        };
        Err(ParseError::MisplacedArgument {
            kind,
            context: self.context.describe(),
            position: open.position,
        }
        .into())
    }
}

fn slot_index(token: &PatternToken) -> Result<usize, ParseError> {
    token.text.parse::<usize>().map_err(|_| ParseError::InvalidSlotIndex {
        found: token.text.clone(),
        position: token.position,
    })
}
