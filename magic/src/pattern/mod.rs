//! Pattern DSL
//!
//! One grammar serves two roles. A registration pattern such as
//! `derivative of {0:expression} by {1:string}` declares typed slots; an
//! output template such as `derivative of {0} is {output}` references them. The
//! caller picks the role with `PatternContext`.

mod lexer;
mod parser;

pub use lexer::{PatternLexer, PatternToken, PatternTokenKind};
pub use parser::PatternParser;

use magic_core::{ArgType, MagicError};
use std::fmt;

/// Where a pattern string is used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternContext {
    /// A query shape to register: literals and slot declarations
    Query,
    /// An output template: literals and slot references
    Template,
}

impl PatternContext {
    pub fn describe(&self) -> &'static str {
        match self {
            PatternContext::Query => "a query pattern",
            PatternContext::Template => "an output template",
        }
    }
}

/// A typed slot declared by a registration pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSlot {
    pub index: usize,
    pub ty: ArgType,
}

/// What an output template substitutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateRef {
    Arg(usize),
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternTerm {
    Literal(String),
    Slot(ArgSlot),
    Template(TemplateRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub terms: Vec<PatternTerm>,
}

impl Pattern {
    pub fn parse(source: &str, context: PatternContext) -> Result<Self, MagicError> {
        PatternParser::new(source, context)?.pattern()
    }

    /// Parse a registration pattern
    pub fn query(source: &str) -> Result<Self, MagicError> {
        Self::parse(source, PatternContext::Query)
    }

    /// Parse an output template
    pub fn template(source: &str) -> Result<Self, MagicError> {
        Self::parse(source, PatternContext::Template)
    }

    pub fn slots(&self) -> impl Iterator<Item = &ArgSlot> {
        self.terms.iter().filter_map(|t| match t {
            PatternTerm::Slot(slot) => Some(slot),
            _ => None,
        })
    }

    /// Slot indices referenced by `{N}`
    pub fn references(&self) -> impl Iterator<Item = usize> + '_ {
        self.terms.iter().filter_map(|t| match t {
            PatternTerm::Template(TemplateRef::Arg(index)) => Some(*index),
            _ => None,
        })
    }
}

impl fmt::Display for PatternTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternTerm::Literal(text) => f.write_str(text),
            PatternTerm::Slot(slot) => write!(f, "{{{}:{}}}", slot.index, slot.ty),
            PatternTerm::Template(TemplateRef::Arg(index)) => write!(f, "{{{}}}", index),
            PatternTerm::Template(TemplateRef::Output) => f.write_str("{output}"),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", term)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_source() {
        let source = "derivative of {0:expression} by {1:string}";
        assert_eq!(Pattern::query(source).unwrap().to_string(), source);
        assert_eq!(Pattern::template("{0} is {output}").unwrap().to_string(), "{0} is {output}");
    }

    #[test]
    fn test_slots_and_references() {
        let pattern = Pattern::query("gcd of {0:expression} and {1:expression}").unwrap();
        let indices: Vec<usize> = pattern.slots().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1]);

        let template = Pattern::template("gcd {0} {1} = {output}").unwrap();
        assert_eq!(template.references().collect::<Vec<_>>(), vec![0, 1]);
    }
}
