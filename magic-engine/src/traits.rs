//! Engine and operation traits

use crate::ExecContext;
use magic_core::{ArgType, Arguments, BinOp, EngineError, MagicError};
use serde::Serialize;

/// Handle to a term living in a `Scope` arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Term(usize);

impl Term {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(&self) -> usize {
        self.0
    }
}

/// Arena of engine terms. Owned by exactly one interpreter; dropping it
/// releases every term it holds.
pub trait Scope: Send {
    fn number(&mut self, literal: &str) -> Result<Term, EngineError>;
    fn symbol(&mut self, name: &str) -> Result<Term, EngineError>;
    fn apply(&mut self, op: BinOp, lhs: Term, rhs: Term) -> Result<Term, EngineError>;

    /// Named transform: reduce, expand, factor, derivative, sin, ...
    fn transform(&mut self, name: &str, args: &[Term]) -> Result<Term, EngineError>;

    fn to_text(&self, term: Term) -> Result<String, EngineError>;
    fn to_latex(&self, term: Term) -> Result<String, EngineError>;

    /// Forget every term; handles issued before are invalid afterwards
    fn reset(&mut self);
}

/// External computation engine
pub trait Engine: Send + Sync {
    fn name(&self) -> &'static str;
    fn open_scope(&self) -> Result<Box<dyn Scope>, EngineError>;
}

/// Metadata about an operation argument
#[derive(Debug, Clone, Serialize)]
pub struct ArgMeta {
    pub name: &'static str,
    pub typ: ArgType,
    pub description: &'static str,
}

impl ArgMeta {
    pub const fn new(name: &'static str, typ: ArgType, description: &'static str) -> Self {
        Self { name, typ, description }
    }
}

/// Metadata for an operation plugin
#[derive(Debug, Clone, Serialize)]
pub struct OperationMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub args: &'static [ArgMeta],
    pub category: &'static str,
}

/// An operation a schema entry can dispatch to
pub trait Operation: Send + Sync {
    fn meta(&self) -> OperationMeta;
    fn execute(&self, args: &Arguments, ctx: &mut ExecContext<'_>) -> Result<Term, MagicError>;
}
