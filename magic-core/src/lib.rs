//! Magic Core - Fundamental types
//!
//! This crate provides the core types used throughout Magic:
//! - `Token`, `Position`: lexical units of the query and pattern grammars
//! - `Expr`, `Phrase`, `Statement`, `Program`: the query AST
//! - `Value`, `ArgType`, `Arguments`: typed arguments captured by the matcher
//! - `MagicError` and the per-layer error types

mod token;
mod ast;
mod value;
mod error;

pub use token::{Position, Token, TokenKind};
pub use ast::{BinOp, Expr, Phrase, Program, Statement};
pub use value::{ArgType, Arguments, Value};
pub use error::{
    codes, ConfigError, Diagnostic, EngineError, ExecError, LexError, MagicError, MatchError,
    ParseError,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ArgType, Arguments, ConfigError, EngineError, ExecError, Expr, MagicError, Position,
        Value,
    };
    pub use crate::error::codes;
}
