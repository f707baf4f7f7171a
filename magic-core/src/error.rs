//! Structured errors
//!
//! Every layer fails fast with its own error type. `MagicError` gathers
//! them for the single recovery boundary, which turns any of them into a
//! serializable `Diagnostic` for the user.

use crate::{ArgType, Position};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const LEX_ERROR: &str = "LEX_ERROR";
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const MATCH_ERROR: &str = "MATCH_ERROR";
    pub const EXEC_ERROR: &str = "EXEC_ERROR";
    pub const ENGINE_ERROR: &str = "ENGINE_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

/// Malformed input at the character level
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("invalid numeric literal '{literal}' at {position}")]
    MalformedNumber { literal: String, position: Position },

    #[error("unrecognized character '{character}' at {position}")]
    UnexpectedCharacter { character: char, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::MalformedNumber { position, .. }
            | LexError::UnexpectedCharacter { position, .. } => *position,
        }
    }
}

/// Well-formed tokens in an order the grammar does not accept
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expecting {expected} but found '{found}' at {position}")]
    UnexpectedToken { expected: String, found: String, position: Position },

    #[error("function argument expected for function '{function}' at {position}, you likely added an extra ',' at the end of the arguments or forgot an argument")]
    MissingArgument { function: String, position: Position },

    #[error("unterminated argument list for function '{function}' at {position}")]
    UnterminatedCall { function: String, position: Position },

    #[error("undefined type '{name}' at {position}, expected one of expression, string, integer")]
    UnknownType { name: String, position: Position },

    #[error("invalid slot index '{found}' at {position}")]
    InvalidSlotIndex { found: String, position: Position },

    #[error("invalid template argument '{name}' at {position}, only 'output' is reserved")]
    InvalidTemplateName { name: String, position: Position },

    #[error("unterminated '{{' at {position}")]
    UnterminatedSlot { position: Position },

    #[error("{kind} is not allowed in {context} at {position}")]
    MisplacedArgument { kind: &'static str, context: &'static str, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::MissingArgument { position, .. }
            | ParseError::UnterminatedCall { position, .. }
            | ParseError::UnknownType { position, .. }
            | ParseError::InvalidSlotIndex { position, .. }
            | ParseError::InvalidTemplateName { position, .. }
            | ParseError::UnterminatedSlot { position }
            | ParseError::MisplacedArgument { position, .. } => *position,
        }
    }
}

/// The query does not follow any registered pattern
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("query is not defined at {position}")]
    Incomplete { position: Position },

    #[error("invalid query: unexpected '{found}' at {position}")]
    NoEdge { found: String, position: Position },

    #[error("expected an integer but found '{found}' at {position}")]
    NotInteger { found: String, position: Position },
}

impl MatchError {
    pub fn position(&self) -> Position {
        match self {
            MatchError::Incomplete { position }
            | MatchError::NoEdge { position, .. }
            | MatchError::NotInteger { position, .. } => *position,
        }
    }
}

/// A matched query could not be dispatched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("operation '{name}' is not implemented")]
    UnknownOperation { name: String, similar: Vec<String> },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String, similar: Vec<String> },

    #[error("{name}() expects {expected} arguments, got {got}")]
    ArgCount { name: String, expected: usize, got: usize },

    #[error("{name}() argument {index}: expected {expected}, got {got}")]
    ArgType { name: String, index: usize, expected: ArgType, got: ArgType },

    #[error("{name}() is missing argument {index}")]
    MissingArgument { name: String, index: usize },
}

/// Failure reported by the computation engine, surfaced unmodified
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("domain error: {0}")]
    Domain(String),

    #[error("'{0}' is not supported by this engine")]
    Unsupported(String),

    #[error("unknown term handle {0}")]
    UnknownTerm(usize),
}

/// Schema configuration and interpreter lifecycle failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid schema configuration: {0}")]
    Json(String),

    #[error("could not fetch schema for '{culture}': {reason}")]
    Fetch { culture: String, reason: String },

    #[error("output template of '{pattern}' references undeclared slot {index}")]
    UndeclaredSlot { pattern: String, index: usize },

    #[error("interpreter wasn't initialized")]
    NotInitialized,
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

/// Any failure of the query pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MagicError {
    #[error("Lexing Error: {0}")]
    Lex(#[from] LexError),

    #[error("Parsing Error: {0}")]
    Parse(#[from] ParseError),

    #[error("Match Error: {0}")]
    Match(#[from] MatchError),

    #[error("Execution Error: {0}")]
    Exec(#[from] ExecError),

    #[error("Engine Error: {0}")]
    Engine(#[from] EngineError),

    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
}

impl MagicError {
    pub fn code(&self) -> &'static str {
        match self {
            MagicError::Lex(_) => codes::LEX_ERROR,
            MagicError::Parse(_) => codes::PARSE_ERROR,
            MagicError::Match(_) => codes::MATCH_ERROR,
            MagicError::Exec(_) => codes::EXEC_ERROR,
            MagicError::Engine(_) => codes::ENGINE_ERROR,
            MagicError::Config(_) => codes::CONFIG_ERROR,
        }
    }

    /// Offending position in the query or pattern text, when known
    pub fn position(&self) -> Option<Position> {
        match self {
            MagicError::Lex(e) => Some(e.position()),
            MagicError::Parse(e) => Some(e.position()),
            MagicError::Match(e) => Some(e.position()),
            _ => None,
        }
    }

    pub fn suggestion(&self) -> Option<String> {
        match self {
            MagicError::Exec(ExecError::UnknownOperation { similar, .. })
            | MagicError::Exec(ExecError::UnknownFunction { similar, .. })
                if !similar.is_empty() =>
            {
                Some(format!("Similar: {}", similar.join(", ")))
            }
            MagicError::Match(_) => Some("Use :help to list the recognized queries".to_string()),
            MagicError::Config(ConfigError::NotInitialized) => {
                Some("Call init before compiling queries".to_string())
            }
            _ => None,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let position = self.position();
        Diagnostic {
            code: self.code().to_string(),
            message: self.to_string(),
            suggestion: self.suggestion(),
            line: position.map(|p| p.line),
            column: position.map(|p| p.column),
        }
    }
}

/// User-visible rendering of a failed query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_and_position() {
        let err: MagicError = MatchError::Incomplete { position: Position::new(1, 8) }.into();
        assert_eq!(err.code(), codes::MATCH_ERROR);
        assert_eq!(err.position(), Some(Position::new(1, 8)));
    }

    #[test]
    fn test_diagnostic_carries_suggestion() {
        let err: MagicError = ExecError::UnknownOperation {
            name: "reduse".to_string(),
            similar: vec!["reduce".to_string()],
        }
        .into();
        let diag = err.to_diagnostic();
        assert_eq!(diag.code, "EXEC_ERROR");
        assert_eq!(diag.suggestion.as_deref(), Some("Similar: reduce"));
        assert!(diag.line.is_none());
    }

    #[test]
    fn test_diagnostic_serialization_skips_empty() {
        let err: MagicError = EngineError::DivisionByZero.into();
        let json = serde_json::to_string(&err.to_diagnostic()).unwrap();
        assert!(!json.contains("line"));
        assert!(json.contains("ENGINE_ERROR"));
    }
}
