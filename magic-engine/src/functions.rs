//! Functions callable inside query expressions
//!
//! The schema's `functions` section binds a name such as `sin` to an
//! engine builtin and an argument signature.

use crate::registry::similar_names;
use magic_core::{ArgType, ExecError, Expr, MagicError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the schema's `functions` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    #[serde(default)]
    pub args: Vec<ArgType>,
    /// Engine builtin the call forwards to
    pub func: String,
}

#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: HashMap<String, FunctionDef>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function(mut self, def: FunctionDef) -> Self {
        self.insert(def);
        self
    }

    pub fn insert(&mut self, def: FunctionDef) {
        tracing::debug!(name = %def.name, func = %def.func, "registering function");
        self.functions.insert(def.name.to_lowercase(), def);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Look up `name` and check the call's arguments against its signature
    pub fn resolve(&self, name: &str, args: &[Expr]) -> Result<&FunctionDef, MagicError> {
        let def = self.get(name).ok_or_else(|| ExecError::UnknownFunction {
            name: name.to_string(),
            similar: similar_names(name, self.functions.keys()),
        })?;

        if def.args.len() != args.len() {
            return Err(ExecError::ArgCount {
                name: def.name.clone(),
                expected: def.args.len(),
                got: args.len(),
            }
            .into());
        }

        for (index, (expected, arg)) in def.args.iter().zip(args).enumerate() {
            let accepted = match expected {
                ArgType::Expression => true,
                ArgType::String => arg.as_word().is_some(),
                ArgType::Integer => is_integer_literal(arg),
            };
            if !accepted {
                return Err(ExecError::ArgType {
                    name: def.name.clone(),
                    index,
                    expected: *expected,
                    got: ArgType::Expression,
                }
                .into());
            }
        }

        Ok(def)
    }
}

impl FromIterator<FunctionDef> for FunctionTable {
    fn from_iter<I: IntoIterator<Item = FunctionDef>>(iter: I) -> Self {
        let mut table = Self::new();
        for def in iter {
            table.insert(def);
        }
        table
    }
}

fn is_integer_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Number(t) => !t.text.contains('.'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magic_core::{Position, Token, TokenKind};

    fn sym(s: &str) -> Expr {
        Expr::Symbol(Token::new(TokenKind::Identifier, s, Position::default()))
    }

    fn num(s: &str) -> Expr {
        Expr::Number(Token::new(TokenKind::Number, s, Position::default()))
    }

    fn table() -> FunctionTable {
        FunctionTable::new()
            .with_function(FunctionDef {
                name: "sin".to_string(),
                args: vec![ArgType::Expression],
                func: "sin".to_string(),
            })
            .with_function(FunctionDef {
                name: "diff".to_string(),
                args: vec![ArgType::Expression, ArgType::String],
                func: "derivative".to_string(),
            })
    }

    #[test]
    fn test_resolve_ok() {
        let t = table();
        let def = t.resolve("diff", &[num("2"), sym("x")]).unwrap();
        assert_eq!(def.func, "derivative");
    }

    #[test]
    fn test_resolve_case_insensitive() {
        assert!(table().resolve("SIN", &[sym("x")]).is_ok());
    }

    #[test]
    fn test_resolve_arg_count() {
        let err = table().resolve("sin", &[]).unwrap_err();
        assert!(matches!(err, MagicError::Exec(ExecError::ArgCount { expected: 1, got: 0, .. })));
    }

    #[test]
    fn test_resolve_arg_type() {
        let err = table().resolve("diff", &[sym("x"), num("2")]).unwrap_err();
        assert!(matches!(
            err,
            MagicError::Exec(ExecError::ArgType { index: 1, expected: ArgType::String, .. })
        ));
    }

    #[test]
    fn test_unknown_function_suggests() {
        let err = table().resolve("sinn", &[sym("x")]).unwrap_err();
        match err {
            MagicError::Exec(ExecError::UnknownFunction { similar, .. }) => {
                assert_eq!(similar.first().map(String::as_str), Some("sin"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
