//! Execution Context

use crate::{FunctionTable, Scope, Term};
use magic_core::{ArgType, Arguments, ExecError, Expr, MagicError, Value};

/// Pretty-printer used for rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Plain text, e.g. `8*x + 3`
    #[default]
    Text,
    /// Typeset markup, e.g. `8x + 3`
    Latex,
}

/// Execution context passed to operations
pub struct ExecContext<'a> {
    pub scope: &'a mut dyn Scope,
    pub functions: &'a FunctionTable,
}

impl<'a> ExecContext<'a> {
    pub fn new(scope: &'a mut dyn Scope, functions: &'a FunctionTable) -> Self {
        Self { scope, functions }
    }

    /// Build the engine term for a parsed expression
    pub fn compile(&mut self, expr: &Expr) -> Result<Term, MagicError> {
        match expr {
            Expr::Number(t) => Ok(self.scope.number(&t.text)?),
            Expr::Symbol(t) => Ok(self.scope.symbol(&t.text)?),
            Expr::Binary { op, left, right } => {
                let lhs = self.compile(left)?;
                let rhs = self.compile(right)?;
                Ok(self.scope.apply(*op, lhs, rhs)?)
            }
            Expr::Call { name, args } => {
                let functions = self.functions;
                let def = functions.resolve(&name.text, args)?;
                let terms = args
                    .iter()
                    .map(|a| self.compile(a))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.scope.transform(&def.func, &terms)?)
            }
        }
    }

    /// Engine term for any captured value.
    ///
    /// Text becomes a symbol, so a literal word captured by the matcher's
    /// fallback still reaches the engine.
    pub fn term(&mut self, value: &Value) -> Result<Term, MagicError> {
        match value {
            Value::Expression(e) => self.compile(e),
            Value::Text(s) => Ok(self.scope.symbol(s)?),
            Value::Integer(i) => Ok(self.scope.number(&i.to_string())?),
        }
    }

    /// Expression argument at `index`
    pub fn expression_arg(
        &mut self,
        operation: &str,
        args: &Arguments,
        index: usize,
    ) -> Result<Term, MagicError> {
        let value = required(operation, args, index)?;
        self.term(value)
    }

    /// String argument at `index`; a bare symbol is accepted as its name
    pub fn text_arg(
        &self,
        operation: &str,
        args: &Arguments,
        index: usize,
    ) -> Result<String, MagicError> {
        match required(operation, args, index)? {
            Value::Text(s) => Ok(s.clone()),
            Value::Expression(e) => match e.as_word() {
                Some(word) => Ok(word.to_string()),
                None => Err(arg_type(operation, index, ArgType::String, ArgType::Expression)),
            },
            Value::Integer(_) => Err(arg_type(operation, index, ArgType::String, ArgType::Integer)),
        }
    }

    /// Integer argument at `index`; an integer literal expression is accepted
    pub fn integer_arg(
        &mut self,
        operation: &str,
        args: &Arguments,
        index: usize,
    ) -> Result<Term, MagicError> {
        match required(operation, args, index)? {
            Value::Integer(i) => Ok(self.scope.number(&i.to_string())?),
            Value::Expression(e @ Expr::Number(t)) if !t.text.contains('.') => self.compile(e),
            other => Err(arg_type(operation, index, ArgType::Integer, other.arg_type())),
        }
    }

    pub fn pretty(&self, term: Term, mode: RenderMode) -> Result<String, MagicError> {
        let text = match mode {
            RenderMode::Text => self.scope.to_text(term)?,
            RenderMode::Latex => self.scope.to_latex(term)?,
        };
        Ok(text)
    }
}

fn required<'v>(operation: &str, args: &'v Arguments, index: usize) -> Result<&'v Value, MagicError> {
    args.get(index).ok_or_else(|| {
        ExecError::MissingArgument { name: operation.to_string(), index }.into()
    })
}

fn arg_type(operation: &str, index: usize, expected: ArgType, got: ArgType) -> MagicError {
    ExecError::ArgType { name: operation.to_string(), index, expected, got }.into()
}
