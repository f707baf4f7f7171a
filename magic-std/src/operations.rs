//! Standard operations
//!
//! Every standard operation forwards to one engine transform, reading
//! its parameters from the captured slots 0, 1, ... in order.

use magic_engine::prelude::*;

pub struct Transform {
    name: &'static str,
    builtin: &'static str,
    description: &'static str,
    args: &'static [ArgMeta],
}

impl Transform {
    pub const fn new(
        name: &'static str,
        builtin: &'static str,
        description: &'static str,
        args: &'static [ArgMeta],
    ) -> Self {
        Self { name, builtin, description, args }
    }
}

impl Operation for Transform {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: self.name,
            description: self.description,
            args: self.args,
            category: "algebra",
        }
    }

    fn execute(&self, args: &Arguments, ctx: &mut ExecContext<'_>) -> Result<Term, MagicError> {
        let mut terms = Vec::with_capacity(self.args.len());
        for (index, arg) in self.args.iter().enumerate() {
            let term = match arg.typ {
                ArgType::Expression => ctx.expression_arg(self.name, args, index)?,
                ArgType::Integer => ctx.integer_arg(self.name, args, index)?,
                ArgType::String => {
                    let name = ctx.text_arg(self.name, args, index)?;
                    ctx.scope.symbol(&name)?
                }
            };
            terms.push(term);
        }
        Ok(ctx.scope.transform(self.builtin, &terms)?)
    }
}

static ONE_EXPR: [ArgMeta; 1] = [ArgMeta::new("expr", ArgType::Expression, "Expression")];
static TWO_EXPR: [ArgMeta; 2] = [
    ArgMeta::new("a", ArgType::Expression, "First polynomial"),
    ArgMeta::new("b", ArgType::Expression, "Second polynomial"),
];
static RESULTANT_ARGS: [ArgMeta; 3] = [
    ArgMeta::new("a", ArgType::Expression, "First polynomial"),
    ArgMeta::new("b", ArgType::Expression, "Second polynomial"),
    ArgMeta::new("var", ArgType::String, "Variable to eliminate"),
];
static DERIVATIVE_ARGS: [ArgMeta; 2] = [
    ArgMeta::new("expr", ArgType::Expression, "Expression to differentiate"),
    ArgMeta::new("var", ArgType::String, "Variable of differentiation"),
];
static ROOT_ARGS: [ArgMeta; 2] = [
    ArgMeta::new("expr", ArgType::Expression, "Radicand"),
    ArgMeta::new("n", ArgType::Integer, "Index of the root"),
];

pub fn reduce() -> Transform {
    Transform::new("reduce", "reduce", "Combine like terms and fold constants", &ONE_EXPR)
}

pub fn expand() -> Transform {
    Transform::new("expand", "expand", "Expand products and integer powers", &ONE_EXPR)
}

pub fn factor() -> Transform {
    Transform::new("factor", "factor", "Factor a polynomial", &ONE_EXPR)
}

pub fn gcd() -> Transform {
    Transform::new("gcd", "gcd", "Greatest common divisor of two polynomials", &TWO_EXPR)
}

pub fn lcm() -> Transform {
    Transform::new("lcm", "lcm", "Least common multiple of two polynomials", &TWO_EXPR)
}

pub fn div() -> Transform {
    Transform::new("div", "div", "Polynomial division", &TWO_EXPR)
}

pub fn resultant() -> Transform {
    Transform::new("resultant", "resultant", "Resultant of two polynomials", &RESULTANT_ARGS)
}

pub fn derivative() -> Transform {
    Transform::new("derivative", "derivative", "Derivative with respect to a variable", &DERIVATIVE_ARGS)
}

pub fn root() -> Transform {
    Transform::new("root", "root", "n-th root", &ROOT_ARGS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PolyScope;
    use dashu_int::IBig;
    use magic_core::{ExecError, Position, Token, TokenKind};

    fn expr_of(word: &str) -> Value {
        Value::Expression(Expr::Symbol(Token::new(TokenKind::Identifier, word, Position::default())))
    }

    #[test]
    fn test_derivative_reads_slots_in_order() {
        let mut scope = PolyScope::new();
        let functions = FunctionTable::new();
        let mut ctx = ExecContext::new(&mut scope, &functions);
        let args: Arguments = vec![(0, expr_of("x")), (1, Value::Text("x".to_string()))]
            .into_iter()
            .collect();
        let term = derivative().execute(&args, &mut ctx).unwrap();
        assert_eq!(ctx.pretty(term, RenderMode::Text).unwrap(), "1");
    }

    #[test]
    fn test_missing_slot() {
        let mut scope = PolyScope::new();
        let functions = FunctionTable::new();
        let mut ctx = ExecContext::new(&mut scope, &functions);
        let args: Arguments = vec![(0, expr_of("x"))].into_iter().collect();
        let err = derivative().execute(&args, &mut ctx).unwrap_err();
        assert!(matches!(err, MagicError::Exec(ExecError::MissingArgument { index: 1, .. })));
    }

    #[test]
    fn test_root_rejects_text_index() {
        let mut scope = PolyScope::new();
        let functions = FunctionTable::new();
        let mut ctx = ExecContext::new(&mut scope, &functions);
        let args: Arguments = vec![(0, expr_of("x")), (1, Value::Text("n".to_string()))]
            .into_iter()
            .collect();
        let err = root().execute(&args, &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            MagicError::Exec(ExecError::ArgType { expected: ArgType::Integer, got: ArgType::String, .. })
        ));
    }

    #[test]
    fn test_root_with_integer() {
        let mut scope = PolyScope::new();
        let functions = FunctionTable::new();
        let mut ctx = ExecContext::new(&mut scope, &functions);
        let args: Arguments = vec![(0, expr_of("x")), (1, Value::Integer(IBig::from(3)))]
            .into_iter()
            .collect();
        let term = root().execute(&args, &mut ctx).unwrap();
        assert_eq!(ctx.pretty(term, RenderMode::Latex).unwrap(), "\\sqrt[3]{x}");
    }
}
