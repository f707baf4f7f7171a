//! Query matcher
//!
//! Walks the terms of a parsed query down the schema trie in one pass.
//! There is no backtracking: the first step without an edge fails the
//! whole match at that term's position.

use crate::schema::{SchemaEntry, SchemaRegistry};
use dashu_int::IBig;
use magic_core::{ArgType, Arguments, BinOp, Expr, MatchError, Position, Program, Statement, Value};

/// A query accepted by the schema
#[derive(Debug, Clone)]
pub struct Match<'r> {
    pub entry: &'r SchemaEntry,
    pub args: Arguments,
}

impl Match<'_> {
    pub fn operation(&self) -> &str {
        &self.entry.operation
    }
}

/// Match the first statement of `program`; `None` for an empty query
pub fn match_program<'r>(
    registry: &'r SchemaRegistry,
    program: &Program,
) -> Result<Option<Match<'r>>, MatchError> {
    match program.statements.first() {
        Some(statement) => match_statement(registry, statement).map(Some),
        None => Ok(None),
    }
}

pub fn match_statement<'r>(
    registry: &'r SchemaRegistry,
    statement: &Statement,
) -> Result<Match<'r>, MatchError> {
    let mut node = registry.root();
    let mut args = Arguments::new();
    let mut position = Position::default();

    for term in statement.terms() {
        position = term.position();
        node = match term.as_word() {
            Some(word) => match (node.word(word), node.slot()) {
                (Some(child), _) => child,
                (None, Some(edge)) => {
                    tracing::debug!(word, index = edge.slot.index, "word captured as text argument");
                    args.insert(edge.slot.index, Value::Text(word.to_string()));
                    &edge.child
                }
                (None, None) => {
                    return Err(MatchError::NoEdge { found: word.to_string(), position });
                }
            },
            None => match node.slot() {
                Some(edge) => {
                    args.insert(edge.slot.index, capture(term, edge.slot.ty)?);
                    &edge.child
                }
                None => {
                    return Err(MatchError::NoEdge { found: term.to_string(), position });
                }
            },
        };
    }

    match node.terminal() {
        Some(entry) => {
            tracing::debug!(operation = %entry.operation, args = args.len(), "query matched");
            Ok(Match { entry, args })
        }
        None => Err(MatchError::Incomplete { position }),
    }
}

/// Convert a term to the declared slot type
fn capture(term: &Expr, ty: ArgType) -> Result<Value, MatchError> {
    match ty {
        ArgType::Expression => Ok(Value::Expression(term.clone())),
        ArgType::String => Ok(Value::Text(match term {
            Expr::Number(t) | Expr::Symbol(t) => t.text.clone(),
            _ => term.to_string(),
        })),
        ArgType::Integer => integer(term).map(Value::Integer).ok_or_else(|| {
            MatchError::NotInteger { found: term.to_string(), position: term.position() }
        }),
    }
}

/// `12`, or `-12` as the parser builds it
fn integer(term: &Expr) -> Option<IBig> {
    match term {
        Expr::Number(t) if !t.text.contains('.') => t.text.parse().ok(),
        Expr::Binary { op: BinOp::Mul, left, right } => match (left.as_ref(), right.as_ref()) {
            (Expr::Number(sign), Expr::Number(_)) if sign.text == "-1" => {
                integer(right).map(|n| -n)
            }
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn registry(patterns: &[(&str, &str)]) -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        for (pattern, operation) in patterns {
            registry.register(pattern, "{output}", operation, "", "").unwrap();
        }
        registry
    }

    fn run<'r>(registry: &'r SchemaRegistry, query: &str) -> Result<Match<'r>, MatchError> {
        let program = parse(query).unwrap();
        match_program(registry, &program).map(|m| m.unwrap())
    }

    #[test]
    fn test_reduce_captures_expression() {
        let registry = registry(&[("reduce {0:expression}", "reduce")]);
        let m = run(&registry, "reduce 3*x + 5*x").unwrap();
        assert_eq!(m.operation(), "reduce");
        assert_eq!(m.args.len(), 1);
        let captured = m.args.get(0).and_then(Value::as_expression).unwrap();
        let standalone = parse("3*x + 5*x").unwrap().statements[0].phrases[0].terms[0].clone();
        // same tree, different source columns
        assert_eq!(captured.to_string(), standalone.to_string());
        assert_eq!(captured.position(), Position::new(1, 8));
        assert_eq!(standalone.position(), Position::new(1, 1));
    }

    #[test]
    fn test_failed_match_leaves_registry_usable() {
        let registry = registry(&[("reduce {0:expression}", "reduce")]);
        let before = registry.root().clone();
        assert!(matches!(
            run(&registry, "expand x"),
            Err(MatchError::NoEdge { ref found, .. }) if found == "expand"
        ));
        assert_eq!(registry.root(), &before);
        assert_eq!(run(&registry, "reduce 1").unwrap().operation(), "reduce");
    }

    #[test]
    fn test_incomplete_query() {
        let registry = registry(&[("reduce {0:expression}", "reduce")]);
        assert_eq!(
            run(&registry, "reduce").unwrap_err(),
            MatchError::Incomplete { position: Position::new(1, 1) }
        );
    }

    #[test]
    fn test_extra_terms_fail() {
        let registry = registry(&[("reduce {0:expression}", "reduce")]);
        assert!(matches!(
            run(&registry, "reduce x y"),
            Err(MatchError::NoEdge { ref found, position }) if found == "y" && position == Position::new(1, 10)
        ));
    }

    #[test]
    fn test_word_falls_back_to_slot_as_text() {
        let registry = registry(&[("derivative of {0:expression} by {1:string}", "derivative")]);
        let m = run(&registry, "derivative of x^3 by x").unwrap();
        assert_eq!(m.args.get(1), Some(&Value::Text("x".to_string())));
        assert!(matches!(m.args.get(0), Some(Value::Expression(_))));
    }

    #[test]
    fn test_literal_word_preferred_over_slot() {
        let registry = registry(&[
            ("reduce {0:expression}", "reduce"),
            ("reduce fraction {0:expression}", "reduce_fraction"),
        ]);
        assert_eq!(run(&registry, "reduce fraction x/2").unwrap().operation(), "reduce_fraction");
        assert_eq!(run(&registry, "reduce x/2").unwrap().operation(), "reduce");
    }

    #[test]
    fn test_integer_slot() {
        let registry = registry(&[("root {0:integer} of {1:expression}", "root")]);
        let m = run(&registry, "root 3 of x").unwrap();
        assert_eq!(m.args.get(0), Some(&Value::Integer(IBig::from(3))));

        // a bare "-2" after a word would parse as a subtraction
        let m = run(&registry, "root (-2) of x").unwrap();
        assert_eq!(m.args.get(0), Some(&Value::Integer(IBig::from(-2))));

        assert!(matches!(
            run(&registry, "root 2.5 of x"),
            Err(MatchError::NotInteger { ref found, .. }) if found == "2.5"
        ));
    }

    #[test]
    fn test_string_slot_keeps_source_text() {
        let registry = registry(&[("say {0:string}", "say")]);
        let m = run(&registry, "say 42").unwrap();
        assert_eq!(m.args.get(0), Some(&Value::Text("42".to_string())));
        let m = run(&registry, "say 2x").unwrap();
        assert_eq!(m.args.get(0), Some(&Value::Text("2*x".to_string())));
    }

    #[test]
    fn test_number_needs_a_slot() {
        let registry = registry(&[("reduce now", "reduce")]);
        assert!(matches!(run(&registry, "reduce 1"), Err(MatchError::NoEdge { .. })));
    }

    #[test]
    fn test_compound_list_terms() {
        let registry = registry(&[("gcd of {0:expression} {1:expression}", "gcd")]);
        let m = run(&registry, "gcd of x^2 - 1, x - 1").unwrap();
        assert_eq!(m.args.len(), 2);
    }

    #[test]
    fn test_empty_query() {
        let registry = registry(&[("reduce {0:expression}", "reduce")]);
        assert!(match_program(&registry, &parse("").unwrap()).unwrap().is_none());
    }
}
