//! Reference computation engine
//!
//! Terms are symbolic trees stored in a per-interpreter arena. `reduce`
//! and `expand` normalise every polynomial sub-expression into canonical
//! expanded form with exact rational coefficients; anything else (function
//! applications, symbolic exponents, division by a non-constant) stays
//! symbolic.

use crate::poly::{Polynomial, MAX_EXPONENT};
use crate::print::Printer;
use dashu_int::{IBig, UBig};
use dashu_ratio::RBig;
use magic_core::{BinOp, EngineError};
use magic_engine::{Engine, Scope, Term};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Num(RBig),
    Sym(String),
    Op(BinOp, Term, Term),
    Apply(String, Vec<Term>),
}

/// Builtins kept symbolic, with their arity
const ELEMENTARY: &[(&str, usize)] = &[
    ("sin", 1),
    ("cos", 1),
    ("tan", 1),
    ("asin", 1),
    ("acos", 1),
    ("atan", 1),
    ("sinh", 1),
    ("cosh", 1),
    ("tanh", 1),
    ("asinh", 1),
    ("acosh", 1),
    ("atanh", 1),
    ("ln", 1),
    ("exp", 1),
    ("abs", 1),
    ("sqrt", 1),
    ("root", 2),
];

/// Engine over exact rational polynomials
#[derive(Debug, Clone, Copy, Default)]
pub struct PolyEngine;

impl Engine for PolyEngine {
    fn name(&self) -> &'static str {
        "poly"
    }

    fn open_scope(&self) -> Result<Box<dyn Scope>, EngineError> {
        Ok(Box::new(PolyScope::new()))
    }
}

#[derive(Debug, Default)]
pub struct PolyScope {
    nodes: Vec<Node>,
}

impl PolyScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live terms
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> Term {
        self.nodes.push(node);
        Term::new(self.nodes.len() - 1)
    }

    pub(crate) fn node(&self, term: Term) -> Result<&Node, EngineError> {
        self.nodes
            .get(term.index())
            .ok_or(EngineError::UnknownTerm(term.index()))
    }

    fn simplify(&mut self, term: Term) -> Result<Term, EngineError> {
        if let Some(poly) = self.to_poly(term)? {
            return Ok(self.from_poly(&poly));
        }
        match self.node(term)?.clone() {
            Node::Op(op, l, r) => {
                let l = self.simplify(l)?;
                let r = self.simplify(r)?;
                Ok(self.push(Node::Op(op, l, r)))
            }
            Node::Apply(name, args) => {
                let args = args
                    .into_iter()
                    .map(|a| self.simplify(a))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.push(Node::Apply(name, args)))
            }
            Node::Num(_) | Node::Sym(_) => Ok(term),
        }
    }

    fn to_poly(&self, term: Term) -> Result<Option<Polynomial>, EngineError> {
        let poly = match self.node(term)? {
            Node::Num(c) => Some(Polynomial::constant(c.clone())),
            Node::Sym(s) => Some(Polynomial::variable(s)),
            Node::Apply(..) | Node::Op(BinOp::Equal, ..) => None,
            Node::Op(op, l, r) => {
                let (Some(lp), Some(rp)) = (self.to_poly(*l)?, self.to_poly(*r)?) else {
                    return Ok(None);
                };
                match op {
                    BinOp::Add => Some(lp.add(&rp)),
                    BinOp::Sub => Some(lp.sub(&rp)),
                    BinOp::Mul => lp.mul(&rp),
                    BinOp::Div => match rp.as_constant() {
                        Some(c) if c == RBig::ZERO => return Err(EngineError::DivisionByZero),
                        Some(c) => Some(lp.scale(&(RBig::ONE / c))),
                        None => None,
                    },
                    BinOp::Pow => power(&lp, &rp)?,
                    BinOp::Equal => None,
                }
            }
        };
        Ok(poly)
    }

    fn from_poly(&mut self, poly: &Polynomial) -> Term {
        let mut acc: Option<Term> = None;
        for (mono, coeff) in poly.terms() {
            acc = Some(match acc {
                None => self.monomial(mono, coeff),
                Some(prev) => {
                    let negative = *coeff < RBig::ZERO;
                    let magnitude = if negative { -coeff.clone() } else { coeff.clone() };
                    let term = self.monomial(mono, &magnitude);
                    let op = if negative { BinOp::Sub } else { BinOp::Add };
                    self.push(Node::Op(op, prev, term))
                }
            });
        }
        match acc {
            Some(term) => term,
            None => self.push(Node::Num(RBig::ZERO)),
        }
    }

    fn monomial(&mut self, mono: &crate::poly::Monomial, coeff: &RBig) -> Term {
        let mut factors = Vec::with_capacity(mono.len());
        for (var, exp) in mono {
            let base = self.push(Node::Sym(var.clone()));
            let factor = if *exp == 1 {
                base
            } else {
                let e = self.push(Node::Num(RBig::from(IBig::from(*exp))));
                self.push(Node::Op(BinOp::Pow, base, e))
            };
            factors.push(factor);
        }
        let product = factors
            .into_iter()
            .reduce(|a, b| self.push(Node::Op(BinOp::Mul, a, b)));
        match product {
            None => self.push(Node::Num(coeff.clone())),
            Some(p) if *coeff == RBig::ONE => p,
            Some(p) => {
                let c = self.push(Node::Num(coeff.clone()));
                self.push(Node::Op(BinOp::Mul, c, p))
            }
        }
    }

    fn derivative(&mut self, f: Term, var: Term) -> Result<Term, EngineError> {
        let Node::Sym(name) = self.node(var)?.clone() else {
            return Err(EngineError::InvalidArgument(
                "derivative variable must be a symbol".to_string(),
            ));
        };
        match self.to_poly(f)? {
            Some(poly) => Ok(self.from_poly(&poly.derivative(&name))),
            None => Err(EngineError::Unsupported("derivative of a non-polynomial expression".to_string())),
        }
    }
}

impl Scope for PolyScope {
    fn number(&mut self, literal: &str) -> Result<Term, EngineError> {
        let value = parse_rational(literal)?;
        Ok(self.push(Node::Num(value)))
    }

    fn symbol(&mut self, name: &str) -> Result<Term, EngineError> {
        if name.is_empty() {
            return Err(EngineError::InvalidArgument("empty symbol name".to_string()));
        }
        Ok(self.push(Node::Sym(name.to_string())))
    }

    fn apply(&mut self, op: BinOp, lhs: Term, rhs: Term) -> Result<Term, EngineError> {
        self.node(lhs)?;
        self.node(rhs)?;
        Ok(self.push(Node::Op(op, lhs, rhs)))
    }

    fn transform(&mut self, name: &str, args: &[Term]) -> Result<Term, EngineError> {
        for arg in args {
            self.node(*arg)?;
        }
        match name {
            "reduce" | "expand" | "simplify" => {
                let [t] = args else { return Err(arity(name, 1, args.len())) };
                self.simplify(*t)
            }
            "derivative" | "diff" => {
                let [f, var] = args else { return Err(arity(name, 2, args.len())) };
                self.derivative(*f, *var)
            }
            _ => match ELEMENTARY.iter().find(|(n, _)| *n == name) {
                Some(&(_, expected)) if expected != args.len() => Err(arity(name, expected, args.len())),
                Some(_) => Ok(self.push(Node::Apply(name.to_string(), args.to_vec()))),
                None => Err(EngineError::Unsupported(name.to_string())),
            },
        }
    }

    fn to_text(&self, term: Term) -> Result<String, EngineError> {
        Printer::text(self).print(term)
    }

    fn to_latex(&self, term: Term) -> Result<String, EngineError> {
        Printer::latex(self).print(term)
    }

    fn reset(&mut self) {
        self.nodes.clear();
    }
}

fn arity(name: &str, expected: usize, got: usize) -> EngineError {
    EngineError::InvalidArgument(format!("{} expects {} arguments, got {}", name, expected, got))
}

/// Integer powers of polynomials; `None` when the exponent is symbolic,
/// fractional or too large, or the expansion is too big
fn power(base: &Polynomial, exp: &Polynomial) -> Result<Option<Polynomial>, EngineError> {
    let Some(e) = exp.as_constant() else { return Ok(None) };
    if e.denominator() != &UBig::ONE {
        return Ok(None);
    }
    let n = e.numerator().clone();
    if n >= IBig::ZERO {
        return Ok(match u32::try_from(n) {
            Ok(k) if k <= MAX_EXPONENT => base.pow(k),
            _ => None,
        });
    }

    // Negative exponents only fold for constant bases
    let Some(b) = base.as_constant() else { return Ok(None) };
    if b == RBig::ZERO {
        return Err(EngineError::DivisionByZero);
    }
    match u32::try_from(-n) {
        Ok(k) if k <= MAX_EXPONENT => Ok(Polynomial::constant(b)
            .pow(k)
            .and_then(|p| p.as_constant())
            .map(|denominator| Polynomial::constant(RBig::ONE / denominator))),
        _ => Ok(None),
    }
}

/// Parse `12`, `-1`, `3.25` or `3.` into an exact rational
pub(crate) fn parse_rational(literal: &str) -> Result<RBig, EngineError> {
    let invalid = || EngineError::InvalidArgument(format!("'{}' is not a number", literal));
    let (negative, digits) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    if (whole.is_empty() && frac.is_empty())
        || !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }
    let numerator: IBig = format!("{}{}", whole, frac).parse().map_err(|_| invalid())?;
    let denominator = UBig::from(10u8).pow(frac.len());
    let value = RBig::from_parts(numerator, denominator);
    Ok(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduce_text(scope: &mut PolyScope, term: Term) -> String {
        let r = scope.transform("reduce", &[term]).unwrap();
        scope.to_text(r).unwrap()
    }

    #[test]
    fn test_parse_rational() {
        assert_eq!(parse_rational("3.25").unwrap(), RBig::from_parts(IBig::from(13), UBig::from(4u8)));
        assert_eq!(parse_rational("-1").unwrap(), -RBig::ONE);
        assert_eq!(parse_rational("3.").unwrap(), RBig::from(IBig::from(3)));
        assert!(parse_rational("x").is_err());
        assert!(parse_rational("").is_err());
    }

    #[test]
    fn test_reduce_like_terms() {
        let mut s = PolyScope::new();
        let three = s.number("3").unwrap();
        let five = s.number("5").unwrap();
        let x = s.symbol("x").unwrap();
        let a = s.apply(BinOp::Mul, three, x).unwrap();
        let b = s.apply(BinOp::Mul, five, x).unwrap();
        let sum = s.apply(BinOp::Add, a, b).unwrap();
        assert_eq!(reduce_text(&mut s, sum), "8*x");
    }

    #[test]
    fn test_reduce_cancels_to_zero() {
        let mut s = PolyScope::new();
        let x = s.symbol("x").unwrap();
        let diff = s.apply(BinOp::Sub, x, x).unwrap();
        assert_eq!(reduce_text(&mut s, diff), "0");
    }

    #[test]
    fn test_division_by_zero_constant() {
        let mut s = PolyScope::new();
        let x = s.symbol("x").unwrap();
        let zero = s.number("0").unwrap();
        let q = s.apply(BinOp::Div, x, zero).unwrap();
        assert_eq!(s.transform("reduce", &[q]), Err(EngineError::DivisionByZero));
    }

    #[test]
    fn test_function_application_stays_symbolic() {
        let mut s = PolyScope::new();
        let x = s.symbol("x").unwrap();
        let sin = s.transform("sin", &[x]).unwrap();
        let sum = s.apply(BinOp::Add, sin, sin).unwrap();
        assert_eq!(reduce_text(&mut s, sum), "sin(x) + sin(x)");
    }

    #[test]
    fn test_derivative() {
        let mut s = PolyScope::new();
        let x = s.symbol("x").unwrap();
        let two = s.number("2").unwrap();
        let sq = s.apply(BinOp::Pow, x, two).unwrap();
        let d = s.transform("derivative", &[sq, x]).unwrap();
        assert_eq!(s.to_text(d).unwrap(), "2*x");
    }

    #[test]
    fn test_unsupported_transform() {
        let mut s = PolyScope::new();
        let x = s.symbol("x").unwrap();
        assert_eq!(
            s.transform("factor", &[x]),
            Err(EngineError::Unsupported("factor".to_string()))
        );
    }

    #[test]
    fn test_reset_invalidates_handles() {
        let mut s = PolyScope::new();
        let x = s.symbol("x").unwrap();
        s.reset();
        assert!(s.is_empty());
        assert_eq!(s.to_text(x), Err(EngineError::UnknownTerm(0)));
    }

    #[test]
    fn test_overflowing_power_stays_symbolic() {
        let mut s = PolyScope::new();
        let mut term = s.symbol("x").unwrap();
        for _ in 0..4 {
            let e = s.number("256").unwrap();
            term = s.apply(BinOp::Pow, term, e).unwrap();
        }
        let text = reduce_text(&mut s, term);
        assert!(text.ends_with("^256"), "{}", text);
        assert!(text.contains("x^16777216"), "{}", text);
    }

    #[test]
    fn test_oversized_expansion_stays_symbolic() {
        let mut s = PolyScope::new();
        let mut sum = s.symbol("a").unwrap();
        for v in ["b", "c", "d", "e", "f", "g", "h"] {
            let t = s.symbol(v).unwrap();
            sum = s.apply(BinOp::Add, sum, t).unwrap();
        }
        let e = s.number("256").unwrap();
        let p = s.apply(BinOp::Pow, sum, e).unwrap();
        assert!(reduce_text(&mut s, p).ends_with("^256"));
    }
}
