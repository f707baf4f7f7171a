//! Pretty-printers for engine terms: plain text and LaTeX

use crate::engine::{Node, PolyScope};
use dashu_int::{IBig, UBig};
use dashu_ratio::RBig;
use magic_core::{BinOp, EngineError};
use magic_engine::Term;

const ATOM: u8 = u8::MAX;

/// Functions with a dedicated LaTeX command
const LATEX_FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "sinh", "cosh", "tanh", "ln", "log", "exp",
];

pub(crate) struct Printer<'a> {
    scope: &'a PolyScope,
    latex: bool,
}

impl<'a> Printer<'a> {
    pub fn text(scope: &'a PolyScope) -> Self {
        Self { scope, latex: false }
    }

    pub fn latex(scope: &'a PolyScope) -> Self {
        Self { scope, latex: true }
    }

    pub fn print(&self, term: Term) -> Result<String, EngineError> {
        let mut out = String::new();
        self.write(term, &mut out)?;
        Ok(out)
    }

    fn write(&self, term: Term, out: &mut String) -> Result<(), EngineError> {
        match self.scope.node(term)? {
            Node::Num(c) => self.write_number(c, out),
            Node::Sym(s) => out.push_str(s),
            Node::Op(op, l, r) => self.write_op(*op, *l, *r, out)?,
            Node::Apply(name, args) => self.write_apply(name, args, out)?,
        }
        Ok(())
    }

    fn write_number(&self, c: &RBig, out: &mut String) {
        if !self.latex || c.denominator() == &UBig::ONE {
            out.push_str(&c.to_string());
            return;
        }
        let numerator = c.numerator();
        let magnitude = if *numerator < IBig::ZERO {
            out.push('-');
            -numerator.clone()
        } else {
            numerator.clone()
        };
        out.push_str(&format!("\\frac{{{}}}{{{}}}", magnitude, c.denominator()));
    }

    fn write_op(&self, op: BinOp, l: Term, r: Term, out: &mut String) -> Result<(), EngineError> {
        if op == BinOp::Mul && self.is_minus_one(l)? {
            out.push('-');
            let parens = self.precedence(r)? < 2;
            return self.write_operand(r, parens, out);
        }
        if self.latex && op == BinOp::Div {
            out.push_str("\\frac{");
            self.write(l, out)?;
            out.push_str("}{");
            self.write(r, out)?;
            out.push('}');
            return Ok(());
        }

        let prec = op_precedence(op);
        let left_parens = self.precedence(l)? < prec
            || (op == BinOp::Pow && self.precedence(l)? == prec);
        let right_parens = self.precedence(r)? < prec
            || (matches!(op, BinOp::Sub | BinOp::Div) && self.precedence(r)? == prec);

        self.write_operand(l, left_parens, out)?;
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Equal => {
                out.push_str(&format!(" {} ", op.symbol()));
                self.write_operand(r, right_parens, out)
            }
            BinOp::Mul => {
                if !self.latex {
                    out.push('*');
                } else if self.starts_with_number(r)? {
                    out.push_str(" \\cdot ");
                }
                self.write_operand(r, right_parens, out)
            }
            BinOp::Div => {
                out.push('/');
                self.write_operand(r, right_parens, out)
            }
            BinOp::Pow if self.latex => {
                out.push_str("^{");
                self.write(r, out)?;
                out.push('}');
                Ok(())
            }
            BinOp::Pow => {
                out.push('^');
                self.write_operand(r, right_parens, out)
            }
        }
    }

    fn write_apply(&self, name: &str, args: &[Term], out: &mut String) -> Result<(), EngineError> {
        if self.latex {
            match (name, args) {
                ("sqrt", [x]) => {
                    out.push_str("\\sqrt{");
                    self.write(*x, out)?;
                    out.push('}');
                    return Ok(());
                }
                ("root", [x, n]) => {
                    out.push_str("\\sqrt[");
                    self.write(*n, out)?;
                    out.push_str("]{");
                    self.write(*x, out)?;
                    out.push('}');
                    return Ok(());
                }
                _ if LATEX_FUNCTIONS.contains(&name) => out.push_str(&format!("\\{}\\left(", name)),
                _ => out.push_str(&format!("\\operatorname{{{}}}\\left(", name)),
            }
        } else {
            out.push_str(name);
            out.push('(');
        }
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write(*arg, out)?;
        }
        out.push_str(if self.latex { "\\right)" } else { ")" });
        Ok(())
    }

    fn write_operand(&self, term: Term, parens: bool, out: &mut String) -> Result<(), EngineError> {
        if !parens {
            return self.write(term, out);
        }
        out.push_str(if self.latex { "\\left(" } else { "(" });
        self.write(term, out)?;
        out.push_str(if self.latex { "\\right)" } else { ")" });
        Ok(())
    }

    fn precedence(&self, term: Term) -> Result<u8, EngineError> {
        let prec = match self.scope.node(term)? {
            Node::Num(c) if *c < RBig::ZERO => 1,
            Node::Num(c) if c.denominator() != &UBig::ONE && !self.latex => 2,
            Node::Num(_) | Node::Sym(_) | Node::Apply(..) => ATOM,
            Node::Op(BinOp::Mul, l, _) if self.is_minus_one(*l)? => 1,
            Node::Op(BinOp::Div, ..) if self.latex => ATOM,
            Node::Op(op, ..) => op_precedence(*op),
        };
        Ok(prec)
    }

    fn is_minus_one(&self, term: Term) -> Result<bool, EngineError> {
        Ok(matches!(self.scope.node(term)?, Node::Num(c) if *c == -RBig::ONE))
    }

    fn starts_with_number(&self, term: Term) -> Result<bool, EngineError> {
        match self.scope.node(term)? {
            Node::Num(_) => Ok(true),
            Node::Op(_, l, _) => self.starts_with_number(*l),
            Node::Sym(_) | Node::Apply(..) => Ok(false),
        }
    }
}

fn op_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Equal => 0,
        BinOp::Add | BinOp::Sub => 1,
        BinOp::Mul | BinOp::Div => 2,
        BinOp::Pow => 3,
    }
}

#[cfg(test)]
mod tests {
    use magic_core::BinOp;
    use magic_engine::Scope;

    use crate::engine::PolyScope;

    #[test]
    fn test_latex_implicit_product() {
        let mut s = PolyScope::new();
        let eight = s.number("8").unwrap();
        let x = s.symbol("x").unwrap();
        let p = s.apply(BinOp::Mul, eight, x).unwrap();
        assert_eq!(s.to_latex(p).unwrap(), "8x");
        assert_eq!(s.to_text(p).unwrap(), "8*x");
    }

    #[test]
    fn test_latex_fraction_and_power() {
        let mut s = PolyScope::new();
        let x = s.symbol("x").unwrap();
        let two = s.number("2").unwrap();
        let sq = s.apply(BinOp::Pow, x, two).unwrap();
        let q = s.apply(BinOp::Div, sq, two).unwrap();
        assert_eq!(s.to_latex(q).unwrap(), "\\frac{x^{2}}{2}");
        assert_eq!(s.to_text(q).unwrap(), "x^2/2");
    }

    #[test]
    fn test_text_parenthesises_sums() {
        let mut s = PolyScope::new();
        let x = s.symbol("x").unwrap();
        let one = s.number("1").unwrap();
        let sum = s.apply(BinOp::Add, x, one).unwrap();
        let prod = s.apply(BinOp::Mul, sum, x).unwrap();
        assert_eq!(s.to_text(prod).unwrap(), "(x + 1)*x");
        assert_eq!(s.to_latex(prod).unwrap(), "\\left(x + 1\\right)x");
    }

    #[test]
    fn test_negated_term() {
        let mut s = PolyScope::new();
        let m = s.number("-1").unwrap();
        let x = s.symbol("x").unwrap();
        let neg = s.apply(BinOp::Mul, m, x).unwrap();
        assert_eq!(s.to_text(neg).unwrap(), "-x");
    }

    #[test]
    fn test_latex_sqrt() {
        let mut s = PolyScope::new();
        let x = s.symbol("x").unwrap();
        let r = s.transform("sqrt", &[x]).unwrap();
        assert_eq!(s.to_latex(r).unwrap(), "\\sqrt{x}");
    }
}
