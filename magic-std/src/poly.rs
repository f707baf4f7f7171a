//! Multivariate polynomials with exact rational coefficients

use dashu_int::IBig;
use dashu_ratio::RBig;
use std::collections::BTreeMap;

/// Variable name to exponent; the empty monomial is the constant term
pub type Monomial = BTreeMap<String, u32>;

/// Largest exponent that is expanded; beyond it powers stay symbolic
pub const MAX_EXPONENT: u32 = 256;

/// Largest expanded polynomial; bigger products stay symbolic
pub const MAX_TERMS: usize = 4096;

/// Most coefficient products one multiplication may perform
const MAX_PRODUCTS: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, RBig>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(c: RBig) -> Self {
        let mut p = Self::zero();
        p.accumulate(Monomial::new(), c);
        p
    }

    pub fn variable(name: &str) -> Self {
        let mut mono = Monomial::new();
        mono.insert(name.to_string(), 1);
        let mut p = Self::zero();
        p.accumulate(mono, RBig::ONE);
        p
    }

    fn accumulate(&mut self, mono: Monomial, coeff: RBig) {
        let sum = match self.terms.remove(&mono) {
            Some(existing) => existing + coeff,
            None => coeff,
        };
        if sum != RBig::ZERO {
            self.terms.insert(mono, sum);
        }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// The value, if this polynomial has no variables
    pub fn as_constant(&self) -> Option<RBig> {
        match self.terms.len() {
            0 => Some(RBig::ZERO),
            1 => self.terms.get(&Monomial::new()).cloned(),
            _ => None,
        }
    }

    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let mut out = self.clone();
        for (mono, coeff) in &other.terms {
            out.accumulate(mono.clone(), coeff.clone());
        }
        out
    }

    pub fn neg(&self) -> Polynomial {
        self.scale(&-RBig::ONE)
    }

    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        self.add(&other.neg())
    }

    pub fn scale(&self, factor: &RBig) -> Polynomial {
        let mut out = Polynomial::zero();
        for (mono, coeff) in &self.terms {
            out.accumulate(mono.clone(), coeff * factor);
        }
        out
    }

    /// Product of two polynomials; `None` when an exponent overflows or
    /// the result grows past `MAX_TERMS`
    pub fn mul(&self, other: &Polynomial) -> Option<Polynomial> {
        if self.terms.len().saturating_mul(other.terms.len()) > MAX_PRODUCTS {
            return None;
        }
        let mut out = Polynomial::zero();
        for (m1, c1) in &self.terms {
            for (m2, c2) in &other.terms {
                let mut mono = m1.clone();
                for (var, exp) in m2 {
                    let slot = mono.entry(var.clone()).or_insert(0);
                    *slot = slot.checked_add(*exp)?;
                }
                out.accumulate(mono, c1 * c2);
            }
            if out.terms.len() > MAX_TERMS {
                return None;
            }
        }
        Some(out)
    }

    pub fn pow(&self, exp: u32) -> Option<Polynomial> {
        let mut out = Polynomial::constant(RBig::ONE);
        let mut base = self.clone();
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                out = out.mul(&base)?;
            }
            e >>= 1;
            if e > 0 {
                base = base.mul(&base)?;
            }
        }
        Some(out)
    }

    pub fn derivative(&self, var: &str) -> Polynomial {
        let mut out = Polynomial::zero();
        for (mono, coeff) in &self.terms {
            let Some(&exp) = mono.get(var) else { continue };
            let mut reduced = mono.clone();
            if exp == 1 {
                reduced.remove(var);
            } else {
                reduced.insert(var.to_string(), exp - 1);
            }
            out.accumulate(reduced, coeff * &RBig::from(IBig::from(exp)));
        }
        out
    }

    /// Terms by descending total degree, then descending monomial order
    pub fn terms(&self) -> Vec<(&Monomial, &RBig)> {
        let mut terms: Vec<(&Monomial, &RBig)> = self.terms.iter().collect();
        terms.sort_by(|a, b| degree(b.0).cmp(&degree(a.0)).then_with(|| b.0.cmp(a.0)));
        terms
    }
}

fn degree(mono: &Monomial) -> u64 {
    mono.values().map(|&e| u64::from(e)).sum()
}
