//! Canonical normalization.
//!
//! Subtraction, negation, division and roots are rewritten into sums,
//! products and powers; nested sums and products are flattened; rational
//! constants are folded exactly; like terms and like factors are collected;
//! operands are sorted. Two expressions with the same canonical form have the
//! same value wherever both are defined.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use quizcheck_core::ExpressionError;

use crate::ast::{Constant, Expr, Func};

/// Integer exponents above this stay symbolic instead of being expanded.
const MAX_EXACT_EXPONENT: u32 = 1024;
/// Largest root index tried exactly.
const MAX_EXACT_ROOT: u32 = 64;
/// Folded powers may not grow past this many bits; larger results stay
/// symbolic.
const MAX_EXACT_BITS: u64 = 4096;

pub fn simplify(expr: &Expr) -> Result<Expr, ExpressionError> {
    let out = match expr {
        Expr::Number(_) | Expr::Symbol(_) | Expr::Constant(_) => expr.clone(),
        Expr::Neg(a) => product(vec![Expr::integer(-1), simplify(a)?])?,
        Expr::Add(a, b) => sum(vec![simplify(a)?, simplify(b)?]),
        Expr::Sub(a, b) => {
            let negated = product(vec![Expr::integer(-1), simplify(b)?])?;
            sum(vec![simplify(a)?, negated])
        }
        Expr::Mul(a, b) => product(vec![simplify(a)?, simplify(b)?])?,
        Expr::Div(a, b) => {
            let reciprocal = power(simplify(b)?, Expr::integer(-1))?;
            product(vec![simplify(a)?, reciprocal])?
        }
        Expr::Pow(a, b) => power(simplify(a)?, simplify(b)?)?,
        Expr::Root(radicand, index) => {
            let exponent = power(simplify(index)?, Expr::integer(-1))?;
            power(simplify(radicand)?, exponent)?
        }
        Expr::Func(func, arg) => function(*func, simplify(arg)?),
        Expr::Sum(terms) => sum(terms.iter().map(simplify).collect::<Result<_, _>>()?),
        Expr::Product(factors) => product(factors.iter().map(simplify).collect::<Result<_, _>>()?)?,
    };
    Ok(out)
}

/// Split a canonical term into its rational coefficient and the rest.
fn split_coefficient(term: Expr) -> (BigRational, Expr) {
    if let Expr::Product(factors) = &term {
        if let Some((Expr::Number(coeff), rest)) = factors.split_first() {
            let body = match rest {
                [single] => single.clone(),
                _ => Expr::Product(rest.to_vec()),
            };
            return (coeff.clone(), body);
        }
    }
    (BigRational::one(), term)
}

fn with_coefficient(coeff: BigRational, body: Expr) -> Expr {
    if coeff.is_one() {
        return body;
    }
    match body {
        Expr::Product(mut factors) => {
            factors.insert(0, Expr::Number(coeff));
            Expr::Product(factors)
        }
        other => Expr::Product(vec![Expr::Number(coeff), other]),
    }
}

/// Canonical sum of already-canonical terms.
fn sum(terms: Vec<Expr>) -> Expr {
    let mut constant = BigRational::zero();
    let mut collected: BTreeMap<Expr, BigRational> = BTreeMap::new();

    let flat = terms.into_iter().flat_map(|t| match t {
        Expr::Sum(inner) => inner,
        other => vec![other],
    });
    for term in flat {
        match term {
            Expr::Number(n) => constant += n,
            other => {
                let (coeff, body) = split_coefficient(other);
                *collected.entry(body).or_insert_with(BigRational::zero) += coeff;
            }
        }
    }

    let mut out: Vec<Expr> = collected
        .into_iter()
        .filter(|(_, coeff)| !coeff.is_zero())
        .map(|(body, coeff)| with_coefficient(coeff, body))
        .collect();
    if !constant.is_zero() {
        out.push(Expr::Number(constant));
    }
    out.sort();

    match out.len() {
        0 => Expr::zero(),
        1 => out.remove(0),
        _ => Expr::Sum(out),
    }
}

/// Canonical product of already-canonical factors.
fn product(factors: Vec<Expr>) -> Result<Expr, ExpressionError> {
    let mut coeff = BigRational::one();
    let mut exponents: BTreeMap<Expr, Vec<Expr>> = BTreeMap::new();

    let flat = factors.into_iter().flat_map(|f| match f {
        Expr::Product(inner) => inner,
        other => vec![other],
    });
    for factor in flat {
        match factor {
            Expr::Number(n) => coeff *= n,
            Expr::Pow(base, exp) => exponents.entry(*base).or_default().push(*exp),
            other => exponents.entry(other).or_default().push(Expr::one()),
        }
    }
    if coeff.is_zero() {
        return Ok(Expr::zero());
    }

    let mut out = Vec::new();
    for (base, exps) in exponents {
        match power(base, sum(exps))? {
            Expr::Number(n) => coeff *= n,
            Expr::Product(inner) => {
                for factor in inner {
                    match factor {
                        Expr::Number(n) => coeff *= n,
                        other => out.push(other),
                    }
                }
            }
            other => out.push(other),
        }
    }
    if coeff.is_zero() {
        return Ok(Expr::zero());
    }
    out.sort();

    if out.is_empty() {
        return Ok(Expr::Number(coeff));
    }
    if coeff.is_one() && out.len() == 1 {
        return Ok(out.remove(0));
    }
    if !coeff.is_one() {
        out.insert(0, Expr::Number(coeff));
    }
    Ok(Expr::Product(out))
}

/// Canonical `base ^ exp` of already-canonical operands.
fn power(base: Expr, exp: Expr) -> Result<Expr, ExpressionError> {
    if let Expr::Number(e) = &exp {
        if e.is_zero() {
            return Ok(Expr::one());
        }
        if e.is_one() {
            return Ok(base);
        }
    }

    match (base, exp) {
        (Expr::Number(b), Expr::Number(e)) => rational_power(b, e),
        // (b^e1)^n = b^(e1 n) for integer n
        (Expr::Pow(b, e1), Expr::Number(n)) if n.is_integer() => {
            let exponent = product(vec![*e1, Expr::Number(n)])?;
            power(*b, exponent)
        }
        (Expr::Product(factors), Expr::Number(n)) if n.is_integer() => {
            let powered = factors
                .into_iter()
                .map(|f| power(f, Expr::Number(n.clone())))
                .collect::<Result<Vec<_>, _>>()?;
            product(powered)
        }
        (base, exp) => Ok(Expr::Pow(Box::new(base), Box::new(exp))),
    }
}

fn rational_power(base: BigRational, exp: BigRational) -> Result<Expr, ExpressionError> {
    if base.is_zero() {
        if exp.is_negative() {
            return Err(ExpressionError::Evaluation("division by zero".into()));
        }
        return Ok(Expr::zero());
    }
    if base.is_one() {
        return Ok(Expr::one());
    }

    let symbolic = |base: BigRational, exp: BigRational| -> Result<Expr, ExpressionError> {
        Ok(Expr::Pow(
            Box::new(Expr::Number(base)),
            Box::new(Expr::Number(exp)),
        ))
    };

    let (Some(p), Some(q)) = (exp.numer().to_i32(), exp.denom().to_u32()) else {
        return symbolic(base, exp);
    };
    if p.unsigned_abs() > MAX_EXACT_EXPONENT || q > MAX_EXACT_ROOT {
        return symbolic(base, exp);
    }
    if !fits_exact(&base, p, q) {
        return symbolic(base, exp);
    }

    match exact_root(&base, q) {
        Some(root) => Ok(Expr::Number(root.pow(p))),
        None => symbolic(base, exp),
    }
}

/// Whether `base^(p/q)` is small enough to fold. Results no larger than the
/// base, such as reciprocals and roots, always fit.
fn fits_exact(base: &BigRational, p: i32, q: u32) -> bool {
    let p = u64::from(p.unsigned_abs());
    let q = u64::from(q);
    if p <= q {
        return true;
    }
    let bits = base.numer().bits().max(base.denom().bits());
    bits.saturating_mul(p) / q <= MAX_EXACT_BITS
}

/// The real `n`-th root of `value` when it is rational.
fn exact_root(value: &BigRational, n: u32) -> Option<BigRational> {
    if n == 1 {
        return Some(value.clone());
    }
    if value.is_negative() {
        return if n % 2 == 1 {
            exact_root(&-value, n).map(|r| -r)
        } else {
            None
        };
    }
    let root_of = |x: &BigInt| {
        let r = x.nth_root(n);
        (r.pow(n) == *x).then_some(r)
    };
    Some(BigRational::new(
        root_of(value.numer())?,
        root_of(value.denom())?,
    ))
}

fn function(func: Func, arg: Expr) -> Expr {
    let ten = BigRational::from_integer(BigInt::from(10));
    match (func, &arg) {
        (Func::Sin | Func::Tan, a) if a.is_zero() => Expr::zero(),
        (Func::Cos | Func::Exp, a) if a.is_zero() => Expr::one(),
        (Func::Ln | Func::Log, Expr::Number(n)) if n.is_one() => Expr::zero(),
        (Func::Ln, Expr::Constant(Constant::E)) => Expr::one(),
        (Func::Log, Expr::Number(n)) if *n == ten => Expr::one(),
        _ => Expr::Func(func, Box::new(arg)),
    }
}
