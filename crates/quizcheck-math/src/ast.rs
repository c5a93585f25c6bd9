//! Expression tree.
//!
//! The parser produces the binary variants (`Add`, `Sub`, `Mul`, ...) and
//! keeps the structure the learner wrote. [`crate::simplify`] rewrites a tree
//! into canonical form, which only uses `Number`, `Symbol`, `Constant`, `Pow`,
//! `Func`, `Sum` and `Product`.

use std::collections::BTreeSet;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// Greek letters accepted as symbols (`\alpha` etc). `\pi` is a constant.
pub const GREEK_LETTERS: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "theta", "lambda", "mu", "sigma", "phi", "omega",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

/// Named single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Ln,
    /// Base-10 logarithm.
    Log,
    Exp,
}

impl Func {
    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Ln => "ln",
            Func::Log => "log",
            Func::Exp => "exp",
        }
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tan => x.tan(),
            Func::Ln => x.ln(),
            Func::Log => x.log10(),
            Func::Exp => x.exp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expr {
    Number(BigRational),
    Constant(Constant),
    Symbol(String),
    Func(Func, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    /// `Root(radicand, index)`; `\sqrt{x}` has index 2.
    Root(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Product(Vec<Expr>),
    Sum(Vec<Expr>),
}

impl Expr {
    pub fn integer(n: i64) -> Self {
        Expr::Number(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn rational(numer: i64, denom: i64) -> Self {
        Expr::Number(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn symbol(name: &str) -> Self {
        Expr::Symbol(name.to_string())
    }

    pub fn zero() -> Self {
        Expr::Number(BigRational::zero())
    }

    pub fn one() -> Self {
        Expr::Number(BigRational::one())
    }

    pub fn as_number(&self) -> Option<&BigRational> {
        match self {
            Expr::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_number().is_some_and(Zero::is_zero)
    }

    /// Free symbols appearing anywhere in the tree.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) | Expr::Constant(_) => {}
            Expr::Symbol(name) => {
                out.insert(name.clone());
            }
            Expr::Func(_, a) | Expr::Neg(a) => a.collect_symbols(out),
            Expr::Pow(a, b)
            | Expr::Root(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Add(a, b)
            | Expr::Sub(a, b) => {
                a.collect_symbols(out);
                b.collect_symbols(out);
            }
            Expr::Product(items) | Expr::Sum(items) => {
                for item in items {
                    item.collect_symbols(out);
                }
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) | Expr::Sum(_) => 1,
            Expr::Mul(..) | Expr::Product(_) | Expr::Neg(_) => 2,
            Expr::Number(n) if n.is_negative() => 2,
            Expr::Pow(..) => 3,
            _ => 4,
        }
    }

    /// Whether the rendering can be used as a power base without parentheses.
    fn is_simple_base(&self) -> bool {
        match self {
            Expr::Number(n) => n.is_integer() && !n.is_negative(),
            Expr::Symbol(_) | Expr::Constant(_) => true,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// LaTeX rendering
// ---------------------------------------------------------------------------

struct Wrapped<'a>(&'a Expr, bool);

impl fmt::Display for Wrapped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.1 {
            write!(f, "\\left({}\\right)", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

fn wrap(expr: &Expr, min_precedence: u8) -> Wrapped<'_> {
    Wrapped(expr, expr.precedence() < min_precedence)
}

fn write_number(f: &mut fmt::Formatter<'_>, n: &BigRational) -> fmt::Result {
    if n.is_integer() {
        write!(f, "{}", n.numer())
    } else if n.is_negative() {
        write!(f, "-\\frac{{{}}}{{{}}}", -n.numer(), n.denom())
    } else {
        write!(f, "\\frac{{{}}}{{{}}}", n.numer(), n.denom())
    }
}

fn write_terms(f: &mut fmt::Formatter<'_>, terms: &[Expr]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        let rendered = term.to_string();
        match (i, rendered.strip_prefix('-')) {
            (0, _) => f.write_str(&rendered)?,
            (_, Some(rest)) => write!(f, " - {rest}")?,
            (_, None) => write!(f, " + {rendered}")?,
        }
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write_number(f, n),
            Expr::Constant(Constant::Pi) => f.write_str("\\pi"),
            Expr::Constant(Constant::E) => f.write_str("e"),
            Expr::Symbol(name) if name.chars().count() == 1 => f.write_str(name),
            Expr::Symbol(name) if GREEK_LETTERS.contains(&name.as_str()) => {
                write!(f, "\\{name}")
            }
            Expr::Symbol(name) => write!(f, "\\mathrm{{{name}}}"),
            Expr::Func(func, arg) => write!(f, "\\{}\\left({arg}\\right)", func.name()),
            Expr::Pow(base, exp) => {
                let base = Wrapped(base, !base.is_simple_base());
                write!(f, "{base}^{{{exp}}}")
            }
            Expr::Root(radicand, index) => {
                if index.as_number().is_some_and(|n| *n == BigRational::from_integer(2.into())) {
                    write!(f, "\\sqrt{{{radicand}}}")
                } else {
                    write!(f, "\\sqrt[{index}]{{{radicand}}}")
                }
            }
            Expr::Neg(inner) => write!(f, "-{}", wrap(inner, 3)),
            Expr::Mul(a, b) => write!(f, "{} \\cdot {}", wrap(a, 2), wrap(b, 3)),
            Expr::Div(a, b) => write!(f, "\\frac{{{a}}}{{{b}}}"),
            Expr::Add(a, b) => write_terms(f, &[(**a).clone(), (**b).clone()]),
            Expr::Sub(a, b) => write!(f, "{} - {}", a, wrap(b, 2)),
            Expr::Sum(terms) => write_terms(f, terms),
            Expr::Product(factors) => {
                let mut rest = factors.as_slice();
                if let Some((Expr::Number(n), tail)) = factors.split_first() {
                    if !tail.is_empty() && *n == -BigRational::one() {
                        f.write_str("-")?;
                        rest = tail;
                    }
                }
                for (i, factor) in rest.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" \\cdot ")?;
                    }
                    let min = if i == 0 { 2 } else { 3 };
                    write!(f, "{}", wrap(factor, min))?;
                }
                Ok(())
            }
        }
    }
}
