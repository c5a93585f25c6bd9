//! Floating-point evaluation and numeric value comparison.

use std::collections::HashMap;

use num_traits::ToPrimitive;

use crate::ast::Expr;

/// Relative tolerance for numeric agreement.
pub const TOLERANCE: f64 = 1e-9;

/// Irrational-looking sample values; symbols never land on 0 or 1.
const SAMPLE_VALUES: [f64; 7] = [
    0.577_215_664_9,
    1.414_213_562_4,
    2.718_281_828_5,
    -0.739_085_133_2,
    3.141_592_653_6,
    -1.618_033_988_7,
    0.318_309_886_2,
];

/// Rounds of bindings tried when the expressions contain symbols.
const SAMPLE_ROUNDS: usize = 5;

/// Evaluate `expr` with `bindings` for its symbols.
///
/// Returns `None` when a symbol is unbound. The result may be NaN or
/// infinite outside the expression's real domain.
pub fn evaluate(expr: &Expr, bindings: &HashMap<String, f64>) -> Option<f64> {
    let value = match expr {
        Expr::Number(n) => n.to_f64()?,
        Expr::Constant(c) => c.value(),
        Expr::Symbol(name) => *bindings.get(name)?,
        Expr::Func(func, arg) => func.apply(evaluate(arg, bindings)?),
        Expr::Pow(base, exp) => pow(evaluate(base, bindings)?, evaluate(exp, bindings)?),
        Expr::Root(radicand, index) => {
            root(evaluate(radicand, bindings)?, evaluate(index, bindings)?)
        }
        Expr::Neg(a) => -evaluate(a, bindings)?,
        Expr::Mul(a, b) => evaluate(a, bindings)? * evaluate(b, bindings)?,
        Expr::Div(a, b) => evaluate(a, bindings)? / evaluate(b, bindings)?,
        Expr::Add(a, b) => evaluate(a, bindings)? + evaluate(b, bindings)?,
        Expr::Sub(a, b) => evaluate(a, bindings)? - evaluate(b, bindings)?,
        Expr::Product(factors) => factors
            .iter()
            .map(|f| evaluate(f, bindings))
            .product::<Option<f64>>()?,
        Expr::Sum(terms) => terms
            .iter()
            .map(|t| evaluate(t, bindings))
            .sum::<Option<f64>>()?,
    };
    Some(value)
}

/// Real power; odd roots of negative bases stay real.
fn pow(base: f64, exp: f64) -> f64 {
    if exp.fract() == 0.0 && exp.abs() <= i32::MAX as f64 {
        return base.powi(exp as i32);
    }
    if base < 0.0 {
        let reciprocal = 1.0 / exp;
        if reciprocal.fract() == 0.0 && (reciprocal as i64) % 2 != 0 {
            return -(-base).powf(exp);
        }
    }
    base.powf(exp)
}

fn root(radicand: f64, index: f64) -> f64 {
    if radicand < 0.0 && index.fract() == 0.0 && (index as i64) % 2 != 0 {
        -(-radicand).powf(1.0 / index)
    } else {
        radicand.powf(1.0 / index)
    }
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE * 1f64.max(a.abs()).max(b.abs())
}

fn sample(round: usize, symbol_index: usize) -> f64 {
    SAMPLE_VALUES[(round + 3 * symbol_index) % SAMPLE_VALUES.len()] + 0.25 * symbol_index as f64
}

/// Whether `a` and `b` agree numerically at a fixed set of sample bindings.
///
/// Points where both sides are undefined are skipped; a point where only one
/// side is defined is a disagreement. At least one point must be compared.
pub fn values_agree(a: &Expr, b: &Expr) -> bool {
    let mut symbols = a.symbols();
    symbols.extend(b.symbols());
    let rounds = if symbols.is_empty() { 1 } else { SAMPLE_ROUNDS };

    let mut compared = 0;
    for round in 0..rounds {
        let bindings: HashMap<String, f64> = symbols
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), sample(round, i)))
            .collect();

        let (Some(va), Some(vb)) = (evaluate(a, &bindings), evaluate(b, &bindings)) else {
            return false;
        };
        match (va.is_finite(), vb.is_finite()) {
            (true, true) if approx_eq(va, vb) => compared += 1,
            (true, true) => return false,
            (false, false) => continue,
            _ => return false,
        }
    }
    compared > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_latex;

    fn agree(a: &str, b: &str) -> bool {
        values_agree(&parse_latex(a).unwrap(), &parse_latex(b).unwrap())
    }

    fn value(text: &str) -> f64 {
        evaluate(&parse_latex(text).unwrap(), &HashMap::new()).unwrap()
    }

    #[test]
    fn evaluates_constants() {
        assert!(approx_eq(value("\\frac{1}{6}"), 1.0 / 6.0));
        assert!(approx_eq(value("2\\pi"), 2.0 * std::f64::consts::PI));
        assert!(approx_eq(value("\\sqrt[3]{-27}"), -3.0));
        assert!(approx_eq(value("(-8)^{\\frac{1}{3}}"), -2.0));
        assert!(approx_eq(value("\\ln(e^2)"), 2.0));
    }

    #[test]
    fn unbound_symbol_is_none() {
        assert_eq!(evaluate(&Expr::symbol("x"), &HashMap::new()), None);
    }

    #[test]
    fn identities_agree() {
        assert!(agree("2(x + 1)", "2x + 2"));
        assert!(agree("(x + 1)^2", "x^2 + 2x + 1"));
        assert!(agree("\\sin(x)^2 + \\cos(x)^2", "1"));
        assert!(agree("\\frac{x^2 - 1}{x - 1}", "x + 1"));
        assert!(agree("2\\sqrt{2}", "\\sqrt{8}"));
    }

    #[test]
    fn different_values_disagree() {
        assert!(!agree("x + 1", "x + 2"));
        assert!(!agree("xy", "x + y"));
        assert!(!agree("\\sqrt{x^2}", "x"));
        assert!(!agree("\\frac{1}{6}", "0.1666"));
    }

    #[test]
    fn undefined_everywhere_never_agrees() {
        assert!(!agree("\\sqrt{-1}", "\\sqrt{-1}"));
        assert!(!agree("\\ln(-x^2 - 1)", "\\ln(-x^2 - 1)"));
    }

    #[test]
    fn tolerance_is_relative() {
        assert!(approx_eq(1e12, 1e12 + 1.0));
        assert!(!approx_eq(1.0, 1.0 + 1e-6));
    }
}
