use quizcheck_core::{ExpressionEngine, ExpressionError};

use crate::ast::Expr;
use crate::{eval, parser, simplify};

/// Expression engine over the supported LaTeX subset.
#[derive(Debug, Default, Clone, Copy)]
pub struct LatexEngine;

impl LatexEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionEngine for LatexEngine {
    type Expr = Expr;

    fn name(&self) -> &str {
        "latex"
    }

    fn parse(&self, text: &str) -> Result<Expr, ExpressionError> {
        parser::parse_latex(text)
    }

    fn simplify(&self, expr: &Expr) -> Result<Expr, ExpressionError> {
        simplify::simplify(expr)
    }

    fn is_structurally_same(&self, a: &Expr, b: &Expr) -> bool {
        a == b
    }

    /// Equal canonical forms, or numeric agreement at sample points.
    fn is_value_equal(&self, a: &Expr, b: &Expr) -> bool {
        if a == b {
            return true;
        }
        let agree = eval::values_agree(a, b);
        tracing::trace!(%a, %b, agree, "numeric comparison");
        agree
    }
}
