//! quizcheck-math: LaTeX-subset expression engine.
//!
//! Parses the math a learner types into an open question (`\frac{1}{6}`,
//! `2x + 3`, `\sqrt[3]{8}` ...) and decides whether two expressions are the
//! same, either structurally or by value. [`LatexEngine`] plugs this into the
//! grader through the `ExpressionEngine` trait.

pub mod ast;
pub mod engine;
pub mod eval;
pub mod parser;
pub mod simplify;
pub mod token;

pub use ast::Expr;
pub use engine::LatexEngine;
pub use parser::parse_latex;
pub use simplify::simplify;
