//! Recursive-descent parser over [`Token`]s.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | \cdot | \times | \div) unary | power)*
//! unary   := ('-' | '+') unary | power
//! power   := atom ('^' unary)?
//! atom    := number | letter | name | \pi | group | \frac{..}{..}
//!          | \sqrt[n]{..} | func atom
//! ```
//!
//! Juxtaposition is multiplication (`2x`, `3\sqrt{2}`, `x(y+1)`).
//!
//! Both the parser's own recursion and the depth of the tree it builds are
//! capped at [`MAX_DEPTH`], which bounds the recursion of every later pass
//! over a parsed expression.

use num_bigint::BigInt;
use num_rational::BigRational;

use quizcheck_core::ExpressionError;

use crate::ast::{Constant, Expr};
use crate::token::{tokenize, Token};

/// Deepest nesting accepted, counted both in parser recursion and in tree
/// levels. A left-associative chain such as `1 + 1 + ... + 1` adds one
/// level per operator.
pub const MAX_DEPTH: usize = 256;

/// A parsed subtree and its depth.
type Node = (Expr, usize);

fn too_deep() -> ExpressionError {
    ExpressionError::Parse("expression nested too deeply".into())
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ExpressionError> {
        match self.advance() {
            Some(tok) if tok == expected => Ok(()),
            Some(tok) => Err(ExpressionError::Parse(format!(
                "expected {expected:?}, got {tok:?}"
            ))),
            None => Err(ExpressionError::Parse(format!(
                "expected {expected:?}, got end of input"
            ))),
        }
    }

    /// Run `parse` one recursion level deeper.
    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Node, ExpressionError>,
    ) -> Result<Node, ExpressionError> {
        if self.depth >= MAX_DEPTH {
            return Err(too_deep());
        }
        self.depth += 1;
        let out = parse(self);
        self.depth -= 1;
        out
    }

    pub fn parse_expr(&mut self) -> Result<Expr, ExpressionError> {
        self.expr().map(|(expr, _)| expr)
    }

    fn expr(&mut self) -> Result<Node, ExpressionError> {
        let (mut left, mut depth) = self.term()?;

        while let Some(tok) = self.peek() {
            let build: fn(Box<Expr>, Box<Expr>) -> Expr = match tok {
                Token::Plus => Expr::Add,
                Token::Minus => Expr::Sub,
                _ => break,
            };
            self.advance();
            let (right, right_depth) = self.term()?;
            depth = binary_depth(depth, right_depth)?;
            left = build(Box::new(left), Box::new(right));
        }

        Ok((left, depth))
    }

    fn term(&mut self) -> Result<Node, ExpressionError> {
        let (mut left, mut depth) = self.unary()?;

        while let Some(tok) = self.peek() {
            let (build, right): (fn(Box<Expr>, Box<Expr>) -> Expr, Node) = match tok {
                Token::Star | Token::Cdot | Token::Times => {
                    self.advance();
                    (Expr::Mul, self.unary()?)
                }
                Token::Slash | Token::Divide => {
                    self.advance();
                    (Expr::Div, self.unary()?)
                }
                tok if starts_atom(tok) => (Expr::Mul, self.power()?),
                _ => break,
            };
            let (right, right_depth) = right;
            depth = binary_depth(depth, right_depth)?;
            left = build(Box::new(left), Box::new(right));
        }

        Ok((left, depth))
    }

    fn unary(&mut self) -> Result<Node, ExpressionError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                let (inner, depth) = self.nested(Self::unary)?;
                Ok((Expr::Neg(Box::new(inner)), unary_depth(depth)?))
            }
            Some(Token::Plus) => {
                self.advance();
                self.nested(Self::unary)
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Node, ExpressionError> {
        let (base, base_depth) = self.nested(Self::atom)?;

        if let Some(Token::Caret) = self.peek() {
            self.advance();
            let (exp, exp_depth) = self.nested(Self::unary)?;
            let depth = binary_depth(base_depth, exp_depth)?;
            Ok((Expr::Pow(Box::new(base), Box::new(exp)), depth))
        } else {
            Ok((base, base_depth))
        }
    }

    fn group(&mut self, open: &Token, close: &Token) -> Result<Node, ExpressionError> {
        self.expect(open)?;
        let node = self.nested(Self::expr)?;
        self.expect(close)?;
        Ok(node)
    }

    fn atom(&mut self) -> Result<Node, ExpressionError> {
        let leaf = match self.peek() {
            Some(Token::Number(text)) => Expr::Number(number_value(text)?),
            Some(Token::Letter('e')) => Expr::Constant(Constant::E),
            Some(Token::Letter(c)) => Expr::Symbol(c.to_string()),
            Some(Token::Name(name)) => Expr::Symbol(name.clone()),
            Some(Token::Pi) => Expr::Constant(Constant::Pi),
            Some(Token::LBrace) => return self.group(&Token::LBrace, &Token::RBrace),
            Some(Token::LParen) => return self.group(&Token::LParen, &Token::RParen),
            Some(Token::LBracket) => return self.group(&Token::LBracket, &Token::RBracket),
            Some(Token::Frac) => {
                self.advance();
                let (numer, numer_depth) = self.group(&Token::LBrace, &Token::RBrace)?;
                let (denom, denom_depth) = self.group(&Token::LBrace, &Token::RBrace)?;
                let depth = binary_depth(numer_depth, denom_depth)?;
                return Ok((Expr::Div(Box::new(numer), Box::new(denom)), depth));
            }
            Some(Token::Sqrt) => {
                self.advance();
                let (index, index_depth) = if let Some(Token::LBracket) = self.peek() {
                    self.group(&Token::LBracket, &Token::RBracket)?
                } else {
                    (Expr::integer(2), 1)
                };
                let (radicand, radicand_depth) = self.group(&Token::LBrace, &Token::RBrace)?;
                let depth = binary_depth(radicand_depth, index_depth)?;
                return Ok((Expr::Root(Box::new(radicand), Box::new(index)), depth));
            }
            Some(Token::Func(func)) => {
                self.advance();
                // \sin(x), \sin{x} or \sin x; a following ^ applies to the call
                let (arg, depth) = self.nested(Self::atom)?;
                return Ok((Expr::Func(*func, Box::new(arg)), unary_depth(depth)?));
            }
            Some(tok) => return Err(ExpressionError::Parse(format!("unexpected token {tok:?}"))),
            None => return Err(ExpressionError::Parse("unexpected end of input".into())),
        };
        self.advance();
        Ok((leaf, 1))
    }
}

fn unary_depth(inner: usize) -> Result<usize, ExpressionError> {
    let depth = inner + 1;
    if depth > MAX_DEPTH {
        return Err(too_deep());
    }
    Ok(depth)
}

fn binary_depth(left: usize, right: usize) -> Result<usize, ExpressionError> {
    unary_depth(left.max(right))
}

fn starts_atom(tok: &Token) -> bool {
    matches!(
        tok,
        Token::Number(_)
            | Token::Letter(_)
            | Token::Name(_)
            | Token::Pi
            | Token::LBrace
            | Token::LParen
            | Token::LBracket
            | Token::Frac
            | Token::Sqrt
            | Token::Func(_)
    )
}

/// Exact value of a decimal literal: "0.25" is 1/4.
fn number_value(text: &str) -> Result<BigRational, ExpressionError> {
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    let numer: BigInt = format!("{int_part}{frac_part}")
        .parse()
        .map_err(|e| ExpressionError::Parse(format!("invalid number '{text}': {e}")))?;
    let denom = num_traits::pow(BigInt::from(10u32), frac_part.len());
    Ok(BigRational::new(numer, denom))
}

/// Parse a LaTeX string into an expression, keeping its written structure.
pub fn parse_latex(latex: &str) -> Result<Expr, ExpressionError> {
    let tokens = tokenize(latex)?;
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let mut parser = Parser::new(&tokens);
    let expr = parser.parse_expr()?;

    if let Some(tok) = parser.peek() {
        return Err(ExpressionError::Parse(format!("unexpected token {tok:?}")));
    }

    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Func;

    fn parse(text: &str) -> Expr {
        parse_latex(text).unwrap_or_else(|e| panic!("failed to parse {text}: {e}"))
    }

    fn b(expr: Expr) -> Box<Expr> {
        Box::new(expr)
    }

    fn x() -> Expr {
        Expr::symbol("x")
    }

    #[test]
    fn numbers_are_exact() {
        assert_eq!(parse("42"), Expr::integer(42));
        assert_eq!(parse("0.25"), Expr::rational(1, 4));
        assert_eq!(parse("1.50"), Expr::rational(3, 2));
    }

    #[test]
    fn fraction_forms_share_structure() {
        let expected = Expr::Div(b(Expr::integer(1)), b(Expr::integer(6)));
        assert_eq!(parse("\\frac{1}{6}"), expected);
        assert_eq!(parse("1/6"), expected);
        assert_eq!(parse("\\dfrac{1}{6}"), expected);
        assert_eq!(parse("1 \\div 6"), expected);
        assert_ne!(parse("\\frac{2}{12}"), expected);
    }

    #[test]
    fn precedence() {
        assert_eq!(
            parse("1 + 2 \\cdot x"),
            Expr::Add(
                b(Expr::integer(1)),
                b(Expr::Mul(b(Expr::integer(2)), b(x())))
            )
        );
        assert_eq!(
            parse("-x^2"),
            Expr::Neg(b(Expr::Pow(b(x()), b(Expr::integer(2)))))
        );
        assert_eq!(
            parse("a - b - c"),
            Expr::Sub(
                b(Expr::Sub(b(Expr::symbol("a")), b(Expr::symbol("b")))),
                b(Expr::symbol("c"))
            )
        );
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(parse("2x"), parse("2 \\cdot x"));
        assert_eq!(parse("2x"), parse("2 * x"));
        assert_eq!(parse("2 \\times x"), parse("2x"));
        assert_eq!(
            parse("xy"),
            Expr::Mul(b(x()), b(Expr::symbol("y")))
        );
        assert_eq!(
            parse("2x^2"),
            Expr::Mul(
                b(Expr::integer(2)),
                b(Expr::Pow(b(x()), b(Expr::integer(2))))
            )
        );
    }

    #[test]
    fn grouping_is_not_structure() {
        assert_eq!(parse("(x)"), x());
        assert_eq!(parse("{x}"), x());
        assert_eq!(parse("\\left(x\\right)"), x());
        assert_eq!(parse("[x]"), x());
    }

    #[test]
    fn roots_and_functions() {
        assert_eq!(
            parse("\\sqrt{x}"),
            Expr::Root(b(x()), b(Expr::integer(2)))
        );
        assert_eq!(
            parse("\\sqrt[3]{8}"),
            Expr::Root(b(Expr::integer(8)), b(Expr::integer(3)))
        );
        assert_eq!(parse("\\sin(x)"), Expr::Func(Func::Sin, b(x())));
        assert_eq!(parse("\\sin{x}"), parse("\\sin x"));
        assert_eq!(
            parse("\\cos(x)^2"),
            Expr::Pow(b(Expr::Func(Func::Cos, b(x()))), b(Expr::integer(2)))
        );
    }

    #[test]
    fn constants() {
        assert_eq!(parse("\\pi"), Expr::Constant(Constant::Pi));
        assert_eq!(parse("e"), Expr::Constant(Constant::E));
        assert_eq!(parse("\\theta"), Expr::symbol("theta"));
    }

    #[test]
    fn negative_exponent() {
        assert_eq!(
            parse("x^{-1}"),
            Expr::Pow(b(x()), b(Expr::Neg(b(Expr::integer(1)))))
        );
        assert_eq!(parse("x^-1"), parse("x^{-1}"));
    }

    #[test]
    fn malformed_input() {
        assert_eq!(parse_latex(""), Err(ExpressionError::Empty));
        assert_eq!(parse_latex("  "), Err(ExpressionError::Empty));
        for bad in [".", "1 +", "(x", "x)", "\\frac{1}", "\\sqrt x", "^2", "2 ** 3"] {
            assert!(
                matches!(parse_latex(bad), Err(ExpressionError::Parse(_))),
                "expected parse error for {bad:?}"
            );
        }
    }

    #[test]
    fn nesting_is_bounded() {
        let too_deep = |text: String| {
            assert_eq!(
                parse_latex(&text),
                Err(ExpressionError::Parse("expression nested too deeply".into())),
                "{} chars",
                text.len()
            );
        };
        too_deep(format!("{}5{}", "(".repeat(200_000), ")".repeat(200_000)));
        too_deep(format!("{}5", "-".repeat(200_000)));
        too_deep(format!("{}5", "+".repeat(200_000)));
        too_deep(format!("{}x{}", "\\sqrt{".repeat(10_000), "}".repeat(10_000)));
        too_deep(format!("{}x", "\\sin ".repeat(10_000)));
        too_deep(format!("x{}", "^x".repeat(10_000)));
        too_deep(vec!["1"; 100_000].join(" + "));
        too_deep(vec!["x"; 100_000].join(" \\cdot "));
    }

    #[test]
    fn moderate_nesting_parses() {
        let text = format!("{}x{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse(&text), x());
        let sum = parse(&vec!["1"; 200].join(" + "));
        assert!(matches!(sum, Expr::Add(..)));
        assert_eq!(parse("--x"), Expr::Neg(b(Expr::Neg(b(x())))));
    }
}
