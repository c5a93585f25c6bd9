//! LaTeX tokenizer (nom).

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1, multispace0, one_of, satisfy},
    combinator::{map, opt, recognize},
    sequence::{delimited, pair, preceded},
    IResult,
};

use quizcheck_core::ExpressionError;

use crate::ast::{Func, GREEK_LETTERS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Literals
    Number(String), // "12", "0.25"
    Letter(char),   // each letter is its own symbol: "xy" is x times y
    Name(String),   // \alpha, \mathrm{speed}

    // Operators
    Plus,
    Minus,
    Star,   // *
    Slash,  // /
    Cdot,   // \cdot
    Times,  // \times
    Divide, // \div
    Caret,

    // Grouping
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,

    // Commands
    Frac, // \frac, \dfrac, \tfrac
    Sqrt,
    Func(Func),
    Pi,
}

enum Lexeme<'a> {
    Token(Token),
    Command(&'a str),
    Space,
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn number(input: &str) -> IResult<&str, Token> {
    map(recognize(pair(digit1, opt(pair(char('.'), digit1)))), |s: &str| {
        Token::Number(s.to_string())
    })(input)
}

fn operator_or_grouping(input: &str) -> IResult<&str, Token> {
    alt((
        map(char('+'), |_| Token::Plus),
        map(char('-'), |_| Token::Minus),
        map(char('*'), |_| Token::Star),
        map(char('/'), |_| Token::Slash),
        map(char('^'), |_| Token::Caret),
        map(char('{'), |_| Token::LBrace),
        map(char('}'), |_| Token::RBrace),
        map(char('('), |_| Token::LParen),
        map(char(')'), |_| Token::RParen),
        map(char('['), |_| Token::LBracket),
        map(char(']'), |_| Token::RBracket),
    ))(input)
}

fn lexeme(input: &str) -> IResult<&str, Lexeme<'_>> {
    alt((
        map(preceded(char('\\'), take_while1(is_alpha)), Lexeme::Command),
        // \, \; \: \! and "\ " are spacing
        map(preceded(char('\\'), one_of(",;:! ")), |_| Lexeme::Space),
        map(number, Lexeme::Token),
        map(satisfy(is_alpha), |c| Lexeme::Token(Token::Letter(c))),
        map(operator_or_grouping, Lexeme::Token),
    ))(input)
}

/// `{word}` after `\mathrm`, `\text` and friends.
fn braced_word(input: &str) -> IResult<&str, &str> {
    preceded(
        multispace0,
        delimited(
            char('{'),
            delimited(
                multispace0,
                take_while1(|c: char| c.is_ascii_alphanumeric()),
                multispace0,
            ),
            char('}'),
        ),
    )(input)
}

fn command_token(name: &str) -> Option<Token> {
    let token = match name {
        "frac" | "dfrac" | "tfrac" => Token::Frac,
        "sqrt" => Token::Sqrt,
        "cdot" => Token::Cdot,
        "times" => Token::Times,
        "div" => Token::Divide,
        "pi" => Token::Pi,
        "sin" => Token::Func(Func::Sin),
        "cos" => Token::Func(Func::Cos),
        "tan" => Token::Func(Func::Tan),
        "ln" => Token::Func(Func::Ln),
        "log" => Token::Func(Func::Log),
        "exp" => Token::Func(Func::Exp),
        greek if GREEK_LETTERS.contains(&greek) => Token::Name(greek.to_string()),
        _ => return None,
    };
    Some(token)
}

fn preview(input: &str) -> &str {
    match input.char_indices().nth(20) {
        Some((end, _)) => &input[..end],
        None => input,
    }
}

/// Tokenize a LaTeX string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut remaining = input.trim_start();

    while !remaining.is_empty() {
        let (rest, lexeme) = lexeme(remaining).map_err(|_| {
            ExpressionError::Parse(format!("unexpected input at '{}'", preview(remaining)))
        })?;
        remaining = rest;

        match lexeme {
            Lexeme::Token(token) => tokens.push(token),
            Lexeme::Space => {}
            Lexeme::Command("left" | "right") => {
                // `\left.` is an invisible delimiter
                if let Some(rest) = remaining.trim_start().strip_prefix('.') {
                    remaining = rest;
                }
            }
            Lexeme::Command("mathrm" | "text" | "operatorname" | "mathit") => {
                let (rest, word) = braced_word(remaining).map_err(|_| {
                    ExpressionError::Parse(format!(
                        "expected {{name}} at '{}'",
                        preview(remaining)
                    ))
                })?;
                tokens.push(Token::Name(word.to_string()));
                remaining = rest;
            }
            Lexeme::Command(name) => {
                let token = command_token(name).ok_or_else(|| {
                    ExpressionError::Parse(format!("unsupported command \\{name}"))
                })?;
                tokens.push(token);
            }
        }

        remaining = remaining.trim_start();
    }

    Ok(tokens)
}
