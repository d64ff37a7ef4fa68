//! Arithmetic expressions typed into numeric fields
//!
//! Numeric fields accept simple arithmetic instead of a plain number:
//! `2*3`, `(10 - 4) / 3`, `-5 % 3`. Integer fields evaluate exactly with
//! 128-bit integers when every literal is integral; anything else evaluates
//! in `f64`.
//!
//! # Supported Syntax
//!
//! - Binary operators `+ - * / %` with the usual precedence, left associative
//! - Unary `-` and `+`
//! - Parentheses
//! - Decimal literals with optional fraction and exponent (`1.5e3`)
//!
//! Evaluation failures (syntax errors, division by zero in integer mode,
//! non-finite results) return `None`; the caller keeps its previous value.
//! So does text longer than [`MAX_EXPRESSION_LEN`] bytes or nested deeper
//! than [`MAX_NESTING`] levels of parentheses and signs.

use nom::{
    branch::alt,
    character::complete::{char, multispace0, one_of},
    combinator::{all_consuming, map},
    error::{context, ErrorKind, ParseError, VerboseError},
    multi::many0,
    number::complete::recognize_float,
    sequence::{delimited, pair, preceded},
    Finish, IResult,
};

type ParseResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Longest text accepted for evaluation, in bytes
pub const MAX_EXPRESSION_LEN: usize = 1024;

/// Deepest nesting of parentheses and unary signs
pub const MAX_NESTING: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Clone, Debug, PartialEq)]
enum Expr {
    Number { value: f64, integer: Option<i128> },
    Negate(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    fn is_integral(&self) -> bool {
        match self {
            Expr::Number { integer, .. } => integer.is_some(),
            Expr::Negate(inner) => inner.is_integral(),
            Expr::Binary(_, l, r) => l.is_integral() && r.is_integral(),
        }
    }

    fn eval_f64(&self) -> f64 {
        match self {
            Expr::Number { value, .. } => *value,
            Expr::Negate(inner) => -inner.eval_f64(),
            Expr::Binary(op, l, r) => {
                let (l, r) = (l.eval_f64(), r.eval_f64());
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    BinaryOp::Rem => l % r,
                }
            }
        }
    }

    fn eval_i128(&self) -> Option<i128> {
        match self {
            Expr::Number { integer, .. } => *integer,
            Expr::Negate(inner) => inner.eval_i128()?.checked_neg(),
            Expr::Binary(op, l, r) => {
                let (l, r) = (l.eval_i128()?, r.eval_i128()?);
                match op {
                    BinaryOp::Add => l.checked_add(r),
                    BinaryOp::Sub => l.checked_sub(r),
                    BinaryOp::Mul => l.checked_mul(r),
                    BinaryOp::Div => l.checked_div(r),
                    BinaryOp::Rem => l.checked_rem(r),
                }
            }
        }
    }
}

// ============================================================================
// Parsers
// ============================================================================

fn ws<'a, O>(
    inner: impl FnMut(&'a str) -> ParseResult<'a, O>,
) -> impl FnMut(&'a str) -> ParseResult<'a, O> {
    delimited(multispace0, inner, multispace0)
}

fn number(input: &str) -> ParseResult<Expr> {
    let (input, text) = context("number", recognize_float)(input)?;
    let value = text.parse::<f64>().unwrap_or(f64::NAN);
    let integer = if text.contains(['.', 'e', 'E']) {
        None
    } else {
        text.parse::<i128>().ok()
    };
    Ok((input, Expr::Number { value, integer }))
}

fn factor(input: &str, depth: usize) -> ParseResult<Expr> {
    if depth > MAX_NESTING {
        return Err(nom::Err::Failure(VerboseError::from_error_kind(
            input,
            ErrorKind::TooLarge,
        )));
    }
    let nested = depth + 1;
    let result = ws(alt((
        context(
            "parenthesized expression",
            delimited(char('('), |i| expr(i, nested), char(')')),
        ),
        map(preceded(char('-'), |i| factor(i, nested)), |e| {
            Expr::Negate(Box::new(e))
        }),
        preceded(char('+'), |i| factor(i, nested)),
        number,
    )))(input);
    result
}

fn fold(first: Expr, rest: Vec<(char, Expr)>) -> Expr {
    rest.into_iter().fold(first, |acc, (op, rhs)| {
        let op = match op {
            '+' => BinaryOp::Add,
            '-' => BinaryOp::Sub,
            '*' => BinaryOp::Mul,
            '/' => BinaryOp::Div,
            _ => BinaryOp::Rem,
        };
        Expr::Binary(op, Box::new(acc), Box::new(rhs))
    })
}

fn term(input: &str, depth: usize) -> ParseResult<Expr> {
    let (input, first) = factor(input, depth)?;
    let (input, rest) = many0(pair(one_of("*/%"), |i| factor(i, depth)))(input)?;
    Ok((input, fold(first, rest)))
}

fn expr(input: &str, depth: usize) -> ParseResult<Expr> {
    let (input, first) = term(input, depth)?;
    let (input, rest) = many0(pair(one_of("+-"), |i| term(i, depth)))(input)?;
    Ok((input, fold(first, rest)))
}

fn parse(text: &str) -> Option<Expr> {
    if text.len() > MAX_EXPRESSION_LEN {
        tracing::debug!(len = text.len(), "expression too long");
        return None;
    }
    match all_consuming(ws(|i| expr(i, 0)))(text).finish() {
        Ok((_, expr)) => Some(expr),
        Err(err) => {
            tracing::debug!(
                input = text,
                error = ?err.errors.first().map(|(_, kind)| kind),
                "expression rejected"
            );
            None
        }
    }
}

/// Evaluate `text` as a floating-point expression
pub fn evaluate_f64(text: &str) -> Option<f64> {
    let value = parse(text)?.eval_f64();
    value.is_finite().then_some(value)
}

/// Evaluate `text` for an integer field
///
/// Exact when every literal is integral; otherwise the `f64` result is
/// truncated toward zero.
pub fn evaluate_i128(text: &str) -> Option<i128> {
    let expr = parse(text)?;
    if expr.is_integral() {
        expr.eval_i128()
    } else {
        let value = expr.eval_f64();
        value.is_finite().then(|| value.trunc() as i128)
    }
}
