//! Expression parser using nom
//!
//! Grammar, lowest precedence first:
//! - `sum     = product (('+' | '-') product)*`
//! - `product = unary (('*' | '/' | '%') unary)*`
//! - `unary   = '-' unary | power`
//! - `power   = atom ('^' unary)?` (right associative)
//! - `atom    = number | name '(' args ')' | name | '(' sum ')'`
//!
//! Parsing produces a name-based tree that is then lowered into [`Expr`],
//! where function names and arities are checked.

use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, digit0, digit1, multispace0, one_of, satisfy},
    combinator::{map_res, opt, recognize},
    sequence::{pair, preceded},
    IResult, Parser,
};

use super::expr::{Expr, Func, RandomCall, RandomFunc};
use super::ValueError;

type PResult<'a, T> = IResult<&'a str, T>;

/// Name-based tree produced before function lookup.
#[derive(Debug)]
enum Ast {
    Number(f64),
    Ident(String),
    Neg(Box<Ast>),
    Binary { func: Func, lhs: Box<Ast>, rhs: Box<Ast> },
    Call { name: String, args: Vec<Ast> },
}

/// Parse `source` into an expression tree.
pub fn parse_expr(source: &str) -> Result<Expr, ValueError> {
    let ast = match sum(source) {
        Ok((rest, ast)) => {
            let rest = rest.trim_start();
            if let Some(c) = rest.chars().next() {
                return Err(ValueError::Syntax {
                    position: source.len() - rest.len(),
                    message: format!("unexpected '{c}'"),
                });
            }
            ast
        }
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
            let position = source.len() - e.input.len();
            let message = match e.input.chars().next() {
                Some(c) => format!("unexpected '{c}'"),
                None => "unexpected end of input".to_string(),
            };
            return Err(ValueError::Syntax { position, message });
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(ValueError::Syntax {
                position: source.len(),
                message: "unexpected end of input".to_string(),
            });
        }
    };
    lower(ast)
}

fn ws(input: &str) -> PResult<'_, &str> {
    multispace0(input)
}

fn symbol(input: &str, c: char) -> PResult<'_, char> {
    preceded(multispace0, char(c)).parse(input)
}

fn number(input: &str) -> PResult<'_, f64> {
    let mantissa = alt((
        recognize((digit1, opt((char('.'), digit0)))),
        recognize((char('.'), digit1)),
    ));
    let exponent = (one_of("eE"), opt(one_of("+-")), digit1);
    map_res(recognize(pair(mantissa, opt(exponent))), |s: &str| s.parse::<f64>()).parse(input)
}

fn identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

/// Peek the next non-blank character if it is one of `ops`.
fn peek_op<'a>(input: &'a str, ops: &[char]) -> PResult<'a, Option<char>> {
    let (rest, _) = ws(input)?;
    match rest.chars().next() {
        Some(c) if ops.contains(&c) => Ok((&rest[c.len_utf8()..], Some(c))),
        _ => Ok((input, None)),
    }
}

fn sum(input: &str) -> PResult<'_, Ast> {
    let (mut input, mut lhs) = product(input)?;
    loop {
        let (rest, op) = peek_op(input, &['+', '-'])?;
        let func = match op {
            Some('+') => Func::Add,
            Some('-') => Func::Sub,
            _ => return Ok((input, lhs)),
        };
        let (rest, rhs) = product(rest)?;
        lhs = Ast::Binary { func, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        input = rest;
    }
}

fn product(input: &str) -> PResult<'_, Ast> {
    let (mut input, mut lhs) = unary(input)?;
    loop {
        let (rest, op) = peek_op(input, &['*', '/', '%'])?;
        let func = match op {
            Some('*') => Func::Mul,
            Some('/') => Func::Div,
            Some('%') => Func::Rem,
            _ => return Ok((input, lhs)),
        };
        let (rest, rhs) = unary(rest)?;
        lhs = Ast::Binary { func, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        input = rest;
    }
}

fn unary(input: &str) -> PResult<'_, Ast> {
    let (rest, op) = peek_op(input, &['-'])?;
    if op.is_some() {
        let (rest, inner) = unary(rest)?;
        return Ok((rest, Ast::Neg(Box::new(inner))));
    }
    power(input)
}

fn power(input: &str) -> PResult<'_, Ast> {
    let (input, base) = atom(input)?;
    let (rest, op) = peek_op(input, &['^'])?;
    if op.is_none() {
        return Ok((input, base));
    }
    let (rest, exponent) = unary(rest)?;
    Ok((rest, Ast::Binary { func: Func::Pow, lhs: Box::new(base), rhs: Box::new(exponent) }))
}

fn atom(input: &str) -> PResult<'_, Ast> {
    let (input, _) = ws(input)?;
    if let Ok((rest, value)) = number(input) {
        return Ok((rest, Ast::Number(value)));
    }
    if let Some(rest) = input.strip_prefix('(') {
        let (rest, inner) = sum(rest)?;
        let (rest, _) = symbol(rest, ')')?;
        return Ok((rest, inner));
    }
    let (rest, name) = identifier(input)?;
    let (after, _) = ws(rest)?;
    if after.starts_with('(') {
        let (rest, args) = arguments(after)?;
        return Ok((rest, Ast::Call { name: name.to_string(), args }));
    }
    Ok((rest, Ast::Ident(name.to_string())))
}

fn arguments(input: &str) -> PResult<'_, Vec<Ast>> {
    let (input, _) = symbol(input, '(')?;
    let (after, _) = ws(input)?;
    if let Some(rest) = after.strip_prefix(')') {
        return Ok((rest, Vec::new()));
    }
    let mut args = Vec::new();
    let mut input = input;
    loop {
        let (rest, arg) = sum(input)?;
        args.push(arg);
        let (rest, sep) = peek_op(rest, &[',', ')'])?;
        match sep {
            Some(',') => input = rest,
            Some(_) => return Ok((rest, args)),
            None => {
                let (rest, _) = symbol(rest, ')')?;
                return Ok((rest, args));
            }
        }
    }
}

fn lower(ast: Ast) -> Result<Expr, ValueError> {
    Ok(match ast {
        Ast::Number(v) => Expr::Constant(v),
        Ast::Ident(name) => match name.as_str() {
            "PI" => Expr::Constant(std::f64::consts::PI),
            "E" => Expr::Constant(std::f64::consts::E),
            _ => Expr::Variable(name),
        },
        Ast::Neg(inner) => Expr::Call { func: Func::Neg, args: vec![lower(*inner)?] },
        Ast::Binary { func, lhs, rhs } => Expr::Call {
            func,
            args: vec![lower(*lhs)?, lower(*rhs)?],
        },
        Ast::Call { name, args } => {
            let args = args.into_iter().map(lower).collect::<Result<Vec<_>, _>>()?;
            if let Some(func) = RandomFunc::from_name(&name) {
                check_arity(&name, func.arity(), args.len())?;
                Expr::Random(RandomCall::new(func, args))
            } else if let Some(func) = Func::from_name(&name) {
                check_arity(&name, func.arity(), args.len())?;
                Expr::Call { func, args }
            } else {
                return Err(ValueError::UnknownFunction(name));
            }
        }
    })
}

fn check_arity(name: &str, expected: usize, actual: usize) -> Result<(), ValueError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ValueError::Arity { func: name.to_string(), expected, actual })
    }
}
