//! nom grammar for the expression fragment the delegate understands:
//! decimal numbers, identifiers, function calls, `+ - * / ^`, unary minus,
//! and parentheses. `^` is right-associative.

use nom::{
    branch::alt,
    character::complete::{char, digit0, digit1, multispace0, satisfy},
    combinator::{map, map_res, opt, recognize},
    multi::{fold_many0, many0_count, separated_list0},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::ast::Expr;
use crate::error::ParseError;

fn decimal(input: &str) -> IResult<&str, &str> {
    recognize(alt((
        // 12, 12., 12.5
        recognize(tuple((digit1, opt(pair(char('.'), digit0))))),
        // .5
        recognize(pair(char('.'), digit1)),
    )))(input)
}

fn parse_number(input: &str) -> IResult<&str, Expr> {
    map(map_res(decimal, |s: &str| s.parse::<f64>()), Expr::Number)(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
        many0_count(satisfy(|c: char| c.is_ascii_alphanumeric() || c == '_')),
    ))(input)
}

// Identifier followed directly by '(' is a call, otherwise a variable.
fn parse_call_or_variable(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = identifier(input)?;
    if rest.starts_with('(') {
        let (rest, args) = delimited(
            char('('),
            separated_list0(preceded(multispace0, char(',')), parse_expr),
            preceded(multispace0, char(')')),
        )(rest)?;
        Ok((rest, Expr::Function(name.to_string(), args)))
    } else {
        Ok((rest, Expr::Variable(name.to_string())))
    }
}

fn parse_atom(input: &str) -> IResult<&str, Expr> {
    preceded(
        multispace0,
        alt((
            parse_number,
            parse_call_or_variable,
            delimited(char('('), parse_expr, preceded(multispace0, char(')'))),
        )),
    )(input)
}

// Power - right associative: 2^3^4 = 2^(3^4). Allows signed exponents.
fn parse_power(input: &str) -> IResult<&str, Expr> {
    let (input, base) = parse_atom(input)?;

    match preceded(multispace0::<&str, nom::error::Error<&str>>, char('^'))(input) {
        Ok((input, _)) => {
            let (input, exp) = parse_power_exponent(input)?;
            Ok((input, Expr::Pow(Box::new(base), Box::new(exp))))
        }
        Err(_) => Ok((input, base)),
    }
}

fn parse_power_exponent(input: &str) -> IResult<&str, Expr> {
    preceded(
        multispace0,
        alt((
            map(preceded(char('-'), parse_power_exponent), |e| {
                Expr::Neg(Box::new(e))
            }),
            preceded(char('+'), parse_power_exponent),
            parse_power,
        )),
    )(input)
}

fn parse_unary(input: &str) -> IResult<&str, Expr> {
    preceded(
        multispace0,
        alt((
            map(preceded(char('-'), parse_unary), |e| Expr::Neg(Box::new(e))),
            parse_power,
        )),
    )(input)
}

fn parse_term(input: &str) -> IResult<&str, Expr> {
    let (input, init) = parse_unary(input)?;
    fold_many0(
        pair(preceded(multispace0, alt((char('*'), char('/')))), parse_unary),
        move || init.clone(),
        |acc, (op, val)| match op {
            '*' => Expr::Mul(Box::new(acc), Box::new(val)),
            _ => Expr::Div(Box::new(acc), Box::new(val)),
        },
    )(input)
}

fn parse_expr(input: &str) -> IResult<&str, Expr> {
    let (input, init) = parse_term(input)?;
    fold_many0(
        pair(preceded(multispace0, alt((char('+'), char('-')))), parse_term),
        move || init.clone(),
        |acc, (op, val)| match op {
            '+' => Expr::Add(Box::new(acc), Box::new(val)),
            _ => Expr::Sub(Box::new(acc), Box::new(val)),
        },
    )(input)
}

pub fn parse(input: &str) -> Result<Expr, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let (remaining, expr) =
        parse_expr(input).map_err(|e| ParseError::NomError(e.to_string()))?;
    let remaining = remaining.trim();
    if !remaining.is_empty() {
        return Err(ParseError::UnconsumedInput(remaining.to_string()));
    }
    Ok(expr)
}
