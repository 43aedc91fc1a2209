//! Binding substitution, constant folding, numeric evaluation, symbolic
//! differentiation, and exact-fraction rationalization over the [`Expr`]
//! tree.

use std::collections::HashSet;
use std::f64::consts::{E, PI};

use mathpad_session::VariableStore;
use num_rational::Ratio;

use crate::ast::{format_number, Expr};
use crate::error::EvalError;
use crate::parser;

/// Maximum substitution depth to prevent stack overflow on long chains.
const MAX_SUBSTITUTE_DEPTH: usize = 100;

/// Evaluate an expression to a formatted number.
pub fn evaluate(input: &str, bindings: &VariableStore) -> Result<String, EvalError> {
    let expr = parser::parse(input)?;
    let expr = fold(substitute(&expr, bindings))?;
    match expr {
        Expr::Number(value) => Ok(format_number(value)),
        other => match first_variable(&other) {
            Some(name) => Err(EvalError::UndefinedSymbol(name.to_string())),
            None => Err(EvalError::CannotEvaluate(other.to_string())),
        },
    }
}

/// Simplify an expression: resolve bindings, fold constants, and print the
/// residual tree.
pub fn simplify(input: &str, bindings: &VariableStore) -> Result<String, EvalError> {
    let expr = parser::parse(input)?;
    let expr = fold(substitute(&expr, bindings))?;
    Ok(expr.to_string())
}

/// Differentiate with respect to `variable`. Bindings are not consulted;
/// the differentiation variable must stay symbolic.
pub fn derivative(input: &str, variable: &str) -> Result<String, EvalError> {
    let expr = parser::parse(input)?;
    let derived = fold(differentiate(&expr, variable)?)?;
    Ok(derived.to_string())
}

/// Reduce a fully numeric expression to an exact fraction.
pub fn rationalize(input: &str, bindings: &VariableStore) -> Result<String, EvalError> {
    let expr = parser::parse(input)?;
    let expr = fold(substitute(&expr, bindings))?;
    let Expr::Number(value) = expr else {
        return Err(EvalError::NotRational(expr.to_string()));
    };
    if !value.is_finite() {
        return Err(EvalError::NotRational(format_number(value)));
    }
    let ratio = Ratio::<i64>::approximate_float(value)
        .ok_or_else(|| EvalError::NotRational(format_number(value)))?;
    if ratio.is_integer() {
        Ok(ratio.to_integer().to_string())
    } else {
        Ok(format!("{}/{}", ratio.numer(), ratio.denom()))
    }
}

/// Replace bound variables by their parsed values, transitively, with cycle
/// detection and a depth limit. Unbound names fall through to the constants
/// `pi` and `e`; anything else stays symbolic. Binding values that do not
/// parse are left unsubstituted.
fn substitute(expr: &Expr, bindings: &VariableStore) -> Expr {
    substitute_impl(expr, bindings, &mut HashSet::new(), 0)
}

fn substitute_impl(
    expr: &Expr,
    bindings: &VariableStore,
    visiting: &mut HashSet<String>,
    depth: usize,
) -> Expr {
    if depth > MAX_SUBSTITUTE_DEPTH {
        return expr.clone();
    }
    match expr {
        Expr::Variable(name) => {
            if let Some(value) = bindings.get(name) {
                // Cycle: leave the variable in place to break the loop
                if visiting.contains(name) {
                    return expr.clone();
                }
                let Ok(parsed) = parser::parse(value) else {
                    return expr.clone();
                };
                visiting.insert(name.clone());
                let result = substitute_impl(&parsed, bindings, visiting, depth + 1);
                visiting.remove(name);
                result
            } else if name == "pi" {
                Expr::Number(PI)
            } else if name == "e" {
                Expr::Number(E)
            } else {
                expr.clone()
            }
        }
        Expr::Number(_) => expr.clone(),
        Expr::Neg(inner) => Expr::Neg(Box::new(substitute_impl(inner, bindings, visiting, depth + 1))),
        Expr::Add(l, r) => Expr::Add(
            Box::new(substitute_impl(l, bindings, visiting, depth + 1)),
            Box::new(substitute_impl(r, bindings, visiting, depth + 1)),
        ),
        Expr::Sub(l, r) => Expr::Sub(
            Box::new(substitute_impl(l, bindings, visiting, depth + 1)),
            Box::new(substitute_impl(r, bindings, visiting, depth + 1)),
        ),
        Expr::Mul(l, r) => Expr::Mul(
            Box::new(substitute_impl(l, bindings, visiting, depth + 1)),
            Box::new(substitute_impl(r, bindings, visiting, depth + 1)),
        ),
        Expr::Div(l, r) => Expr::Div(
            Box::new(substitute_impl(l, bindings, visiting, depth + 1)),
            Box::new(substitute_impl(r, bindings, visiting, depth + 1)),
        ),
        Expr::Pow(b, e) => Expr::Pow(
            Box::new(substitute_impl(b, bindings, visiting, depth + 1)),
            Box::new(substitute_impl(e, bindings, visiting, depth + 1)),
        ),
        Expr::Function(name, args) => Expr::Function(
            name.clone(),
            args.iter()
                .map(|a| substitute_impl(a, bindings, visiting, depth + 1))
                .collect(),
        ),
    }
}

/// Bottom-up constant folding plus the identity rules: `x + 0`, `x * 1`,
/// `x * 0`, `x / 1`, `x^1`, `x^0`, and double negation. Function
/// applications with all-numeric arguments are computed; unknown function
/// names and wrong arities error here even on symbolic arguments.
fn fold(expr: Expr) -> Result<Expr, EvalError> {
    Ok(match expr {
        Expr::Number(_) | Expr::Variable(_) => expr,
        Expr::Neg(inner) => match fold(*inner)? {
            Expr::Number(n) => Expr::Number(-n),
            Expr::Neg(x) => *x,
            other => Expr::Neg(Box::new(other)),
        },
        Expr::Add(l, r) => match (fold(*l)?, fold(*r)?) {
            (Expr::Number(a), Expr::Number(b)) => Expr::Number(a + b),
            (Expr::Number(z), x) if z == 0.0 => x,
            (x, Expr::Number(z)) if z == 0.0 => x,
            (l, r) => Expr::Add(Box::new(l), Box::new(r)),
        },
        Expr::Sub(l, r) => match (fold(*l)?, fold(*r)?) {
            (Expr::Number(a), Expr::Number(b)) => Expr::Number(a - b),
            (x, Expr::Number(z)) if z == 0.0 => x,
            (l, r) => Expr::Sub(Box::new(l), Box::new(r)),
        },
        Expr::Mul(l, r) => match (fold(*l)?, fold(*r)?) {
            (Expr::Number(a), Expr::Number(b)) => Expr::Number(a * b),
            (Expr::Number(one), x) if one == 1.0 => x,
            (x, Expr::Number(one)) if one == 1.0 => x,
            (Expr::Number(z), _) if z == 0.0 => Expr::Number(0.0),
            (_, Expr::Number(z)) if z == 0.0 => Expr::Number(0.0),
            (l, r) => Expr::Mul(Box::new(l), Box::new(r)),
        },
        Expr::Div(l, r) => match (fold(*l)?, fold(*r)?) {
            (Expr::Number(a), Expr::Number(b)) => Expr::Number(a / b),
            (x, Expr::Number(one)) if one == 1.0 => x,
            (l, r) => Expr::Div(Box::new(l), Box::new(r)),
        },
        Expr::Pow(base, exp) => match (fold(*base)?, fold(*exp)?) {
            (Expr::Number(a), Expr::Number(b)) => Expr::Number(a.powf(b)),
            (x, Expr::Number(one)) if one == 1.0 => x,
            (_, Expr::Number(z)) if z == 0.0 => Expr::Number(1.0),
            (base, exp) => Expr::Pow(Box::new(base), Box::new(exp)),
        },
        Expr::Function(name, args) => {
            let args = args.into_iter().map(fold).collect::<Result<Vec<_>, _>>()?;
            check_arity(&name, args.len())?;
            let numeric: Option<Vec<f64>> = args
                .iter()
                .map(|a| match a {
                    Expr::Number(n) => Some(*n),
                    _ => None,
                })
                .collect();
            match numeric {
                Some(values) => Expr::Number(apply_function(&name, &values)),
                None => Expr::Function(name, args),
            }
        }
    })
}

fn check_arity(name: &str, arity: usize) -> Result<(), EvalError> {
    let ok = match name {
        "sqrt" | "abs" | "sin" | "cos" | "tan" | "asin" | "acos" | "atan" | "ln" | "exp"
        | "floor" | "ceil" | "round" => arity == 1,
        "log" => arity == 1 || arity == 2,
        _ => return Err(EvalError::UnknownFunction(name.to_string())),
    };
    if ok {
        Ok(())
    } else {
        Err(EvalError::WrongArity(name.to_string()))
    }
}

fn apply_function(name: &str, args: &[f64]) -> f64 {
    match (name, args) {
        ("sqrt", [x]) => x.sqrt(),
        ("abs", [x]) => x.abs(),
        ("sin", [x]) => x.sin(),
        ("cos", [x]) => x.cos(),
        ("tan", [x]) => x.tan(),
        ("asin", [x]) => x.asin(),
        ("acos", [x]) => x.acos(),
        ("atan", [x]) => x.atan(),
        ("ln", [x]) | ("log", [x]) => x.ln(),
        ("log", [x, base]) => x.log(*base),
        ("exp", [x]) => x.exp(),
        ("floor", [x]) => x.floor(),
        ("ceil", [x]) => x.ceil(),
        ("round", [x]) => x.round(),
        // check_arity has already vetted name and argument count
        _ => f64::NAN,
    }
}

fn first_variable(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Number(_) => None,
        Expr::Variable(name) => Some(name),
        Expr::Neg(inner) => first_variable(inner),
        Expr::Add(l, r)
        | Expr::Sub(l, r)
        | Expr::Mul(l, r)
        | Expr::Div(l, r)
        | Expr::Pow(l, r) => first_variable(l).or_else(|| first_variable(r)),
        Expr::Function(_, args) => args.iter().find_map(first_variable),
    }
}

fn contains_variable(expr: &Expr, variable: &str) -> bool {
    match expr {
        Expr::Number(_) => false,
        Expr::Variable(name) => name == variable,
        Expr::Neg(inner) => contains_variable(inner, variable),
        Expr::Add(l, r)
        | Expr::Sub(l, r)
        | Expr::Mul(l, r)
        | Expr::Div(l, r)
        | Expr::Pow(l, r) => contains_variable(l, variable) || contains_variable(r, variable),
        Expr::Function(_, args) => args.iter().any(|a| contains_variable(a, variable)),
    }
}

fn differentiate(expr: &Expr, var: &str) -> Result<Expr, EvalError> {
    Ok(match expr {
        Expr::Number(_) => Expr::Number(0.0),
        Expr::Variable(name) => Expr::Number(if name == var { 1.0 } else { 0.0 }),
        Expr::Neg(inner) => Expr::Neg(Box::new(differentiate(inner, var)?)),
        Expr::Add(l, r) => Expr::Add(
            Box::new(differentiate(l, var)?),
            Box::new(differentiate(r, var)?),
        ),
        Expr::Sub(l, r) => Expr::Sub(
            Box::new(differentiate(l, var)?),
            Box::new(differentiate(r, var)?),
        ),
        Expr::Mul(l, r) => Expr::Add(
            Box::new(Expr::Mul(
                Box::new(differentiate(l, var)?),
                r.clone(),
            )),
            Box::new(Expr::Mul(
                l.clone(),
                Box::new(differentiate(r, var)?),
            )),
        ),
        Expr::Div(l, r) => Expr::Div(
            Box::new(Expr::Sub(
                Box::new(Expr::Mul(Box::new(differentiate(l, var)?), r.clone())),
                Box::new(Expr::Mul(l.clone(), Box::new(differentiate(r, var)?))),
            )),
            Box::new(Expr::Pow(r.clone(), Box::new(Expr::Number(2.0)))),
        ),
        Expr::Pow(base, exp) if !contains_variable(exp, var) => {
            // d(u^c) = c * u^(c-1) * u'
            Expr::Mul(
                Box::new(Expr::Mul(
                    exp.clone(),
                    Box::new(Expr::Pow(
                        base.clone(),
                        Box::new(Expr::Sub(exp.clone(), Box::new(Expr::Number(1.0)))),
                    )),
                )),
                Box::new(differentiate(base, var)?),
            )
        }
        Expr::Pow(base, exp) if !contains_variable(base, var) => {
            // d(c^u) = c^u * ln(c) * u'
            Expr::Mul(
                Box::new(Expr::Mul(
                    Box::new(expr.clone()),
                    Box::new(Expr::Function("ln".to_string(), vec![(**base).clone()])),
                )),
                Box::new(differentiate(exp, var)?),
            )
        }
        Expr::Pow(..) => return Err(EvalError::UnsupportedDerivative(expr.to_string())),
        Expr::Function(name, args) if args.len() == 1 => {
            let u = &args[0];
            let outer = match name.as_str() {
                "sin" => Expr::Function("cos".to_string(), vec![u.clone()]),
                "cos" => Expr::Neg(Box::new(Expr::Function("sin".to_string(), vec![u.clone()]))),
                "tan" => Expr::Div(
                    Box::new(Expr::Number(1.0)),
                    Box::new(Expr::Pow(
                        Box::new(Expr::Function("cos".to_string(), vec![u.clone()])),
                        Box::new(Expr::Number(2.0)),
                    )),
                ),
                "exp" => Expr::Function("exp".to_string(), vec![u.clone()]),
                "ln" | "log" => Expr::Div(Box::new(Expr::Number(1.0)), Box::new(u.clone())),
                "sqrt" => Expr::Div(
                    Box::new(Expr::Number(1.0)),
                    Box::new(Expr::Mul(
                        Box::new(Expr::Number(2.0)),
                        Box::new(Expr::Function("sqrt".to_string(), vec![u.clone()])),
                    )),
                ),
                _ => return Err(EvalError::UnsupportedDerivative(expr.to_string())),
            };
            Expr::Mul(Box::new(outer), Box::new(differentiate(u, var)?))
        }
        Expr::Function(..) => return Err(EvalError::UnsupportedDerivative(expr.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_vars() -> VariableStore {
        VariableStore::new()
    }

    #[test]
    fn test_evaluate_arithmetic() {
        let cases = [
            ("2+2", "4"),
            ("2 * 3 + 1", "7"),
            ("2^10", "1024"),
            ("7 / 2", "3.5"),
            ("-3^2", "-9"),
            ("(1 + 2) * 3", "9"),
            ("1 / 0", "Infinity"),
        ];
        for (input, expected) in cases {
            assert_eq!(evaluate(input, &no_vars()).unwrap(), expected, "input {input}");
        }
    }

    #[test]
    fn test_evaluate_with_bindings() {
        let mut vars = VariableStore::new();
        vars.set("a", "5");
        assert_eq!(evaluate("a + 1", &vars).unwrap(), "6");
    }

    #[test]
    fn test_evaluate_transitive_bindings() {
        let mut vars = VariableStore::new();
        vars.set("b", "3");
        vars.set("a", "b + 1");
        assert_eq!(evaluate("a * 2", &vars).unwrap(), "8");
    }

    #[test]
    fn test_cycle_does_not_hang() {
        let mut vars = VariableStore::new();
        vars.set("a", "a + 1");
        // The cycle is broken by leaving `a` symbolic, so evaluation
        // reports it unresolved instead of hanging
        assert!(matches!(
            evaluate("a * 2", &vars),
            Err(EvalError::UndefinedSymbol(name)) if name == "a"
        ));
    }

    #[test]
    fn test_undefined_symbol() {
        assert!(matches!(
            evaluate("x + 1", &no_vars()),
            Err(EvalError::UndefinedSymbol(name)) if name == "x"
        ));
    }

    #[test]
    fn test_constants() {
        assert_eq!(evaluate("cos(0)", &no_vars()).unwrap(), "1");
        let pi = evaluate("pi", &no_vars()).unwrap();
        assert!(pi.starts_with("3.14159"));
        // A binding shadows the constant
        let mut vars = VariableStore::new();
        vars.set("pi", "3");
        assert_eq!(evaluate("pi", &vars).unwrap(), "3");
    }

    #[test]
    fn test_functions() {
        assert_eq!(evaluate("sqrt(16)", &no_vars()).unwrap(), "4");
        assert_eq!(evaluate("abs(-3)", &no_vars()).unwrap(), "3");
        assert_eq!(evaluate("floor(3.7)", &no_vars()).unwrap(), "3");
        assert!(evaluate("log(8, 2)", &no_vars()).is_ok());
        assert!(matches!(
            evaluate("frobnicate(1)", &no_vars()),
            Err(EvalError::UnknownFunction(_))
        ));
        assert!(matches!(
            evaluate("sqrt(1, 2)", &no_vars()),
            Err(EvalError::WrongArity(_))
        ));
    }

    #[test]
    fn test_simplify_folds_and_keeps_symbols() {
        assert_eq!(simplify("2 + 2", &no_vars()).unwrap(), "4");
        assert_eq!(simplify("x + 0", &no_vars()).unwrap(), "x");
        assert_eq!(simplify("1 * x", &no_vars()).unwrap(), "x");
        assert_eq!(simplify("x * 0", &no_vars()).unwrap(), "0");
        assert_eq!(simplify("x^1", &no_vars()).unwrap(), "x");
        assert_eq!(simplify("x^0", &no_vars()).unwrap(), "1");
        assert_eq!(simplify("2 * 3 + x", &no_vars()).unwrap(), "6 + x");
    }

    #[test]
    fn test_derivative_polynomial() {
        assert_eq!(derivative("x^2", "x").unwrap(), "2 * x");
        assert_eq!(derivative("x^3 + x", "x").unwrap(), "3 * x^2 + 1");
        assert_eq!(derivative("5", "x").unwrap(), "0");
        // Other symbols are treated as constants
        assert_eq!(derivative("y", "x").unwrap(), "0");
    }

    #[test]
    fn test_derivative_chain_rule() {
        assert_eq!(derivative("sin(x)", "x").unwrap(), "cos(x)");
        assert_eq!(derivative("exp(2 * x)", "x").unwrap(), "exp(2 * x) * 2");
    }

    #[test]
    fn test_derivative_unsupported() {
        assert!(matches!(
            derivative("x^x", "x"),
            Err(EvalError::UnsupportedDerivative(_))
        ));
    }

    #[test]
    fn test_rationalize_numeric() {
        assert_eq!(rationalize("0.5", &no_vars()).unwrap(), "1/2");
        assert_eq!(rationalize("0.25 + 0.25", &no_vars()).unwrap(), "1/2");
        assert_eq!(rationalize("4 / 2", &no_vars()).unwrap(), "2");
        assert_eq!(rationalize("-0.75", &no_vars()).unwrap(), "-3/4");
    }

    #[test]
    fn test_rationalize_rejects_symbols_and_nonfinite() {
        assert!(matches!(
            rationalize("x / 2", &no_vars()),
            Err(EvalError::NotRational(_))
        ));
        assert!(matches!(
            rationalize("1 / 0", &no_vars()),
            Err(EvalError::NotRational(_))
        ));
    }
}
