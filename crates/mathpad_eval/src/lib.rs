//! Bundled reference math delegate.
//!
//! A deliberately small stand-in for the symbolic-math library the engine
//! delegates to: decimal/f64 evaluation with variable substitution,
//! constant folding, a polynomial/elementary-function derivative, and
//! exact-fraction rationalization of numeric expressions. The engine crates
//! depend only on the [`MathDelegate`] trait; swapping this crate out for a
//! full CAS is a matter of implementing that trait.

pub mod ast;
pub mod error;
pub mod eval;
pub mod parser;

pub use ast::Expr;
pub use error::{EvalError, ParseError};

use mathpad_engine::{DelegateError, MathDelegate};
use mathpad_session::VariableStore;

/// The bundled [`MathDelegate`] implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }
}

impl MathDelegate for Evaluator {
    fn evaluate(&self, expr: &str, bindings: &VariableStore) -> Result<String, DelegateError> {
        eval::evaluate(expr, bindings).map_err(into_delegate)
    }

    fn simplify(&self, expr: &str, bindings: &VariableStore) -> Result<String, DelegateError> {
        eval::simplify(expr, bindings).map_err(into_delegate)
    }

    fn derivative(&self, expr: &str, variable: &str) -> Result<String, DelegateError> {
        eval::derivative(expr, variable).map_err(into_delegate)
    }

    fn rationalize(&self, expr: &str, bindings: &VariableStore) -> Result<String, DelegateError> {
        eval::rationalize(expr, bindings).map_err(into_delegate)
    }
}

fn into_delegate(e: EvalError) -> DelegateError {
    DelegateError::new(e.to_string())
}
