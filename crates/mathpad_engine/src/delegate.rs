//! The seam between the session engine and the symbolic-math library.

use mathpad_session::VariableStore;
use thiserror::Error;

/// Failure surfaced by a math delegate: parse error, unresolved identifier,
/// domain error. The message is delegate-defined and becomes the visible
/// result text of an error-tagged history record.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DelegateError {
    message: String,
}

impl DelegateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Entry points the engine requires from a symbolic-math library.
///
/// Each operation takes an expression string and the current bindings and
/// returns a formatted result string. Bindings map identifiers to bound
/// value strings (possibly themselves expressions); how deeply a delegate
/// resolves them is its own business.
pub trait MathDelegate {
    /// Evaluate an expression to a formatted result.
    fn evaluate(&self, expr: &str, bindings: &VariableStore) -> Result<String, DelegateError>;

    /// Simplify an expression, resolving bindings where possible.
    fn simplify(&self, expr: &str, bindings: &VariableStore) -> Result<String, DelegateError>;

    /// Differentiate an expression with respect to `variable`.
    fn derivative(&self, expr: &str, variable: &str) -> Result<String, DelegateError>;

    /// Rewrite an expression in rationalized form.
    fn rationalize(&self, expr: &str, bindings: &VariableStore) -> Result<String, DelegateError>;
}
