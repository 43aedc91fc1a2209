use thiserror::Error;

use crate::delegate::DelegateError;

/// Failure raised while executing a dispatched command.
///
/// Always caught at the dispatcher boundary and converted into an
/// error-tagged history record, so `evaluate` returns a value, never an error.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A `derive` command missing its differentiation variable.
    #[error("Format: derive <respect-to> <equation>")]
    MissingDeriveVariable,
    /// Any failure surfaced by the math delegate.
    #[error(transparent)]
    Delegate(#[from] DelegateError),
}
