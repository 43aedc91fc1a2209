use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("Unexpected end of expression")]
    Empty,
    #[error("Parse error: {0}")]
    NomError(String),
    #[error("Unexpected part \"{0}\"")]
    UnconsumedInput(String),
}

/// Failure while evaluating, simplifying, deriving, or rationalizing.
/// The display text is what the engine shows in an error-tagged record.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Undefined symbol {0}")]
    UndefinedSymbol(String),
    #[error("Unknown function {0}")]
    UnknownFunction(String),
    #[error("Wrong number of arguments to {0}")]
    WrongArity(String),
    #[error("Cannot evaluate {0}")]
    CannotEvaluate(String),
    #[error("Cannot derive {0}")]
    UnsupportedDerivative(String),
    #[error("Cannot rationalize {0}")]
    NotRational(String),
}
