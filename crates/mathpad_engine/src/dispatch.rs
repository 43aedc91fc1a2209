//! Single-step command classifier over the input line's prefix.
//!
//! Recognized forms, first match wins: `clear`, assignment (first `=`),
//! `simplify`, `derive`, `rationalize`, and plain evaluation as the default
//! path. No lookahead beyond prefix matching and one `=` split.

use mathpad_session::{HistoryRecord, Icon, VariableStore};
use tracing::debug;

use crate::delegate::MathDelegate;
use crate::error::CommandError;

/// Equation text of a record produced from a caught command failure. The
/// failing input line itself is debug-logged, not stored.
pub const INVALID_EQUATION: &str = "Invalid equation";

/// The fixed informational record for `clear` input. Producing it does not
/// clear anything; clearing is a separate explicit engine operation.
pub const CLEAR_EQUATION: &str = "Clear history";
pub const CLEAR_RESULT: &str = "Delete history and previously set variables";

/// What a dispatched command produced.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub record: HistoryRecord,
    /// Name bound by an assignment, when the command was one.
    pub bound_variable: Option<String>,
}

impl CommandOutcome {
    fn of(record: HistoryRecord) -> Self {
        Self {
            record,
            bound_variable: None,
        }
    }
}

/// Classify and execute one input line against the bindings and delegate.
///
/// Command failures never escape: they become a record with the
/// [`INVALID_EQUATION`] marker, the failure's message as result, and the
/// error icon.
pub fn dispatch<D: MathDelegate + ?Sized>(
    input: &str,
    vars: &mut VariableStore,
    delegate: &D,
) -> CommandOutcome {
    if input.starts_with("clear") {
        return CommandOutcome::of(HistoryRecord::new(
            CLEAR_EQUATION,
            CLEAR_RESULT,
            Icon::DeleteForever,
        ));
    }

    // Assignment: split on the first '='. Simplification failures fall back
    // to the raw trimmed text, so an assignment itself never errors.
    if let Some((name, expr)) = input.split_once('=') {
        let name = name.trim().to_string();
        let value = match delegate.simplify(expr, vars) {
            Ok(value) => value,
            Err(e) => {
                debug!(input, error = %e, "assignment value kept unsimplified");
                expr.trim().to_string()
            }
        };
        vars.set(name.clone(), value.clone());
        return CommandOutcome {
            record: HistoryRecord::new(input, value, Icon::Equal),
            bound_variable: Some(name),
        };
    }

    let attempt = (|| -> Result<(String, Icon), CommandError> {
        if let Some(rest) = input.strip_prefix("simplify") {
            return Ok((delegate.simplify(rest, vars)?, Icon::Function));
        }
        if let Some(rest) = input.strip_prefix("derive") {
            let rest = rest.trim_start();
            let mut tokens = rest.splitn(2, char::is_whitespace);
            let variable = tokens
                .next()
                .filter(|v| !v.is_empty())
                .ok_or(CommandError::MissingDeriveVariable)?;
            let body = tokens.next().unwrap_or("");
            return Ok((delegate.derivative(body, variable)?, Icon::Function));
        }
        if let Some(rest) = input.strip_prefix("rationalize") {
            return Ok((delegate.rationalize(rest, vars)?, Icon::Function));
        }
        Ok((delegate.evaluate(input, vars)?, Icon::Calculate))
    })();

    match attempt {
        Ok((result, icon)) => CommandOutcome::of(HistoryRecord::new(input, result, icon)),
        Err(e) => {
            debug!(input, error = %e, "command failed");
            CommandOutcome::of(HistoryRecord::new(
                INVALID_EQUATION,
                e.to_string(),
                Icon::Error,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::DelegateError;

    /// Delegate double that echoes which entry point ran.
    struct Probe;

    impl MathDelegate for Probe {
        fn evaluate(&self, expr: &str, _: &VariableStore) -> Result<String, DelegateError> {
            Ok(format!("eval:{}", expr.trim()))
        }
        fn simplify(&self, expr: &str, _: &VariableStore) -> Result<String, DelegateError> {
            let expr = expr.trim();
            if expr.contains('!') {
                return Err(DelegateError::new(format!("Cannot simplify {expr}")));
            }
            Ok(format!("simp:{expr}"))
        }
        fn derivative(&self, expr: &str, variable: &str) -> Result<String, DelegateError> {
            Ok(format!("d/d{variable}:{}", expr.trim()))
        }
        fn rationalize(&self, expr: &str, _: &VariableStore) -> Result<String, DelegateError> {
            Ok(format!("rat:{}", expr.trim()))
        }
    }

    #[test]
    fn test_clear_produces_fixed_record_without_clearing() {
        let mut vars = VariableStore::new();
        vars.set("a", "1");

        let outcome = dispatch("clear", &mut vars, &Probe);
        assert_eq!(outcome.record.equation, CLEAR_EQUATION);
        assert_eq!(outcome.record.icon, Icon::DeleteForever);
        // The record is informational; state is untouched
        assert_eq!(vars.get("a"), Some("1"));
    }

    #[test]
    fn test_assignment_binds_simplified_value() {
        let mut vars = VariableStore::new();
        let outcome = dispatch("x = 2+2", &mut vars, &Probe);

        assert_eq!(vars.get("x"), Some("simp:2+2"));
        assert_eq!(outcome.record.icon, Icon::Equal);
        assert_eq!(outcome.record.equation, "x = 2+2");
        assert_eq!(outcome.bound_variable.as_deref(), Some("x"));
    }

    #[test]
    fn test_assignment_falls_back_to_raw_text() {
        let mut vars = VariableStore::new();
        let outcome = dispatch("x = boom!", &mut vars, &Probe);

        assert_eq!(vars.get("x"), Some("boom!"));
        assert_eq!(outcome.record.result, "boom!");
        assert_eq!(outcome.record.icon, Icon::Equal);
    }

    #[test]
    fn test_assignment_splits_on_first_equals() {
        let mut vars = VariableStore::new();
        dispatch("x = y = 3", &mut vars, &Probe);
        assert_eq!(vars.get("x"), Some("simp:y = 3"));
        assert!(!vars.contains("y"));
    }

    #[test]
    fn test_prefix_commands_route_to_delegate() {
        let mut vars = VariableStore::new();

        let simp = dispatch("simplify x + 0", &mut vars, &Probe);
        assert_eq!(simp.record.result, "simp:x + 0");
        assert_eq!(simp.record.icon, Icon::Function);

        let der = dispatch("derive x x^2", &mut vars, &Probe);
        assert_eq!(der.record.result, "d/dx:x^2");
        assert_eq!(der.record.icon, Icon::Function);

        let rat = dispatch("rationalize 0.5", &mut vars, &Probe);
        assert_eq!(rat.record.result, "rat:0.5");
        assert_eq!(rat.record.icon, Icon::Function);

        let eval = dispatch("1 + 2", &mut vars, &Probe);
        assert_eq!(eval.record.result, "eval:1 + 2");
        assert_eq!(eval.record.icon, Icon::Calculate);
    }

    #[test]
    fn test_derive_without_variable_is_malformed() {
        let mut vars = VariableStore::new();
        let outcome = dispatch("derive", &mut vars, &Probe);

        assert_eq!(outcome.record.equation, INVALID_EQUATION);
        assert_eq!(outcome.record.icon, Icon::Error);
        assert_eq!(outcome.record.result, "Format: derive <respect-to> <equation>");
    }

    #[test]
    fn test_delegate_failure_becomes_error_record() {
        let mut vars = VariableStore::new();
        let outcome = dispatch("simplify boom!", &mut vars, &Probe);

        assert_eq!(outcome.record.equation, INVALID_EQUATION);
        assert_eq!(outcome.record.icon, Icon::Error);
        assert_eq!(outcome.record.result, "Cannot simplify boom!");
        assert!(outcome.bound_variable.is_none());
    }
}
