//! Smoke tests for the one-shot eval form of the binary.

use assert_cmd::cargo;
use std::process::Command;

fn eval(expr: &str) -> std::process::Output {
    Command::new(cargo::cargo_bin!("mathpad"))
        .arg("eval")
        .arg(expr)
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_eval_prints_result() {
    let output = eval("2+2");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "4");
}

#[test]
fn test_eval_commands_work_one_shot() {
    let output = eval("derive x x^2");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "2 * x");
}

#[test]
fn test_eval_reports_errors_on_stderr() {
    let output = eval("bogus((");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
}
