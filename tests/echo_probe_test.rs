//! End to end checks of the probe fixture binary: exact bytes on stderr and
//! exact exit codes for every argument count.

use std::process::{Command, Output};

const FIXED_LINE: &str = "This is a long test output that we expect to be produced by the code. We will compare the ouput to this EXACTLY.\n";

fn run_probe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_echo_probe"))
        .args(args)
        .output()
        .expect("the probe binary runs")
}

#[test]
fn no_arguments_print_the_fixed_line() {
    let output = run_probe(&[]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    assert_eq!(String::from_utf8_lossy(&output.stderr), FIXED_LINE);
}

#[test]
fn two_arguments_are_echoed_back() {
    let output = run_probe(&["foo", "bar"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    assert_eq!(String::from_utf8_lossy(&output.stderr), "foo bar output\n");
}

#[test]
fn extra_arguments_are_ignored() {
    let output = run_probe(&["a", "b", "c"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    assert_eq!(String::from_utf8_lossy(&output.stderr), "a b output\n");
}

#[test]
fn one_argument_is_a_usage_error() {
    let output = run_probe(&["foo"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "ERROR: expected no arguments or at least two, got one: 'foo'\n\
         [Example]: echo_probe foo bar\n"
    );
}

#[test]
fn repeated_runs_are_byte_identical() {
    for args in [&[][..], &["foo", "bar"][..]] {
        let first = run_probe(args);
        let second = run_probe(args);
        assert_eq!(first.stdout, second.stdout);
        assert_eq!(first.stderr, second.stderr);
        assert_eq!(first.status.code(), second.status.code());
    }
}
