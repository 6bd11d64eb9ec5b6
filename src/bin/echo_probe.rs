//! Fixture binary with deterministic output for the checker's own tests.
//!
//! Without arguments it prints one fixed line, with two or more it echoes
//! the first two back. Everything goes to stderr, so stdout stays clean for
//! whatever pipes the caller sets up.

use std::env;
use std::process::ExitCode;

// The 'ouput' typo is part of the fixture text that tests compare against.
const FIXED_OUTPUT: &str = "This is a long test output that we expect to be produced by the code. We will compare the ouput to this EXACTLY.";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => {
            eprintln!("{FIXED_OUTPUT}");
            ExitCode::SUCCESS
        }
        [only] => {
            eprintln!("ERROR: expected no arguments or at least two, got one: '{only}'");
            eprintln!("[Example]: echo_probe foo bar");
            ExitCode::from(2)
        }
        [first, second, ..] => {
            eprintln!("{first} {second} output");
            ExitCode::SUCCESS
        }
    }
}
