//! End to end checks of the repo name tool.

use std::process::{Command, Output};

fn run_tool(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_print_repo_name"))
        .args(args)
        .output()
        .expect("the repo name binary runs")
}

#[test]
fn wiki_twin_from_scp_style_url() {
    let output = run_tool(&["git@github.com:PRBonn/depth_clustering.git", "wiki"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "git@github.com:PRBonn/depth_clustering.wiki.git\n"
    );
}

#[test]
fn code_url_from_https_url() {
    let output = run_tool(&["https://gitlab.ipb.uni-bonn.de/igor/some_project.git", "code"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "git@gitlab.ipb.uni-bonn.de:igor/some_project.git\n"
    );
}

#[test]
fn braces_in_the_domain_stay_verbatim() {
    let output = run_tool(&["git@{user}.example.com:alice/proj.git", "code"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "git@{user}.example.com:alice/proj.git\n"
    );
}

#[test]
fn missing_arguments_print_usage() {
    let output = run_tool(&[]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("ERROR: must be supplied with a git url and type [wiki|code]\n"));
    assert!(stdout.contains("[Example]: print_repo_name"));
}

#[test]
fn unknown_type_is_rejected() {
    let output = run_tool(&["git@github.com:PRBonn/depth_clustering.git", "docs"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "ERROR: type \"docs\" is not \"wiki\" or \"code\"\n"
    );
}

#[test]
fn unparseable_urls_are_rejected() {
    let output = run_tool(&["not a url", "wiki"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "ERROR: cannot parse git url 'not a url'\n"
    );
}
