//! Prints the remote url of a git repo, or of its wiki twin, given any of
//! the common remote url forms.

use std::env;
use std::process::ExitCode;

use homework_checker::tools::parse_git_url;

fn usage() {
    println!("ERROR: must be supplied with a git url and type [wiki|code]");
    println!("[Example]: print_repo_name git@gitlab.igg.uni-bonn.de:igor/some_project.git wiki");
    println!("[Example]: print_repo_name https://gitlab.ipb.uni-bonn.de/igor/some_project.git code");
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let [url, repo_type] = args.as_slice() else {
        usage();
        return ExitCode::FAILURE;
    };
    let Some(parsed) = parse_git_url(url) else {
        println!("ERROR: cannot parse git url '{url}'");
        return ExitCode::FAILURE;
    };
    let remote = match repo_type.as_str() {
        "wiki" => format!(
            "git@{}:{}/{}.wiki.git",
            parsed.domain, parsed.user, parsed.project
        ),
        "code" => format!("git@{}:{}/{}.git", parsed.domain, parsed.user, parsed.project),
        other => {
            println!("ERROR: type \"{other}\" is not \"wiki\" or \"code\"");
            return ExitCode::FAILURE;
        }
    };
    println!("{remote}");
    ExitCode::SUCCESS
}
