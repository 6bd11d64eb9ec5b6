//! Shared plumbing for the checker: running shell commands with a time
//! limit, normalizing command output for comparison, and a handful of path,
//! date and git-url helpers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::LazyLock;
use std::time::Duration;

use chrono::NaiveDateTime;
use directories::BaseDirs;
use regex::Regex;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error};

use crate::config::OutputKind;

/// Date format used for homework deadlines.
pub const DATE_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

/// The latest representable deadline, used when a homework has none.
pub const MAX_DATE_STR: &str = "9999-12-31 23:59:59";

/// Time limit applied to test runs unless a step asks for more.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Time limit for build and framework-test steps.
pub const BUILD_TIMEOUT: Duration = Duration::from_secs(60);

/// Parse [`MAX_DATE_STR`] into a deadline value.
pub fn max_date() -> NaiveDateTime {
    NaiveDateTime::parse_from_str(MAX_DATE_STR, DATE_PATTERN)
        .expect("the maximum date constant parses")
}

/// A small container for the outcome of one executed command.
#[derive(Debug, Clone, PartialEq)]
pub struct CmdResult {
    returncode: Option<i32>,
    stdout: String,
    stderr: String,
}

impl CmdResult {
    pub const SUCCESS: i32 = 0;

    pub fn new(
        returncode: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            returncode,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// A command succeeded when it returned zero or, lacking a return code,
    /// wrote nothing to stderr.
    pub fn succeeded(&self) -> bool {
        match self.returncode {
            Some(code) => code == Self::SUCCESS,
            None => self.stderr.is_empty(),
        }
    }

    pub fn returncode(&self) -> Option<i32> {
        self.returncode
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Replace stderr, e.g. with a comparison failure message. The return
    /// code is cleared because it no longer matches what stderr reports.
    pub fn set_stderr(&mut self, stderr: impl Into<String>) {
        self.returncode = None;
        self.stderr = stderr.into();
    }
}

impl fmt::Display for CmdResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stderr.is_empty() {
            write!(f, "{}", self.stdout.trim())
        } else {
            write!(
                f,
                "stdout: {}, stderr: {}",
                self.stdout.trim(),
                self.stderr.trim()
            )
        }
    }
}

/// Run `command` through `sh -c` in `cwd`, capturing stdout and stderr.
///
/// Task commands rely on shell features (pipes, redirects), so the whole
/// line goes to the shell. The shell leads its own process group; when the
/// time limit expires the group as a whole is interrupted, otherwise a
/// timed-out `make` would leave compiler children running. Failures never
/// panic, they come back as a [`CmdResult`] whose stderr explains what
/// happened.
pub async fn run_command(command: &str, cwd: &Path, time_limit: Duration) -> CmdResult {
    debug!("running command:\n{command}");
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            error!("failed to start command '{command}': {err}");
            return CmdResult::new(None, "", format!("Failed to start command '{command}': {err}"));
        }
    };
    let pid = child.id();

    match timeout(time_limit, child.wait_with_output()).await {
        Ok(Ok(output)) => CmdResult::new(
            returncode_of(output.status),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        ),
        Ok(Err(err)) => {
            error!("command '{command}' failed: {err}");
            CmdResult::new(None, "", format!("Failed to run command '{command}': {err}"))
        }
        Err(_elapsed) => {
            interrupt_process_group(pid);
            let message = format!(
                "Timeout: command '{}' ran longer than {} seconds",
                command.trim(),
                time_limit.as_secs()
            );
            error!("{message}");
            CmdResult::new(Some(1), "", message)
        }
    }
}

/// A process killed by a signal has no exit code; report the negated
/// signal number instead so the run still counts as failed.
#[cfg(unix)]
fn returncode_of(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;

    status.code().or_else(|| status.signal().map(|signum| -signum))
}

#[cfg(not(unix))]
fn returncode_of(status: ExitStatus) -> Option<i32> {
    status.code()
}

#[cfg(unix)]
fn interrupt_process_group(pid: Option<u32>) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    // The group may already be gone; nothing to do about a failure here.
    if let Some(pid) = pid {
        let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGINT);
    }
}

#[cfg(not(unix))]
fn interrupt_process_group(_pid: Option<u32>) {}

/// Conversion of raw output into a comparable value failed.
#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    #[error("No value. Cannot convert to '{kind}'.")]
    Empty { kind: OutputKind },
    #[error("Cannot convert '{value}' to a number.")]
    NotANumber { value: String },
}

/// Command output normalized for comparison with an expected value.
#[derive(Debug, Clone, PartialEq)]
pub enum Converted {
    Text(String),
    Number(f64),
}

impl fmt::Display for Converted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Converted::Text(text) => write!(f, "{text}"),
            Converted::Number(number) => write!(f, "{number}"),
        }
    }
}

/// Normalize `value` according to the task's output type.
pub fn convert_to(kind: OutputKind, value: &str) -> Result<Converted, ConversionError> {
    if value.is_empty() {
        return Err(ConversionError::Empty { kind });
    }
    match kind {
        OutputKind::String => Ok(Converted::Text(value.trim().to_string())),
        OutputKind::Number => value
            .trim()
            .parse::<f64>()
            .map(Converted::Number)
            .map_err(|_| ConversionError::NotANumber {
                value: value.trim().to_string(),
            }),
    }
}

/// Pieces of a git remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitUrl {
    pub domain: String,
    pub user: String,
    pub project: String,
}

static GIT_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:git@|git://|https?://)([^:/@]+)[:/](.+)/([^/]+?)(?:\.git)?/?$")
        .expect("the git url regex compiles")
});

/// Split a git remote URL (https or scp style) into domain, user and project.
pub fn parse_git_url(url: &str) -> Option<GitUrl> {
    let captures = GIT_URL_REGEX.captures(url.trim())?;
    Some(GitUrl {
        domain: captures[1].to_string(),
        user: captures[2].to_string(),
        project: captures[3].to_string(),
    })
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_user(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if let Ok(stripped) = path.strip_prefix("~")
        && let Some(base_dirs) = BaseDirs::new()
    {
        return base_dirs.home_dir().join(stripped);
    }
    path.to_path_buf()
}

/// Resolve `path` against `base` unless it is absolute after `~` expansion.
pub fn resolve_relative_to(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let expanded = expand_user(path);
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// Copy a directory tree into `dest`, creating it if needed.
pub fn copy_dir_recursive(src: &Path, dest: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
