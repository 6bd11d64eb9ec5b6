//! Tasks and their language backends.
//!
//! A [`Task`] owns one student task folder and walks it through the full
//! sequence: inject helper folders, build, run every test, restore what was
//! injected and collect a result per step. Everything language specific
//! lives behind [`TaskBackend`] so adding a language means adding one
//! implementation, not another copy of the sequence.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use crate::config::{BuildKind, Language, TaskSpec, TestSpec};
use crate::tools::{self, BUILD_TIMEOUT, CmdResult, DEFAULT_TIMEOUT};

/// Key under which the build step reports. The `0.` prefix keeps it at the
/// top of the sorted report table.
pub const BUILD_SUCCESS_TAG: &str = "0. Build succeeded";

/// Key under which style errors report, sorted next to the build result.
pub const STYLE_ERROR_TAG: &str = "0. Style errors";

const BACKUP_FOLDER: &str = ".backup";

const CMAKE_BUILD_CMD: &str = "cmake .. && make -j2";
const REMAKE_AND_TEST: &str = "make clean && rm -r * && cmake .. && make -j2 && ctest -VV";
const CARGO_BUILD_CMD: &str = "cargo build -q";
const CARGO_TEST_CMD: &str = "cargo test -q";

const CPPLINT_CMD: &str = concat!(
    "cpplint --counting=detailed ",
    "--filter=-legal,-readability/todo,",
    "-build/include_order,-runtime/threadsafe_fn,",
    "-runtime/arrays",
    " $( find . -name \"*.h\" -o -name \"*.cpp\" | grep -vE \"^./build/\" )"
);
const STYLE_ERROR_MARKER: &str = "Total errors found";

/// What a backend needs to know about the task it serves.
pub struct TaskContext<'a> {
    pub spec: &'a TaskSpec,
    /// The student's folder for this task.
    pub task_folder: &'a Path,
    /// Folder commands run from. Matches `task_folder` unless the backend
    /// builds out of tree.
    pub work_dir: &'a Path,
}

/// Language specific steps of checking a task.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Folder commands run from for this task.
    fn work_dir(&self, _spec: &TaskSpec, task_folder: &Path) -> PathBuf {
        task_folder.to_path_buf()
    }

    /// Build the task, or `None` when the language has no build step.
    async fn build(&self, _ctx: &TaskContext<'_>) -> Option<CmdResult> {
        None
    }

    /// Command line that executes the task with the given arguments.
    fn run_command_line(&self, ctx: &TaskContext<'_>, args: &str) -> String;

    /// Run the task's own test suite, or `None` when the language has none.
    async fn framework_tests(&self, _ctx: &TaskContext<'_>) -> Option<CmdResult> {
        None
    }

    /// Language specific style check, or `None` when there is none.
    async fn style_check(&self, _ctx: &TaskContext<'_>) -> Option<CmdResult> {
        None
    }
}

fn backend_for(language: Language) -> Box<dyn TaskBackend> {
    match language {
        Language::Cpp => Box::new(CppBackend),
        Language::Bash => Box::new(BashBackend),
        Language::Rust => Box::new(CargoBackend),
    }
}

/// One task of one homework, bound to a concrete student folder.
pub struct Task {
    pub name: String,
    spec: TaskSpec,
    task_folder: PathBuf,
    work_dir: PathBuf,
    backup_folder: PathBuf,
    job_root: PathBuf,
    backend: Box<dyn TaskBackend>,
}

impl Task {
    /// Create a task for its language, or `None` when the student has no
    /// folder for it.
    pub fn from_spec(spec: &TaskSpec, student_hw_folder: &Path, job_root: &Path) -> Option<Task> {
        let task_folder = student_hw_folder.join(&spec.folder);
        if !task_folder.exists() {
            warn!("Folder '{}' does not exist. Skipping.", task_folder.display());
            return None;
        }
        let backend = backend_for(spec.language);
        let work_dir = backend.work_dir(spec, &task_folder);
        Some(Task {
            name: spec.name.clone(),
            spec: spec.clone(),
            backup_folder: task_folder.join(BACKUP_FOLDER),
            task_folder,
            work_dir,
            job_root: job_root.to_path_buf(),
            backend,
        })
    }

    /// Run the whole sequence for this task and report one result per step.
    pub async fn check_all_tests(&self) -> BTreeMap<String, CmdResult> {
        let mut results = BTreeMap::new();
        let injected = self.inject_folders(&self.spec.inject_folders);
        let build_result = self.backend.build(&self.context()).await;
        self.restore_folders(&injected);
        if let Some(build_result) = build_result {
            let build_succeeded = build_result.succeeded();
            results.insert(BUILD_SUCCESS_TAG.to_string(), build_result);
            if !build_succeeded {
                // The build has failed, so no further testing needed.
                return results;
            }
        }
        for test in &self.spec.tests {
            let injected = self.inject_folders(&test.inject_folders);
            let test_result = self.run_test(test).await;
            self.restore_folders(&injected);
            results.insert(test.name.clone(), test_result);
        }
        if let Some(style_errors) = self.backend.style_check(&self.context()).await {
            results.insert(STYLE_ERROR_TAG.to_string(), style_errors);
        }
        results
    }

    fn context(&self) -> TaskContext<'_> {
        TaskContext {
            spec: &self.spec,
            task_folder: &self.task_folder,
            work_dir: &self.work_dir,
        }
    }

    async fn run_test(&self, test: &TestSpec) -> CmdResult {
        if test.run_google_tests
            && let Some(result) = self.backend.framework_tests(&self.context()).await
        {
            return result;
        }
        let mut run_cmd = self.backend.run_command_line(&self.context(), &test.input_args);
        if !self.spec.pipe_through.is_empty() {
            run_cmd.push(' ');
            run_cmd.push_str(&self.spec.pipe_through);
        }
        let mut run_result = tools::run_command(&run_cmd, &self.work_dir, DEFAULT_TIMEOUT).await;
        if !run_result.succeeded() {
            return run_result;
        }
        let Some(expected) = &test.expected_output else {
            // Nothing to compare against, a clean run is enough.
            return run_result;
        };
        let actual = match tools::convert_to(self.spec.output_type, run_result.stdout()) {
            Ok(actual) => actual,
            Err(error) => {
                run_result.set_stderr(error.to_string());
                return run_result;
            }
        };
        let expected = match tools::convert_to(self.spec.output_type, &expected.to_string()) {
            Ok(expected) => expected,
            Err(error) => {
                run_result.set_stderr(error.to_string());
                return run_result;
            }
        };
        if actual != expected {
            run_result.set_stderr(format!(
                "Given input: '{input}'\nYour output '{actual}'\nExpected output: '{expected}'",
                input = test.input_args,
            ));
        }
        run_result
    }

    /// Copy helper folders into the student task folder, backing up whatever
    /// they shadow. Returns the names that were injected.
    fn inject_folders(&self, folders: &[String]) -> Vec<String> {
        let mut injected = Vec::new();
        for folder in folders {
            let source = tools::resolve_relative_to(&self.job_root, folder);
            let Some(folder_name) = source.file_name() else {
                warn!("Cannot inject '{folder}': no folder name.");
                continue;
            };
            let folder_name = folder_name.to_string_lossy().to_string();
            if let Err(err) = self.inject_folder(&folder_name, &source) {
                warn!("Failed to inject folder '{}': {err}", source.display());
                continue;
            }
            injected.push(folder_name);
        }
        injected
    }

    fn inject_folder(&self, folder_name: &str, source: &Path) -> std::io::Result<()> {
        let destination = self.task_folder.join(folder_name);
        fs::create_dir_all(&self.backup_folder)?;
        if destination.exists() {
            fs::rename(&destination, self.backup_folder.join(folder_name))?;
        }
        tools::copy_dir_recursive(source, &destination)
    }

    /// Undo [`Task::inject_folders`], moving shadowed folders back in place.
    fn restore_folders(&self, injected: &[String]) {
        for folder_name in injected {
            let destination = self.task_folder.join(folder_name);
            if destination.is_dir() {
                let _ = fs::remove_dir_all(&destination);
            }
            let backup = self.backup_folder.join(folder_name);
            if backup.is_dir() {
                let _ = fs::rename(&backup, &destination);
            }
        }
        // Gone once the last backup moved out. Missing is fine too.
        let _ = fs::remove_dir(&self.backup_folder);
    }
}

fn simple_build_command(spec: &TaskSpec) -> String {
    format!(
        "clang++ -std=c++14 -o {binary} {compiler_flags} {binary}.cpp",
        binary = spec.binary_name,
        compiler_flags = spec.compiler_flags,
    )
}

struct CppBackend;

#[async_trait]
impl TaskBackend for CppBackend {
    fn work_dir(&self, spec: &TaskSpec, task_folder: &Path) -> PathBuf {
        match spec.build_type {
            // The cmake project always works from a build folder.
            BuildKind::Cmake => task_folder.join("build"),
            BuildKind::Simple => task_folder.to_path_buf(),
        }
    }

    async fn build(&self, ctx: &TaskContext<'_>) -> Option<CmdResult> {
        match ctx.spec.build_type {
            BuildKind::Cmake => {
                if let Err(err) = fs::create_dir_all(ctx.work_dir) {
                    return Some(CmdResult::new(
                        None,
                        "",
                        format!("Failed to create folder '{}': {err}", ctx.work_dir.display()),
                    ));
                }
                Some(tools::run_command(CMAKE_BUILD_CMD, ctx.work_dir, BUILD_TIMEOUT).await)
            }
            BuildKind::Simple => {
                let command = simple_build_command(ctx.spec);
                Some(tools::run_command(&command, ctx.work_dir, DEFAULT_TIMEOUT).await)
            }
        }
    }

    fn run_command_line(&self, ctx: &TaskContext<'_>, args: &str) -> String {
        format!("./{} {}", ctx.spec.binary_name, args)
    }

    async fn framework_tests(&self, ctx: &TaskContext<'_>) -> Option<CmdResult> {
        Some(tools::run_command(REMAKE_AND_TEST, ctx.work_dir, BUILD_TIMEOUT).await)
    }

    async fn style_check(&self, ctx: &TaskContext<'_>) -> Option<CmdResult> {
        let result = tools::run_command(CPPLINT_CMD, ctx.task_folder, DEFAULT_TIMEOUT).await;
        if result.stderr().contains(STYLE_ERROR_MARKER) {
            return Some(result);
        }
        None
    }
}

struct BashBackend;

#[async_trait]
impl TaskBackend for BashBackend {
    fn run_command_line(&self, ctx: &TaskContext<'_>, args: &str) -> String {
        format!("sh {}.sh {}", ctx.spec.binary_name, args)
    }
}

struct CargoBackend;

#[async_trait]
impl TaskBackend for CargoBackend {
    async fn build(&self, ctx: &TaskContext<'_>) -> Option<CmdResult> {
        Some(tools::run_command(CARGO_BUILD_CMD, ctx.work_dir, BUILD_TIMEOUT).await)
    }

    fn run_command_line(&self, ctx: &TaskContext<'_>, args: &str) -> String {
        format!("cargo run -q --bin {} -- {}", ctx.spec.binary_name, args)
    }

    async fn framework_tests(&self, ctx: &TaskContext<'_>) -> Option<CmdResult> {
        Some(tools::run_command(CARGO_TEST_CMD, ctx.work_dir, BUILD_TIMEOUT).await)
    }
}
