#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

/// Options to customize a temporary student code tree.
#[derive(Debug, Clone, Default)]
pub struct StudentTreeOptions<'a> {
    /// Prefix for the temp dir name. A UUID is appended for uniqueness.
    pub prefix: Option<&'a str>,
    /// Add a task that hands its arguments to the prebuilt probe fixture.
    pub with_probe_wrapper: bool,
    /// Add a cargo crate task with its own unit test.
    pub with_rust_crate: bool,
    /// Add a cargo crate task whose source does not compile.
    pub with_broken_rust_crate: bool,
    /// Add a task that reads a data folder which tests can shadow by
    /// injection, plus the folder to inject from next to the job file.
    pub with_injectable_data: bool,
    /// Add a second homework with a task that always fails.
    pub with_failing_homework: bool,
}

/// Create a temporary tree of student code to point a job file at.
/// Ensures a unique directory via tempfile and uuid and never writes to the
/// repo root.
pub fn create_student_tree(opts: StudentTreeOptions<'_>) -> Result<TempDir> {
    let uuid = uuid::Uuid::new_v4();
    let prefix = opts.prefix.unwrap_or("homework_checker_test_");
    let temp_dir = tempfile::Builder::new()
        .prefix(&format!("{prefix}{uuid}_"))
        .tempdir()?;
    let root = temp_dir.path();

    // Always present: two small bash tasks.
    let say_hello = root.join("homeworks/homework_1/say_hello");
    fs::create_dir_all(&say_hello)?;
    fs::write(say_hello.join("greet.sh"), "echo 'hello world'\n")?;

    let sum_numbers = root.join("homeworks/homework_1/sum_numbers");
    fs::create_dir_all(&sum_numbers)?;
    fs::write(sum_numbers.join("main.sh"), "echo $(($1 + $2))\n")?;

    if opts.with_probe_wrapper {
        let probe = root.join("homeworks/homework_1/probe");
        fs::create_dir_all(&probe)?;
        // The wrapper hands everything to the prebuilt fixture binary.
        fs::write(
            probe.join("probe.sh"),
            format!("{} \"$@\"\n", env!("CARGO_BIN_EXE_echo_probe")),
        )?;
    }

    if opts.with_rust_crate {
        write_adder_crate(&root.join("homeworks/homework_1/adder"))?;
    }

    if opts.with_broken_rust_crate {
        write_broken_crate(&root.join("homeworks/homework_1/broken_build"))?;
    }

    if opts.with_injectable_data {
        let read_data = root.join("homeworks/homework_1/read_data");
        fs::create_dir_all(read_data.join("data"))?;
        fs::write(read_data.join("main.sh"), "cat data/value.txt\n")?;
        fs::write(read_data.join("data/value.txt"), "original\n")?;

        let injectable = root.join("fixtures/data");
        fs::create_dir_all(&injectable)?;
        fs::write(injectable.join("value.txt"), "injected\n")?;
    }

    if opts.with_failing_homework {
        let crash = root.join("homeworks/homework_2/crash");
        fs::create_dir_all(&crash)?;
        fs::write(
            crash.join("main.sh"),
            "echo 'so far so good'\n>&2 echo 'boom'\nexit 1\n",
        )?;
    }

    Ok(temp_dir)
}

/// Write a job file into the tree and return its path.
pub fn write_job(root: &Path, content: &str) -> Result<PathBuf> {
    let job_path = root.join("job.yml");
    fs::write(&job_path, content)?;
    Ok(job_path)
}

/// Convenience wrapper for the plain two-task tree.
pub fn create_basic_tree() -> Result<TempDir> {
    create_student_tree(StudentTreeOptions::default())
}

/// Convenience wrapper with every optional task enabled.
pub fn create_full_tree() -> Result<TempDir> {
    create_student_tree(StudentTreeOptions {
        with_probe_wrapper: true,
        with_rust_crate: true,
        with_broken_rust_crate: true,
        with_injectable_data: true,
        with_failing_homework: true,
        ..Default::default()
    })
}

fn write_adder_crate(folder: &Path) -> Result<()> {
    fs::create_dir_all(folder.join("src"))?;
    fs::write(
        folder.join("Cargo.toml"),
        r#"[package]
name = "adder"
version = "0.1.0"
edition = "2021"

[dependencies]
"#,
    )?;
    fs::write(
        folder.join("src/main.rs"),
        r#"fn sum(values: &[i64]) -> i64 {
    values.iter().sum()
}

fn main() {
    let values: Vec<i64> = std::env::args()
        .skip(1)
        .filter_map(|arg| arg.parse().ok())
        .collect();
    println!("{}", sum(&values));
}

#[cfg(test)]
mod tests {
    #[test]
    fn sums_a_pair() {
        assert_eq!(super::sum(&[2, 3]), 5);
    }
}
"#,
    )?;
    Ok(())
}

fn write_broken_crate(folder: &Path) -> Result<()> {
    fs::create_dir_all(folder.join("src"))?;
    fs::write(
        folder.join("Cargo.toml"),
        r#"[package]
name = "broken_build"
version = "0.1.0"
edition = "2021"

[dependencies]
"#,
    )?;
    // The type error keeps the crate from ever compiling.
    fs::write(
        folder.join("src/main.rs"),
        r#"fn main() {
    let count: i64 = "not a number";
    println!("{count}");
}
"#,
    )?;
    Ok(())
}
