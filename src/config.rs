//! The job file format: which homeworks exist, where the checked code lives,
//! and what every task must print to pass.
//!
//! Unknown keys are rejected during parsing so a typo in a job file surfaces
//! as an error instead of a silently skipped setting. Optional keys fall back
//! to the same defaults the reference schema documents.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::tools::{DATE_PATTERN, max_date};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read job file '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed job file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Failed to render the job file schema")]
    Schema(#[from] serde_json::Error),
}

/// Top level of a job file.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Folder that all homework folders live under, relative to the job file
    /// unless absolute.
    pub folder: String,
    pub homeworks: Vec<HomeworkSpec>,
}

/// One homework: a folder of tasks and a deadline.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct HomeworkSpec {
    pub name: String,
    pub folder: String,
    /// Deadline in `YYYY-MM-DD HH:MM:SS`. Results submitted later are still
    /// checked but their errors stay hidden. Defaults to the end of time.
    #[serde(default = "max_date", deserialize_with = "deserialize_deadline")]
    pub submit_by: NaiveDateTime,
    pub tasks: Vec<TaskSpec>,
}

/// One task inside a homework folder.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TaskSpec {
    pub name: String,
    pub language: Language,
    pub folder: String,
    #[serde(default = "default_output_kind")]
    pub output_type: OutputKind,
    /// Extra flags handed to the compiler for simple builds.
    #[serde(default = "default_compiler_flags")]
    pub compiler_flags: String,
    /// Name of the produced binary or of the script to run.
    #[serde(default = "default_binary_name")]
    pub binary_name: String,
    /// Shell suffix appended to every run, e.g. `| sort` or `2>&1`.
    #[serde(default)]
    pub pipe_through: String,
    #[serde(default = "default_build_kind")]
    pub build_type: BuildKind,
    /// Folders copied into the task before building, restored afterwards.
    #[serde(default)]
    pub inject_folders: Vec<String>,
    #[serde(default)]
    pub tests: Vec<TestSpec>,
}

/// One test: arguments in, expected output back.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TestSpec {
    pub name: String,
    #[serde(default)]
    pub input_args: String,
    /// When missing, the test passes as long as the command succeeds.
    #[serde(default)]
    pub expected_output: Option<ExpectedOutput>,
    /// Run the task's own test suite instead of comparing output.
    #[serde(default)]
    pub run_google_tests: bool,
    #[serde(default)]
    pub inject_folders: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Cpp,
    Bash,
    Rust,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    String,
    Number,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::String => write!(f, "string"),
            OutputKind::Number => write!(f, "number"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BuildKind {
    Cmake,
    Simple,
}

/// Expected output of a test, either verbatim text or a number that is
/// compared after parsing so `42` matches `42.0`.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ExpectedOutput {
    Number(f64),
    Text(String),
}

impl fmt::Display for ExpectedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedOutput::Number(number) => write!(f, "{number}"),
            ExpectedOutput::Text(text) => write!(f, "{text}"),
        }
    }
}

fn default_output_kind() -> OutputKind {
    OutputKind::String
}

fn default_compiler_flags() -> String {
    "-Wall".to_string()
}

fn default_binary_name() -> String {
    "main".to_string()
}

fn default_build_kind() -> BuildKind {
    BuildKind::Cmake
}

fn deserialize_deadline<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, DATE_PATTERN).map_err(serde::de::Error::custom)
}

impl JobConfig {
    /// Load and validate a job file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render the job file schema as pretty JSON, for documentation and for
    /// editors that validate YAML against a schema.
    pub fn reference_schema() -> Result<String, ConfigError> {
        let schema = schema_for!(JobConfig);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}
