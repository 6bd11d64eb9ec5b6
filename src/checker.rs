//! Walks every homework named in a job file and checks all its tasks.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::warn;

use crate::config::{ConfigError, JobConfig};
use crate::tasks::Task;
use crate::tools::{self, CmdResult};

/// Results of one task, keyed by test name.
pub type TaskResults = BTreeMap<String, CmdResult>;

/// Everything checked for one homework.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeworkResult {
    /// The deadline had already passed when the check ran.
    pub expired: bool,
    /// Results per task, keyed by task name.
    pub tasks: BTreeMap<String, TaskResults>,
}

/// All results, keyed by homework name.
pub type CheckResults = BTreeMap<String, HomeworkResult>;

/// Checks the homeworks described by one job file.
pub struct Checker {
    config: JobConfig,
    checked_code_folder: PathBuf,
    job_root: PathBuf,
}

impl Checker {
    /// Load the job file and resolve where the checked code lives. Relative
    /// folders are taken relative to the job file.
    pub fn new(job_file_path: &Path) -> Result<Self, ConfigError> {
        let job_file_path = tools::expand_user(job_file_path);
        let config = JobConfig::load(&job_file_path)?;
        let job_root = match job_file_path.parent() {
            Some(parent) if parent != Path::new("") => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let checked_code_folder = tools::resolve_relative_to(&job_root, &config.folder);
        Ok(Self {
            config,
            checked_code_folder,
            job_root,
        })
    }

    /// Run over all tasks in all homeworks.
    pub async fn check_homework(&self) -> CheckResults {
        let mut results = CheckResults::new();
        for homework in &self.config.homeworks {
            let current_folder = self.checked_code_folder.join(&homework.folder);
            if !current_folder.exists() {
                warn!(
                    "Folder '{}' does not exist. Skipping.",
                    current_folder.display()
                );
                continue;
            }
            let expired = Local::now().naive_local() > homework.submit_by;
            let mut homework_result = HomeworkResult {
                expired,
                tasks: BTreeMap::new(),
            };
            for task_spec in &homework.tasks {
                let Some(task) = Task::from_spec(task_spec, &current_folder, &self.job_root)
                else {
                    continue;
                };
                homework_result
                    .tasks
                    .insert(task.name.clone(), task.check_all_tests().await);
            }
            results.insert(homework.name.clone(), homework_result);
        }
        results
    }
}
