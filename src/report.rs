//! Writes check results into a markdown report: one summary table plus a
//! section with the full output of everything that failed.

use std::fs;
use std::io;
use std::path::Path;

use crate::checker::CheckResults;
use crate::tools::CmdResult;

const TABLE_SEPARATOR: &str = "|---|---|---|:---:|\n";

const SEPARATOR: &str = "--------\n";
const FINISHING_NOTE: &str = "With 💙 from homework bot 🤖\n";

const SUCCESS_TAG: &str = "✔";
const FAILED_TAG: &str = "✘";

/// Collects results into markdown and writes them out as one file.
pub struct MdWriter {
    md_table: String,
    errors: String,
}

impl MdWriter {
    pub fn new() -> Self {
        let mut md_table = row("Homework Name", "Task Name", "Test Name", "Result");
        md_table.push_str(TABLE_SEPARATOR);
        Self {
            md_table,
            errors: String::new(),
        }
    }

    /// Add every result to the table of completion. Homework and task names
    /// only show up on their first row. For homeworks past their deadline
    /// the failing output stays hidden.
    pub fn update(&mut self, results: &CheckResults) {
        for (hw_name, homework) in results {
            let mut need_hw_name = true;
            for (task_name, task_results) in &homework.tasks {
                let mut need_task_name = true;
                for (test_name, test_result) in task_results {
                    let result_sign = if test_result.succeeded() {
                        SUCCESS_TAG
                    } else {
                        FAILED_TAG
                    };
                    let extended_hw_name = if homework.expired {
                        format!("{hw_name} `[PAST DEADLINE]`")
                    } else {
                        hw_name.clone()
                    };
                    self.md_table.push_str(&row(
                        if need_hw_name { &extended_hw_name } else { "" },
                        if need_task_name { task_name } else { "" },
                        test_name,
                        result_sign,
                    ));
                    self.add_error(hw_name, task_name, test_name, test_result, homework.expired);
                    need_hw_name = false;
                    need_task_name = false;
                }
            }
        }
    }

    /// Write all the added content to the md file.
    pub fn write_md_file(&self, md_file_path: &Path) -> io::Result<()> {
        let mut content = String::from("# Test results\n");
        content.push_str(&self.md_table);
        if !self.errors.is_empty() {
            content.push_str("\n## Encountered errors\n");
            content.push_str(&self.errors);
        }
        content.push_str(SEPARATOR);
        content.push_str(FINISHING_NOTE);
        fs::write(md_file_path, content)
    }

    fn add_error(
        &mut self,
        hw_name: &str,
        task_name: &str,
        test_name: &str,
        test_result: &CmdResult,
        expired: bool,
    ) {
        if test_result.succeeded() {
            return;
        }
        if expired {
            self.errors.push_str(&format!(
                r#"

### `[{hw_name}][Past Deadline][Errors Hidden]`

"#
            ));
            return;
        }
        self.errors.push_str(&format!(
            r#"### `[{hw_name}][{task_name}][{test_name}]:`

*stderr*:
```apiblueprint
{stderr}
```
*stdout*:
```
{stdout}
```
--------
"#,
            stderr = test_result.stderr(),
            stdout = test_result.stdout(),
        ));
    }
}

impl Default for MdWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn row(hw_name: &str, task_name: &str, test_name: &str, result_sign: &str) -> String {
    format!("| {hw_name} | {task_name} | {test_name} | {result_sign} |\n")
}
