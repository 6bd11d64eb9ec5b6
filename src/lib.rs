//! Checks programming homeworks against a job file.
//!
//! A job file lists homeworks, their tasks and the tests every task must
//! pass. The [`checker`] walks that description over a folder of student
//! code, the [`tasks`] module builds and runs each submission in its own
//! language, and the [`report`] module turns the collected results into a
//! markdown file.

pub mod checker;
pub mod config;
pub mod logging;
pub mod report;
pub mod tasks;
pub mod tools;
