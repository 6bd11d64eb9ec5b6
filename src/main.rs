//! Checks student homeworks against a yaml job file and writes the results
//! into a markdown report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use homework_checker::checker::Checker;
use homework_checker::config::JobConfig;
use homework_checker::report::MdWriter;
use tracing::debug;

/// Check homeworks described by a job file.
#[derive(Parser)]
#[command(
    name = "check_homework",
    version = env!("CARGO_PKG_VERSION"),
    about = "Check student homeworks against a yaml job description",
    long_about = "Builds and runs every task of every homework listed in the job file, \
                  compares what the code prints to what the job expects, and writes a \
                  markdown report with one row per test. Homeworks past their deadline \
                  are still checked but their failing output stays hidden."
)]
struct Args {
    /// Input job file in yaml format
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present = "dump_schema",
        help = "Input job file in yaml format"
    )]
    input: Option<PathBuf>,

    /// Output markdown file
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present = "dump_schema",
        help = "Output markdown file"
    )]
    output: Option<PathBuf>,

    /// Enable verbose (debug-level) logging
    #[arg(short, long, help = "Make the output verbose")]
    verbose: bool,

    /// Log to rolling file instead of stderr
    #[arg(long, help = "Write logs to a rolling daily file instead of stderr")]
    log_to_file: bool,

    /// Print the json schema of job files and exit
    #[arg(long, help = "Print the json schema of job files and exit")]
    dump_schema: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    homework_checker::logging::init_subscriber(args.log_to_file, args.verbose);

    if args.dump_schema {
        println!("{}", JobConfig::reference_schema()?);
        return Ok(());
    }
    // clap guarantees both are present unless --dump-schema was given.
    let input = args.input.context("an input job file is required")?;
    let output = args.output.context("an output file is required")?;

    debug!("Reading from file '{}'.", input.display());
    let checker = Checker::new(&input)?;
    let results = checker.check_homework().await;

    let mut md_writer = MdWriter::new();
    md_writer.update(&results);
    debug!("Writing to file '{}'.", output.display());
    md_writer
        .write_md_file(&output)
        .with_context(|| format!("Failed to write report to '{}'", output.display()))?;
    Ok(())
}
