// src/cli.rs

use crate::compare::CompareMode;
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::model::DiffAlgorithm;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compare git diff algorithms over repository history", long_about = None)]
pub struct Args {
    /// Log debug diagnostics, including every failed git invocation
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk repository history, diff every modified file with both algorithms and report
    Mine(MineArgs),
    /// Re-run normalization and comparison over a previously extracted dataset
    Compare(CompareArgs),
}

/// Options shared by both subcommands
#[derive(clap::Args, Debug, Clone)]
pub struct CompareOptions {
    /// Directory to write compared.csv, summary.csv, summary.json and report.md into
    #[arg(short, long)]
    pub output: PathBuf,

    /// Reference algorithm
    #[arg(long, value_enum, default_value_t = DiffAlgorithm::Myers)]
    pub baseline: DiffAlgorithm,

    /// Algorithm compared against the baseline
    #[arg(long, value_enum, default_value_t = DiffAlgorithm::Histogram)]
    pub candidate: DiffAlgorithm,

    /// How normalized diffs are judged equal
    #[arg(long, value_enum, default_value_t = CompareMode::Sequence)]
    pub mode: CompareMode,

    /// Number of sample mismatches to include in the Markdown report
    #[arg(long, default_value_t = 3)]
    pub samples: usize,

    /// Worker threads (0 uses one per core)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
}

#[derive(clap::Args, Debug)]
pub struct MineArgs {
    /// Local path or clone URL of a repository; repeat to mine several
    #[arg(short, long, required = true)]
    pub repo: Vec<String>,

    /// Stop after this many commits per repository (0 walks everything)
    #[arg(long, default_value_t = 0)]
    pub max_commits: usize,

    /// Deadline for a single git diff invocation, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Do not pass -w to git diff
    #[arg(long)]
    pub no_ignore_whitespace: bool,

    #[command(flatten)]
    pub options: CompareOptions,
}

#[derive(clap::Args, Debug)]
pub struct CompareArgs {
    /// CSV dataset with file_path and one diff column per algorithm
    #[arg(short, long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub options: CompareOptions,
}

impl CompareOptions {
    /// Fails when both sides name the same algorithm
    pub fn run_config(&self) -> Result<RunConfig> {
        if self.baseline == self.candidate {
            return Err(Error::Config(format!(
                "--baseline and --candidate must differ (both are {})",
                self.baseline
            )));
        }
        Ok(RunConfig {
            baseline: self.baseline,
            candidate: self.candidate,
            mode: self.mode,
            samples: self.samples,
            threads: self.threads,
            ..RunConfig::default()
        })
    }
}

impl MineArgs {
    pub fn run_config(&self) -> Result<RunConfig> {
        Ok(RunConfig {
            ignore_whitespace: !self.no_ignore_whitespace,
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            ..self.options.run_config()?
        })
    }
}
