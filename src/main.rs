// src/main.rs

use anyhow::Context;
use clap::Parser;
use git_diffcmp::cli::{Args, Command, CompareArgs, MineArgs};
use git_diffcmp::config::RunConfig;
use git_diffcmp::pipeline::{self, RunOutput};
use git_diffcmp::runner::GitCli;
use git_diffcmp::{history, report};
use std::collections::HashSet;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let start_time = Instant::now();
    let result = match args.command {
        Command::Mine(mine) => run_mine(&mine),
        Command::Compare(compare) => run_compare(&compare),
    };

    match result {
        Ok(()) => {
            println!("Total time: {:.2?}", start_time.elapsed());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_mine(args: &MineArgs) -> anyhow::Result<()> {
    let config = args.run_config()?;

    let mut workspaces = Vec::with_capacity(args.repo.len());
    let mut labels = HashSet::new();
    for location in &args.repo {
        let mut workspace = history::open_or_clone(location).with_context(|| format!("cannot start run for {location}"))?;
        let label = history::unique_label(&workspace.label, &labels);
        if label != workspace.label {
            tracing::warn!(%location, from = %workspace.label, to = %label, "repository label already in use, renamed");
            workspace.label = label;
        }
        labels.insert(workspace.label.clone());
        workspaces.push(workspace);
    }

    let mut output: Option<RunOutput> = None;
    for workspace in &workspaces {
        let walk_start = Instant::now();
        let pairs = history::revision_pairs(workspace, args.max_commits)?;
        println!(
            "{}: found {} file modifications in {:.2?}.",
            workspace.label,
            pairs.len(),
            walk_start.elapsed()
        );

        let git = GitCli::new(workspace.path())
            .ignore_whitespace(config.ignore_whitespace)
            .timeout(config.timeout);
        match git.probe() {
            Ok(version) => tracing::debug!(%version, "git available"),
            Err(e) => tracing::warn!(error = %e, "git probe failed, every diff will be empty"),
        }

        let compare_start = Instant::now();
        let run = pipeline::run(&git, pairs, &config)?;
        println!("{}: compared in {:.2?}.", workspace.label, compare_start.elapsed());

        output = Some(match output.take() {
            None => run,
            Some(mut acc) => {
                acc.records.extend(run.records);
                acc.summary = acc.summary.merge(run.summary);
                acc
            }
        });
    }

    let output = output.context("no repositories were given")?;
    finish(&output, &config, &args.options.output)
}

fn run_compare(args: &CompareArgs) -> anyhow::Result<()> {
    let config = args.options.run_config()?;
    let rows = report::read_dataset(&args.input, config.baseline, config.candidate)
        .with_context(|| format!("reading {}", args.input.display()))?;
    println!("Loaded {} rows from {}.", rows.len(), args.input.display());
    let output = pipeline::compare_dataset(rows, &config)?;
    finish(&output, &config, &args.options.output)
}

fn finish(output: &RunOutput, config: &RunConfig, dir: &Path) -> anyhow::Result<()> {
    let written = report::write_all(output, config, dir)?;
    print!("{}", report::console_table(&output.summary.overall));
    println!("Wrote {}", written.compared.display());
    println!("Wrote {}", written.summary_csv.display());
    println!("Wrote {}", written.summary_json.display());
    println!("Wrote {}", written.markdown.display());
    Ok(())
}
