// src/pipeline.rs

use crate::aggregate::RunSummary;
use crate::compare::{classify, compare_with};
use crate::config::RunConfig;
use crate::error::Result;
use crate::model::{ComparisonRecord, ComparisonResult, RawDiff, RevisionPair};
use crate::normalize::normalize;
use crate::runner::DiffComputer;
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;

/// Everything a run produces: per-pair records in input order, plus their aggregate
#[derive(Debug)]
pub struct RunOutput {
    pub records: Vec<ComparisonRecord>,
    pub summary: RunSummary,
}

/// Normalizes, compares and classifies one pair whose raw diffs are already known
pub fn evaluate(pair: RevisionPair, baseline: RawDiff, candidate: RawDiff, config: &RunConfig) -> ComparisonRecord {
    let left = normalize(baseline.as_str());
    let right = normalize(candidate.as_str());
    let agree = compare_with(config.mode, &left, &right);
    let category = classify(&pair.file_path);
    ComparisonRecord {
        result: ComparisonResult { pair, category, agree },
        baseline,
        candidate,
        normalized_lines: (left.len(), right.len()),
    }
}

/// Runs both algorithm variants for a pair and evaluates the outcome
pub fn process_pair<C: DiffComputer + ?Sized>(computer: &C, pair: RevisionPair, config: &RunConfig) -> ComparisonRecord {
    let baseline = computer.compute(&pair, config.baseline);
    let candidate = computer.compute(&pair, config.candidate);
    evaluate(pair, baseline, candidate, config)
}

/// Processes every pair in parallel, one pair per task.
pub fn run<C: DiffComputer + ?Sized>(computer: &C, pairs: Vec<RevisionPair>, config: &RunConfig) -> Result<RunOutput> {
    let bar = ProgressBar::new(pairs.len() as u64);
    bar.set_message("Comparing diffs");

    let records = in_pool(config.threads, || {
        pairs
            .into_par_iter()
            .progress_with(bar)
            .map(|pair| process_pair(computer, pair, config))
            .collect::<Vec<_>>()
    })?;

    let summary = summarize(&records, config);
    Ok(RunOutput { records, summary })
}

/// Re-evaluates a previously extracted dataset without invoking git
pub fn compare_dataset(rows: Vec<(RevisionPair, RawDiff, RawDiff)>, config: &RunConfig) -> Result<RunOutput> {
    let records = in_pool(config.threads, || {
        rows.into_par_iter()
            .map(|(pair, baseline, candidate)| evaluate(pair, baseline, candidate, config))
            .collect::<Vec<_>>()
    })?;
    let summary = summarize(&records, config);
    Ok(RunOutput { records, summary })
}

/// Folds records into per-worker partial summaries and merges them
pub fn summarize(records: &[ComparisonRecord], config: &RunConfig) -> RunSummary {
    records
        .par_iter()
        .fold(RunSummary::default, |mut summary, record| {
            summary.record(record, config.baseline, config.candidate);
            summary
        })
        .reduce(RunSummary::default, RunSummary::merge)
}

fn in_pool<T: Send>(threads: usize, op: impl FnOnce() -> T + Send) -> Result<T> {
    if threads == 0 {
        return Ok(op());
    }
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    Ok(pool.install(op))
}
