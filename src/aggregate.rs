// src/aggregate.rs

use crate::model::{ComparisonRecord, DiffAlgorithm, FileCategory};
use serde::Serialize;
use std::collections::BTreeMap;

/// Totals for one group of comparisons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub total_count: usize,
    pub disagreement_count: usize,
}

impl CategoryStats {
    pub fn record(&mut self, agree: bool) {
        self.total_count += 1;
        if !agree {
            self.disagreement_count += 1;
        }
    }

    pub fn merge(self, other: CategoryStats) -> CategoryStats {
        CategoryStats {
            total_count: self.total_count + other.total_count,
            disagreement_count: self.disagreement_count + other.disagreement_count,
        }
    }

    /// Disagreements over total, or 0 for an empty group
    pub fn disagreement_rate(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.disagreement_count as f64 / self.total_count as f64
        }
    }
}

/// What one algorithm variant produced over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlgorithmTally {
    pub diffs: usize,
    pub empty: usize,
    pub normalized_lines: usize,
}

impl AlgorithmTally {
    fn record(&mut self, empty: bool, lines: usize) {
        self.diffs += 1;
        if empty {
            self.empty += 1;
        }
        self.normalized_lines += lines;
    }

    fn merge(self, other: AlgorithmTally) -> AlgorithmTally {
        AlgorithmTally {
            diffs: self.diffs + other.diffs,
            empty: self.empty + other.empty,
            normalized_lines: self.normalized_lines + other.normalized_lines,
        }
    }
}

/// Accumulates comparison verdicts. `Aggregator::default()` is the identity for [`Aggregator::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aggregator {
    categories: BTreeMap<FileCategory, CategoryStats>,
    algorithms: BTreeMap<DiffAlgorithm, AlgorithmTally>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_verdict(&mut self, category: FileCategory, agree: bool) {
        self.categories.entry(category).or_default().record(agree);
    }

    pub fn record(&mut self, record: &ComparisonRecord, baseline: DiffAlgorithm, candidate: DiffAlgorithm) {
        self.record_verdict(record.result.category, record.result.agree);
        let (baseline_lines, candidate_lines) = record.normalized_lines;
        self.algorithms
            .entry(baseline)
            .or_default()
            .record(record.baseline.is_empty(), baseline_lines);
        self.algorithms
            .entry(candidate)
            .or_default()
            .record(record.candidate.is_empty(), candidate_lines);
    }

    pub fn merge(mut self, other: Aggregator) -> Aggregator {
        for (category, stats) in other.categories {
            let entry = self.categories.entry(category).or_default();
            *entry = entry.merge(stats);
        }
        for (algorithm, tally) in other.algorithms {
            let entry = self.algorithms.entry(algorithm).or_default();
            *entry = entry.merge(tally);
        }
        self
    }

    pub fn category(&self, category: FileCategory) -> CategoryStats {
        self.categories.get(&category).copied().unwrap_or_default()
    }

    pub fn overall(&self) -> CategoryStats {
        self.categories
            .values()
            .fold(CategoryStats::default(), |acc, stats| acc.merge(*stats))
    }

    pub fn algorithm(&self, algorithm: DiffAlgorithm) -> AlgorithmTally {
        self.algorithms.get(&algorithm).copied().unwrap_or_default()
    }

    pub fn algorithms(&self) -> impl Iterator<Item = (DiffAlgorithm, AlgorithmTally)> + '_ {
        self.algorithms.iter().map(|(algorithm, tally)| (*algorithm, *tally))
    }

    /// One row per category, zero rows included, followed by the overall row
    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        FileCategory::ALL
            .iter()
            .map(|&category| SummaryRow::new(category.label(), self.category(category)))
            .chain(std::iter::once(SummaryRow::new(OVERALL, self.overall())))
            .collect()
    }
}

pub const OVERALL: &str = "OVERALL";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub label: String,
    pub total: usize,
    pub disagreements: usize,
    pub rate: f64,
}

impl SummaryRow {
    fn new(label: &str, stats: CategoryStats) -> Self {
        SummaryRow {
            label: label.to_string(),
            total: stats.total_count,
            disagreements: stats.disagreement_count,
            rate: stats.disagreement_rate(),
        }
    }
}

/// Aggregates for a whole run, overall and per repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub overall: Aggregator,
    pub repositories: BTreeMap<String, Aggregator>,
}

impl RunSummary {
    pub fn record(&mut self, record: &ComparisonRecord, baseline: DiffAlgorithm, candidate: DiffAlgorithm) {
        self.overall.record(record, baseline, candidate);
        self.repositories
            .entry(record.result.pair.repository.clone())
            .or_default()
            .record(record, baseline, candidate);
    }

    pub fn merge(mut self, other: RunSummary) -> RunSummary {
        self.overall = self.overall.merge(other.overall);
        for (label, aggregator) in other.repositories {
            let entry = self.repositories.remove(&label).unwrap_or_default();
            self.repositories.insert(label, entry.merge(aggregator));
        }
        self
    }
}
