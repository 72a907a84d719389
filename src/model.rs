// src/model.rs

use serde::Serialize;
use std::fmt;

/// A diff computation strategy understood by `git diff --diff-algorithm`
#[derive(clap::ValueEnum, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    /// The default greedy algorithm
    Myers,
    /// Myers with extra effort to produce the smallest diff
    Minimal,
    /// Anchors on unique common lines
    Patience,
    /// Patience extended with low-occurrence common lines
    Histogram,
}

impl DiffAlgorithm {
    /// The name git expects after `--diff-algorithm=`
    pub fn git_name(self) -> &'static str {
        match self {
            DiffAlgorithm::Myers => "myers",
            DiffAlgorithm::Minimal => "minimal",
            DiffAlgorithm::Patience => "patience",
            DiffAlgorithm::Histogram => "histogram",
        }
    }

    /// Column holding this algorithm's raw output in tabular datasets
    pub fn column_name(self) -> &'static str {
        match self {
            DiffAlgorithm::Myers => "diff_myers",
            DiffAlgorithm::Minimal => "diff_minimal",
            DiffAlgorithm::Patience => "diff_patience",
            DiffAlgorithm::Histogram => "diff_hist",
        }
    }
}

impl fmt::Display for DiffAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.git_name())
    }
}

/// One file modification event between two revisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionPair {
    /// Label of the repository the pair was mined from
    pub repository: String,
    pub old_revision: String,
    pub new_revision: String,
    pub file_path: String,
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    /// Commit time in seconds since the epoch
    pub commit_time: i64,
    /// First line of the commit message
    pub message: String,
}

impl RevisionPair {
    pub fn new(old_revision: impl Into<String>, new_revision: impl Into<String>, file_path: impl Into<String>) -> Self {
        let file_path = file_path.into();
        RevisionPair {
            repository: String::new(),
            old_revision: old_revision.into(),
            new_revision: new_revision.into(),
            old_path: Some(file_path.clone()),
            new_path: Some(file_path.clone()),
            file_path,
            commit_time: 0,
            message: String::new(),
        }
    }
}

/// Raw output of one algorithm variant; empty when nothing was produced or the invocation failed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawDiff(pub String);

impl RawDiff {
    pub fn empty() -> Self {
        RawDiff(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for RawDiff {
    fn from(text: String) -> Self {
        RawDiff(text)
    }
}

impl From<&str> for RawDiff {
    fn from(text: &str) -> Self {
        RawDiff(text.to_string())
    }
}

/// Canonical content lines of a diff, in their original order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedDiff {
    lines: Vec<String>,
}

impl NormalizedDiff {
    pub(crate) fn from_lines(lines: Vec<String>) -> Self {
        NormalizedDiff { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// One line per entry, as fed back into the normalizer
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Role of a modified file
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileCategory {
    Source,
    Test,
    Readme,
    License,
    Other,
}

impl FileCategory {
    pub const ALL: [FileCategory; 5] = [
        FileCategory::Source,
        FileCategory::Test,
        FileCategory::Readme,
        FileCategory::License,
        FileCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FileCategory::Source => "SOURCE",
            FileCategory::Test => "TEST",
            FileCategory::Readme => "README",
            FileCategory::License => "LICENSE",
            FileCategory::Other => "OTHER",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verdict for a single RevisionPair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonResult {
    pub pair: RevisionPair,
    pub category: FileCategory,
    pub agree: bool,
}

/// A result together with the raw diffs that produced it, kept for audit output
#[derive(Debug, Clone)]
pub struct ComparisonRecord {
    pub result: ComparisonResult,
    pub baseline: RawDiff,
    pub candidate: RawDiff,
    /// Normalized line counts of the baseline and candidate diffs
    pub normalized_lines: (usize, usize),
}

impl ComparisonRecord {
    /// `Yes` when the two variants disagree
    pub fn discrepancy(&self) -> &'static str {
        if self.result.agree {
            "No"
        } else {
            "Yes"
        }
    }
}
