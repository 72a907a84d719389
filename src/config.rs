// src/config.rs

use crate::compare::CompareMode;
use crate::model::DiffAlgorithm;
use crate::runner::DEFAULT_TIMEOUT;
use serde::Serialize;
use std::time::Duration;

/// Settings shared by every stage of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub baseline: DiffAlgorithm,
    pub candidate: DiffAlgorithm,
    /// Passed to git as `-w` for both variants
    pub ignore_whitespace: bool,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    pub mode: CompareMode,
    /// Sample mismatches shown in the Markdown report
    pub samples: usize,
    /// Worker threads, 0 for the rayon default
    pub threads: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            baseline: DiffAlgorithm::Myers,
            candidate: DiffAlgorithm::Histogram,
            ignore_whitespace: true,
            timeout: DEFAULT_TIMEOUT,
            mode: CompareMode::Sequence,
            samples: 3,
            threads: 0,
        }
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }
}
