// src/compare.rs

use crate::model::{FileCategory, NormalizedDiff};
use serde::Serialize;
use std::collections::BTreeSet;

/// How two normalized diffs are judged equal
#[derive(clap::ValueEnum, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Element-for-element equality, order and length included
    #[default]
    Sequence,
    /// Same set of lines, ignoring order and repetition
    Set,
}

/// Strict equality of two normalized diffs
pub fn compare(a: &NormalizedDiff, b: &NormalizedDiff) -> bool {
    a.lines() == b.lines()
}

pub fn compare_as_sets(a: &NormalizedDiff, b: &NormalizedDiff) -> bool {
    let left: BTreeSet<&str> = a.lines().iter().map(String::as_str).collect();
    let right: BTreeSet<&str> = b.lines().iter().map(String::as_str).collect();
    left == right
}

pub fn compare_with(mode: CompareMode, a: &NormalizedDiff, b: &NormalizedDiff) -> bool {
    match mode {
        CompareMode::Sequence => compare(a, b),
        CompareMode::Set => compare_as_sets(a, b),
    }
}

/// Extensions counted as source code
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "c", "h", "cc", "cpp", "cxx", "hh", "hpp", "hxx", "py", "pyx", "go", "rs", "java", "kt",
    "scala", "js", "jsx", "mjs", "ts", "tsx", "rb", "php", "cs", "swift", "m", "mm", "lua",
    "pl", "r", "sh", "bash", "s", "asm",
];

/// Lowercased pieces of a path that the classification rules look at
struct PathParts {
    path: String,
    name: String,
    extension: Option<String>,
}

impl PathParts {
    fn new(file_path: &str) -> Self {
        let path = file_path.to_lowercase();
        let name = path.rsplit(['/', '\\']).next().unwrap_or_default().to_string();
        let extension = name
            .rsplit_once('.')
            .filter(|(stem, _)| !stem.is_empty())
            .map(|(_, ext)| ext.to_string());
        PathParts { path, name, extension }
    }
}

fn is_license(parts: &PathParts) -> bool {
    parts.name.contains("license")
}

fn is_readme(parts: &PathParts) -> bool {
    parts.name.starts_with("readme") || parts.name.ends_with(".md")
}

fn is_test(parts: &PathParts) -> bool {
    parts.path.contains("test")
}

fn is_source(parts: &PathParts) -> bool {
    parts
        .extension
        .as_deref()
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Classification rules in precedence order; the first match wins
const RULES: [(FileCategory, fn(&PathParts) -> bool); 4] = [
    (FileCategory::License, is_license),
    (FileCategory::Readme, is_readme),
    (FileCategory::Test, is_test),
    (FileCategory::Source, is_source),
];

pub fn classify(file_path: &str) -> FileCategory {
    if file_path.trim().is_empty() {
        return FileCategory::Other;
    }
    let parts = PathParts::new(file_path);
    RULES
        .iter()
        .find(|(_, applies)| applies(&parts))
        .map_or(FileCategory::Other, |&(category, _)| category)
}
