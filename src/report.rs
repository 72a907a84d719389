// src/report.rs

use crate::aggregate::{Aggregator, RunSummary, SummaryRow};
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::model::{ComparisonRecord, DiffAlgorithm, RawDiff, RevisionPair};
use crate::pipeline::RunOutput;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const COMPARED_CSV: &str = "compared.csv";
pub const SUMMARY_CSV: &str = "summary.csv";
pub const SUMMARY_JSON: &str = "summary.json";
pub const REPORT_MD: &str = "report.md";

/// Lines of each raw diff shown for a sample mismatch
const PREVIEW_LINES: usize = 15;

/// Paths of the files written for a run
#[derive(Debug, Clone)]
pub struct WrittenReports {
    pub compared: PathBuf,
    pub summary_csv: PathBuf,
    pub summary_json: PathBuf,
    pub markdown: PathBuf,
}

pub fn write_all(output: &RunOutput, config: &RunConfig, dir: &Path) -> Result<WrittenReports> {
    fs::create_dir_all(dir).map_err(|e| Error::io(format!("creating {}", dir.display()), e))?;
    let written = WrittenReports {
        compared: dir.join(COMPARED_CSV),
        summary_csv: dir.join(SUMMARY_CSV),
        summary_json: dir.join(SUMMARY_JSON),
        markdown: dir.join(REPORT_MD),
    };

    write_compared(&written.compared, &output.records, config)?;
    write_summary_csv(&written.summary_csv, &output.summary.overall)?;

    let json = serde_json::to_string_pretty(&JsonSummary {
        generated_at: Utc::now().to_rfc3339(),
        config,
        rows: output.summary.overall.summary_rows(),
        summary: &output.summary,
    })?;
    fs::write(&written.summary_json, json).map_err(|e| Error::io(format!("writing {}", written.summary_json.display()), e))?;

    let markdown = render_markdown(output, config);
    fs::write(&written.markdown, markdown).map_err(|e| Error::io(format!("writing {}", written.markdown.display()), e))?;

    tracing::info!(dir = %dir.display(), "reports written");
    Ok(written)
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    generated_at: String,
    config: &'a RunConfig,
    rows: Vec<SummaryRow>,
    summary: &'a RunSummary,
}

fn compared_header(config: &RunConfig) -> [&'static str; 12] {
    [
        "repository",
        "parent_sha",
        "commit_sha",
        "commit_time",
        "file_path",
        "old_path",
        "new_path",
        "commit_message",
        config.baseline.column_name(),
        config.candidate.column_name(),
        "Discrepancy",
        "file_type",
    ]
}

pub fn write_compared(path: &Path, records: &[ComparisonRecord], config: &RunConfig) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::csv(path, e))?;
    writer.write_record(compared_header(config)).map_err(|e| Error::csv(path, e))?;
    for record in records {
        let pair = &record.result.pair;
        let category = record.result.category.label();
        let time = format_time(pair.commit_time);
        writer
            .write_record([
                pair.repository.as_str(),
                pair.old_revision.as_str(),
                pair.new_revision.as_str(),
                time.as_str(),
                pair.file_path.as_str(),
                pair.old_path.as_deref().unwrap_or_default(),
                pair.new_path.as_deref().unwrap_or_default(),
                pair.message.as_str(),
                record.baseline.as_str(),
                record.candidate.as_str(),
                record.discrepancy(),
                category,
            ])
            .map_err(|e| Error::csv(path, e))?;
    }
    writer.flush().map_err(|e| Error::io(format!("flushing {}", path.display()), e))?;
    Ok(())
}

pub fn write_summary_csv(path: &Path, aggregator: &Aggregator) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::csv(path, e))?;
    writer
        .write_record(["category", "total_files", "mismatches", "mismatch_rate"])
        .map_err(|e| Error::csv(path, e))?;
    for row in aggregator.summary_rows() {
        writer
            .write_record([
                row.label.clone(),
                row.total.to_string(),
                row.disagreements.to_string(),
                format!("{:.6}", row.rate),
            ])
            .map_err(|e| Error::csv(path, e))?;
    }
    writer.flush().map_err(|e| Error::io(format!("flushing {}", path.display()), e))?;
    Ok(())
}

fn format_time(seconds: i64) -> String {
    if seconds == 0 {
        return String::new();
    }
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default()
}

fn parse_time(text: &str) -> i64 {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.timestamp())
        .unwrap_or(0)
}

/// Reads a dataset in the `compared.csv` layout (or the bare extractor layout) back into pairs and raw diffs.
pub fn read_dataset(
    path: &Path,
    baseline: DiffAlgorithm,
    candidate: DiffAlgorithm,
) -> Result<Vec<(RevisionPair, RawDiff, RawDiff)>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| Error::csv(path, e))?;
    let headers = reader.headers().map_err(|e| Error::csv(path, e))?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let required = |name: &str| {
        column(name).ok_or_else(|| Error::Dataset {
            path: path.to_path_buf(),
            message: format!("missing column `{name}`"),
        })
    };
    let baseline_col = required(baseline.column_name())?;
    let candidate_col = required(candidate.column_name())?;
    let file_col = required("file_path")?;
    let repository_col = column("repository");
    let parent_col = column("parent_sha");
    let commit_col = column("commit_sha");
    let time_col = column("commit_time");
    let old_col = column("old_path");
    let new_col = column("new_path");
    let message_col = column("commit_message");

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::csv(path, e))?;
        let field = |index: Option<usize>| index.and_then(|i| record.get(i)).unwrap_or_default().to_string();
        let optional = |index: Option<usize>| Some(field(index)).filter(|s| !s.is_empty());

        let pair = RevisionPair {
            repository: field(repository_col),
            old_revision: field(parent_col),
            new_revision: field(commit_col),
            file_path: field(Some(file_col)),
            old_path: optional(old_col),
            new_path: optional(new_col),
            commit_time: parse_time(&field(time_col)),
            message: field(message_col),
        };
        rows.push((pair, RawDiff(field(Some(baseline_col))), RawDiff(field(Some(candidate_col)))));
    }
    Ok(rows)
}

fn percent(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

fn category_table(md: &mut String, rows: &[SummaryRow]) {
    md.push_str("| File Type | Total Files | Discrepancies | Discrepancy Rate |\n");
    md.push_str("|-----------|-------------|---------------|------------------|\n");
    for row in rows {
        let _ = writeln!(md, "| {} | {} | {} | {} |", row.label, row.total, row.disagreements, percent(row.rate));
    }
}

fn preview(raw: &RawDiff) -> String {
    let lines: Vec<&str> = raw.as_str().split('\n').collect();
    let mut text = lines.iter().take(PREVIEW_LINES).copied().collect::<Vec<_>>().join("\n");
    if lines.len() > PREVIEW_LINES {
        text.push_str("\n... (truncated)");
    }
    text
}

pub fn render_markdown(output: &RunOutput, config: &RunConfig) -> String {
    let overall = output.summary.overall.overall();
    let mut md = String::new();

    let _ = writeln!(md, "# Diff Algorithm Discrepancy Report\n");
    let _ = writeln!(md, "Generated {}\n", Utc::now().to_rfc2822());
    let _ = writeln!(md, "## Methodology\n");
    let _ = writeln!(
        md,
        "Each modified file was diffed with `--diff-algorithm={}` and `--diff-algorithm={}`{}.",
        config.baseline,
        config.candidate,
        if config.ignore_whitespace { " using `-w`" } else { "" }
    );
    md.push_str("Diff metadata lines (`diff --git`, `index`, `---`, `+++`, `@@`) were removed, ");
    md.push_str("remaining lines were trimmed and blank lines dropped. ");
    let _ = writeln!(
        md,
        "Two diffs match when their normalized lines are equal {}.\n",
        match config.mode {
            crate::compare::CompareMode::Sequence => "as ordered sequences",
            crate::compare::CompareMode::Set => "as sets",
        }
    );

    let _ = writeln!(md, "## Summary\n");
    let _ = writeln!(md, "- **Total modified-file rows processed**: {}", overall.total_count);
    let _ = writeln!(md, "- **Total discrepancies ({} vs {})**: {}", config.baseline, config.candidate, overall.disagreement_count);
    let _ = writeln!(md, "- **Overall discrepancy rate**: {}\n", percent(overall.disagreement_rate()));

    let _ = writeln!(md, "### Discrepancies by file type\n");
    category_table(&mut md, &output.summary.overall.summary_rows());

    if output.summary.repositories.len() > 1 {
        let _ = writeln!(md, "\n### Discrepancies by repository\n");
        md.push_str("| Repository | Total Files | Discrepancies | Discrepancy Rate |\n");
        md.push_str("|------------|-------------|---------------|------------------|\n");
        for (label, aggregator) in &output.summary.repositories {
            let stats = aggregator.overall();
            let _ = writeln!(
                md,
                "| {} | {} | {} | {} |",
                label,
                stats.total_count,
                stats.disagreement_count,
                percent(stats.disagreement_rate())
            );
        }
    }

    let _ = writeln!(md, "\n### Output by algorithm\n");
    md.push_str("| Algorithm | Diffs | Empty | Normalized Lines |\n");
    md.push_str("|-----------|-------|-------|------------------|\n");
    for (algorithm, tally) in output.summary.overall.algorithms() {
        let _ = writeln!(md, "| {} | {} | {} | {} |", algorithm, tally.diffs, tally.empty, tally.normalized_lines);
    }

    let _ = writeln!(md, "\n## Sample mismatches\n");
    let mismatches: Vec<_> = output.records.iter().filter(|r| !r.result.agree).take(config.samples).collect();
    if mismatches.is_empty() {
        md.push_str("_No mismatches found in this dataset._\n");
    }
    for (i, record) in mismatches.iter().enumerate() {
        let pair = &record.result.pair;
        let short: String = pair.new_revision.chars().take(8).collect();
        let _ = writeln!(md, "### {}) Commit {} `{}` (type: {})\n", i + 1, short, pair.file_path, record.result.category);
        for (algorithm, raw) in [(config.baseline, &record.baseline), (config.candidate, &record.candidate)] {
            if raw.as_str().trim().is_empty() {
                continue;
            }
            let _ = writeln!(md, "{} (preview):\n```diff\n{}\n```\n", algorithm, preview(raw));
        }
    }

    md
}

/// Aligned plain-text table for the terminal
pub fn console_table(aggregator: &Aggregator) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<10} {:>10} {:>10} {:>9}", "category", "total", "mismatch", "rate");
    for row in aggregator.summary_rows() {
        let _ = writeln!(out, "{:<10} {:>10} {:>10} {:>9}", row.label, row.total, row.disagreements, percent(row.rate));
    }
    out
}
