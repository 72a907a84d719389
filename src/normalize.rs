// src/normalize.rs

use crate::model::NormalizedDiff;

/// Line starts that mark unified-diff metadata rather than content.
/// Matched exactly and case-sensitively against the start of a line.
pub const METADATA_PREFIXES: [&str; 5] = ["diff --git", "index ", "---", "+++", "@@"];

/// Line boundaries: `\n`, `\r`, vertical tab, form feed, the file/group/record separators,
/// NEL and the Unicode line and paragraph separators. `\r\n` leaves an empty piece behind,
/// which is dropped like any other blank line.
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}', '\u{2029}',
];

fn is_metadata(line: &str) -> bool {
    METADATA_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

/// Reduces a unified diff to its ordered, trimmed, non-empty content lines.
///
/// Total over any input: lines that are not recognized as metadata simply pass through.
pub fn normalize(raw: &str) -> NormalizedDiff {
    let lines = raw
        .split(LINE_BREAKS)
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_metadata(line))
        .map(String::from)
        .collect();
    NormalizedDiff::from_lines(lines)
}

/// Same as [`normalize`], with a missing diff treated as empty
pub fn normalize_opt(raw: Option<&str>) -> NormalizedDiff {
    raw.map(normalize).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_absent_inputs() {
        assert!(normalize("").is_empty());
        assert!(normalize_opt(None).is_empty());
        assert!(normalize("\n\n   \n\t\n").is_empty());
    }

    #[test]
    fn strips_headers_and_hunk_markers() {
        let raw = "diff --git a/x.py b/x.py\n\
                   index 83db48f..bf269f4 100644\n\
                   --- a/x.py\n\
                   +++ b/x.py\n\
                   @@ -1,3 +1,3 @@\n\
                   -foo\n\
                   +bar\n \
                   context\n";
        assert_eq!(normalize(raw).lines(), ["-foo", "+bar", "context"]);
    }

    #[test]
    fn metadata_only_diff_is_empty() {
        let raw = "diff --git a/x b/x\nindex 1..2 100644\n--- a/x\n+++ b/x\n@@ -1 +1 @@\n";
        assert!(normalize(raw).is_empty());
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(normalize("  foo\n").lines(), ["foo"]);
        assert_eq!(normalize("foo\n"), normalize("  foo  \r\n"));
    }

    #[test]
    fn lone_carriage_returns_split_lines() {
        assert_eq!(normalize("-a\r+b\r").lines(), ["-a", "+b"]);
        assert_eq!(normalize("-a\r\n+b\r\n"), normalize("-a\n+b\n"));
        assert_eq!(normalize("x\u{0c}y\u{2028}z").lines(), ["x", "y", "z"]);
    }

    #[test]
    fn order_is_preserved() {
        let a = normalize("-a\n+b\n");
        let b = normalize("+b\n-a\n");
        assert_ne!(a, b);
        assert_eq!(a.lines(), ["-a", "+b"]);
    }

    #[test]
    fn prefixes_are_case_sensitive() {
        assert_eq!(normalize("Index: foo\nDIFF --GIT\n").lines(), ["Index: foo", "DIFF --GIT"]);
    }

    #[test]
    fn renormalizing_is_a_no_op() {
        let raw = "@@ -1 +1 @@\n   @@ inner\n-foo\n\n+bar   \n";
        let once = normalize(raw);
        assert_eq!(normalize(&once.to_text()), once);
    }
}
