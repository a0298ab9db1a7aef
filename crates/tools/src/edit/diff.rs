use std::fmt::{self, Write};

use similar::TextDiff;

/// Lines of unchanged context around each hunk.
const CONTEXT_LINES: usize = 3;

/// Render a unified diff between two versions of `path`.
///
/// Identical inputs produce an empty string (no header, no hunks).
pub fn unified_diff(path: &str, old: &str, new: &str) -> Result<String, fmt::Error> {
    let diff = TextDiff::from_lines(old, new);
    let mut out = String::new();
    write!(
        out,
        "{}",
        diff.unified_diff()
            .context_radius(CONTEXT_LINES)
            .header(path, path)
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_has_empty_diff() {
        assert_eq!(unified_diff("a.txt", "same\n", "same\n").unwrap(), "");
    }

    #[test]
    fn changed_line_shows_both_sides() {
        let diff = unified_diff("a.txt", "one\ntwo\nthree\n", "one\n2\nthree\n").unwrap();
        assert!(diff.starts_with("--- a.txt\n+++ a.txt\n"));
        assert!(diff.contains("-two\n"));
        assert!(diff.contains("+2\n"));
        assert!(diff.contains(" one\n"));
    }

    #[test]
    fn new_file_diff_is_all_additions() {
        let diff = unified_diff("notes.txt", "", "hello\n").unwrap();
        assert!(diff.contains("+hello"));
        assert!(!diff.lines().any(|l| l.starts_with('-') && !l.starts_with("---")));
    }
}
