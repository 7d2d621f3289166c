//! Newline-delimited board content.
//!
//! The board is a single text blob. Each non-blank line is an entry;
//! blank lines are kept in the text but never counted or displayed.
//!
//! New entries are detected by comparing *line counts* between two
//! snapshots, not their contents. A truncate followed by appends that
//! lands on the same line count goes unnoticed, and content arriving
//! together with a shrink is not reported.

/// Splits content into raw lines.
///
/// Blank content (empty or whitespace only) has no lines at all, so
/// appending to it is always detected as growth.
pub fn lines(content: &str) -> Vec<&str> {
    if is_blank(content) {
        return Vec::new();
    }
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Returns true for a line that carries no entry.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Iterates over the entries (non-blank lines) of the content.
pub fn entries(content: &str) -> impl Iterator<Item = &str> {
    lines(content).into_iter().filter(|line| !is_blank(line))
}

/// Counts entries in the content.
pub fn count_entries(content: &str) -> usize {
    entries(content).count()
}

/// Returns the lines of `current` past the line count of `previous`.
///
/// Returns nothing when `current` has the same number of lines or fewer,
/// which is how an external reset is absorbed. The result may contain
/// blank lines; display code skips them.
pub fn split_new_entries<'a>(previous: &str, current: &'a str) -> Vec<&'a str> {
    let seen = lines(previous).len();
    let current_lines = lines(current);
    if current_lines.len() <= seen {
        return Vec::new();
    }
    current_lines[seen..].to_vec()
}

/// Appends a line to the content.
pub fn append(content: &str, line: &str) -> String {
    if is_blank(content) {
        line.to_string()
    } else {
        format!("{}\n{}", content, line)
    }
}
