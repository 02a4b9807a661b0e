use crate::warning;
use std::fmt;

/// user-facing message for structural parse failures
pub const MALFORMED_DIFF_MESSAGE: &str =
    "Failed to parse the git diff. Please ensure it is in a valid format.";

/// classification of a single line within a hunk body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Added,
    Removed,
}

/// a single line from a hunk body, with the leading marker stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    pub kind: LineKind,
    pub text: String,
}

/// one `@@ -old_start,old_count +new_start,new_count @@` region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    pub lines: Vec<LineChange>,
}

/// one file touched by the diff
///
/// paths are the literal strings from the `---`/`+++` markers (or the
/// `diff --git` header when no markers follow, e.g. binary files)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileDiff {
    pub old_path: String,
    pub new_path: String,
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    /// path for display: the new path unless the file was deleted, with
    /// the a/ b/ prefixes stripped
    pub fn display_path(&self) -> &str {
        let preferred = if self.new_path.is_empty() || self.new_path == "/dev/null" {
            &self.old_path
        } else {
            &self.new_path
        };
        preferred
            .strip_prefix("a/")
            .or_else(|| preferred.strip_prefix("b/"))
            .unwrap_or(preferred)
    }

    pub fn additions(&self) -> usize {
        self.count_lines(LineKind::Added)
    }

    pub fn deletions(&self) -> usize {
        self.count_lines(LineKind::Removed)
    }

    fn count_lines(&self, kind: LineKind) -> usize {
        self.hunks
            .iter()
            .flat_map(|hunk| &hunk.lines)
            .filter(|line| line.kind == kind)
            .count()
    }
}

/// structured representation of a unified diff, in order of appearance
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructuredDiff {
    pub files: Vec<FileDiff>,
}

impl StructuredDiff {
    pub fn additions(&self) -> usize {
        self.files.iter().map(FileDiff::additions).sum()
    }

    pub fn deletions(&self) -> usize {
        self.files.iter().map(FileDiff::deletions).sum()
    }
}

/// why a diff could not be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// no coherent file/hunk structure could be established
    Malformed,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Malformed => f.write_str(MALFORMED_DIFF_MESSAGE),
        }
    }
}

impl std::error::Error for ParseError {}

/// check whether the text looks like it contains unified diff syntax
///
/// a single line matching any of the recognition patterns is enough; this
/// deliberately answers "does this contain diff syntax", not "will this
/// parse" - a validating input can still fail structural parsing
pub fn is_valid_diff(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    text.lines().map(strip_cr).any(|line| {
        is_git_header(line)
            || is_index_line(line)
            || is_file_marker(line, "+++ ")
            || is_file_marker(line, "--- ")
            || parse_hunk_header(line).is_some()
    })
}

/// parse a unified diff into files, hunks, and line changes
///
/// file segments are delimited by `diff --git` headers, or by `---`/`+++`
/// pairs when no git header is present; hunk bodies are consumed according
/// to the line counts declared in their headers
pub fn parse_diff(text: &str) -> Result<StructuredDiff, ParseError> {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut current: Option<FileDiff> = None;
    let mut hunk: Option<Hunk> = None;
    // lines still owed to the open hunk, per its header counts
    let mut old_left: u32 = 0;
    let mut new_left: u32 = 0;
    // whether the current file's old path came from a `---` marker
    // (as opposed to the `diff --git` header fallback)
    let mut marker_seen = false;

    for raw in text.lines() {
        let line = strip_cr(raw);

        // consume the hunk body while the header arithmetic says lines remain
        if hunk.is_some() && (old_left > 0 || new_left > 0) {
            if line.starts_with('\\') {
                // "\ No newline at end of file" - annotation, not a change
                continue;
            }
            if let Some(body) = line.strip_prefix('+') {
                push_line(&mut hunk, LineKind::Added, body);
                new_left = new_left.saturating_sub(1);
                continue;
            }
            if let Some(body) = line.strip_prefix('-') {
                push_line(&mut hunk, LineKind::Removed, body);
                old_left = old_left.saturating_sub(1);
                continue;
            }
            if let Some(body) = line.strip_prefix(' ') {
                push_line(&mut hunk, LineKind::Context, body);
                old_left = old_left.saturating_sub(1);
                new_left = new_left.saturating_sub(1);
                continue;
            }
            if line.is_empty() {
                // some tools strip the marker from blank context lines
                push_line(&mut hunk, LineKind::Context, "");
                old_left = old_left.saturating_sub(1);
                new_left = new_left.saturating_sub(1);
                continue;
            }
            // anything else ends the hunk early, fall through to the
            // structural scan
            old_left = 0;
            new_left = 0;
        }

        if let Some((old_path, new_path)) = git_header_paths(line) {
            flush_hunk(&mut current, &mut hunk);
            flush_file(&mut files, &mut current);
            current = Some(FileDiff {
                old_path,
                new_path,
                hunks: Vec::new(),
            });
            marker_seen = false;
            continue;
        }

        if let Some(rest) = line.strip_prefix("--- ") {
            flush_hunk(&mut current, &mut hunk);
            // without a git header, a `---` marker opens a new file segment
            let reuse = current
                .as_ref()
                .is_some_and(|file| file.hunks.is_empty() && !marker_seen);
            if !reuse {
                flush_file(&mut files, &mut current);
                current = Some(FileDiff::default());
            }
            if let Some(file) = current.as_mut() {
                file.old_path = rest.to_string();
            }
            marker_seen = true;
            continue;
        }

        if let Some(rest) = line.strip_prefix("+++ ") {
            flush_hunk(&mut current, &mut hunk);
            if current.is_none() {
                current = Some(FileDiff::default());
            }
            if let Some(file) = current.as_mut() {
                file.new_path = rest.to_string();
            }
            continue;
        }

        if let Some((old_start, old_count, new_start, new_count)) = parse_hunk_header(line) {
            flush_hunk(&mut current, &mut hunk);
            if current.is_none() {
                // headerless fragments still parse, matching the leniency
                // of common patch parsers
                current = Some(FileDiff::default());
            }
            old_left = old_count;
            new_left = new_count;
            hunk = Some(Hunk {
                old_start,
                old_count,
                new_start,
                new_count,
                lines: Vec::new(),
            });
            continue;
        }

        // other header lines (index, modes, rename, similarity) carry no
        // structure we keep
    }

    flush_hunk(&mut current, &mut hunk);
    flush_file(&mut files, &mut current);

    if files.is_empty() {
        warning!("diff parse failed: no file or hunk structure found");
        return Err(ParseError::Malformed);
    }
    Ok(StructuredDiff { files })
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

fn push_line(hunk: &mut Option<Hunk>, kind: LineKind, text: &str) {
    if let Some(hunk) = hunk.as_mut() {
        hunk.lines.push(LineChange {
            kind,
            text: text.to_string(),
        });
    }
}

fn flush_hunk(current: &mut Option<FileDiff>, hunk: &mut Option<Hunk>) {
    if let Some(hunk) = hunk.take()
        && let Some(file) = current.as_mut()
    {
        file.hunks.push(hunk);
    }
}

fn flush_file(files: &mut Vec<FileDiff>, current: &mut Option<FileDiff>) {
    if let Some(file) = current.take() {
        files.push(file);
    }
}

/// `diff --git` followed by two path tokens
fn is_git_header(line: &str) -> bool {
    line.strip_prefix("diff --git ")
        .is_some_and(|rest| rest.split_whitespace().count() >= 2)
}

/// extract the two paths from a `diff --git a/old b/new` header
fn git_header_paths(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("diff --git ")?;
    // the " b/" separator is the only reliable split when paths contain
    // spaces
    if let Some((old, new)) = rest.split_once(" b/")
        && !old.is_empty()
    {
        return Some((old.to_string(), format!("b/{new}")));
    }
    let mut parts = rest.split_whitespace();
    let old = parts.next()?;
    let new = parts.next()?;
    Some((old.to_string(), new.to_string()))
}

/// `index <id>..<id>`, optionally followed by a file mode
fn is_index_line(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("index ") else {
        return false;
    };
    let Some(ids) = rest.split_whitespace().next() else {
        return false;
    };
    let Some((old_id, new_id)) = ids.split_once("..") else {
        return false;
    };
    // blob ids are hex in practice; abbreviated ids from hand-written
    // diffs are accepted too
    !old_id.is_empty()
        && !new_id.is_empty()
        && old_id.chars().all(|c| c.is_ascii_alphanumeric())
        && new_id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// `--- ` or `+++ ` followed by a path-like token
fn is_file_marker(line: &str, marker: &str) -> bool {
    let Some(rest) = line.strip_prefix(marker) else {
        return false;
    };
    let Some(token) = rest.split_whitespace().next() else {
        return false;
    };
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '-' | '_'))
}

/// parse `@@ -old_start[,old_count] +new_start[,new_count] @@`
fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32)> {
    let rest = line.strip_prefix("@@ -")?;
    let end = rest.find(" @@")?;
    let (old, new) = rest[..end].split_once(" +")?;
    let (old_start, old_count) = parse_range(old)?;
    let (new_start, new_count) = parse_range(new)?;
    Some((old_start, old_count, new_start, new_count))
}

/// parse `start[,count]`, with count defaulting to 1 as git does
fn parse_range(range: &str) -> Option<(u32, u32)> {
    match range.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}

#[cfg(test)]
mod tests;
