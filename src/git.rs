use crate::changeset::{ChangeSet, DiffSource};
use anyhow::{Context as _, Result};
use git2::{Delta, DiffFindOptions, DiffFormat, DiffOptions, Repository};
use std::path::Path;

/// per-delta metadata used while formatting the patch text
struct DeltaInfo {
    path: String,
    ignored: bool,
}

/// get a reviewable diff from the repository
/// checks staged changes first, falls back to unstaged (including
/// untracked files); returns None if there is nothing to review
pub fn get_changes(path: &Path, context_lines: u32) -> Result<Option<ChangeSet>> {
    let repo = Repository::discover(path).context("failed to open git repository")?;

    let staged = create_staged_diff(&repo, context_lines)?;
    let staged_info = delta_info(&staged);
    if !staged_info.is_empty() {
        return Ok(Some(ChangeSet {
            diff: format_diff(&staged, &staged_info)?,
            source: DiffSource::Staged,
        }));
    }

    let unstaged = create_unstaged_diff(&repo, context_lines)?;
    let unstaged_info = delta_info(&unstaged);
    if unstaged_info.is_empty() {
        return Ok(None);
    }
    Ok(Some(ChangeSet {
        diff: format_diff(&unstaged, &unstaged_info)?,
        source: DiffSource::Unstaged,
    }))
}

/// collect the paths touched by a `git2::Diff` and whether their content
/// should be suppressed (lock files, minified files, binary files)
fn delta_info(diff: &git2::Diff) -> Vec<DeltaInfo> {
    let mut info = Vec::new();

    for delta in diff.deltas() {
        match delta.status() {
            Delta::Added
            | Delta::Copied
            | Delta::Untracked
            | Delta::Deleted
            | Delta::Modified
            | Delta::Typechange
            | Delta::Renamed => {}
            _ => continue, // skip ignored, unmodified, etc.
        }

        let path = if delta.status() == Delta::Deleted {
            delta.old_file().path()
        } else {
            delta.new_file().path().or_else(|| delta.old_file().path())
        };

        if let Some(path) = path {
            let path = path.to_string_lossy().to_string();
            let is_binary = delta.new_file().is_binary() || delta.old_file().is_binary();
            let ignored = is_binary || should_ignore_diff(&path);
            info.push(DeltaInfo { path, ignored });
        }
    }

    info
}

/// create a diff object for staged changes
fn create_staged_diff(repo: &Repository, context_lines: u32) -> Result<git2::Diff<'_>> {
    // handle unborn branch (no commits yet) - compare against empty tree
    let tree = match repo.head() {
        Ok(head) => Some(head.peel_to_tree().context("failed to get tree")?),
        Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
        Err(e) => return Err(e).context("failed to get HEAD"),
    };

    let mut opts = DiffOptions::new();
    opts.context_lines(context_lines);
    let mut diff = repo
        .diff_tree_to_index(tree.as_ref(), None, Some(&mut opts))
        .context("failed to create diff")?;

    detect_renames(&mut diff)?;
    Ok(diff)
}

/// create a diff object for unstaged changes
fn create_unstaged_diff(repo: &Repository, context_lines: u32) -> Result<git2::Diff<'_>> {
    let mut opts = DiffOptions::new();
    opts.context_lines(context_lines);
    opts.include_untracked(true);
    opts.recurse_untracked_dirs(true);
    opts.show_untracked_content(true);
    let mut diff = repo
        .diff_index_to_workdir(None, Some(&mut opts))
        .context("failed to create diff")?;

    detect_renames(&mut diff)?;
    Ok(diff)
}

/// enable rename detection with the git default 50% threshold
fn detect_renames(diff: &mut git2::Diff) -> Result<()> {
    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    find_opts.rename_threshold(50);
    find_opts.copy_threshold(50);
    diff.find_similar(Some(&mut find_opts))
        .context("failed to detect renames")
}

/// check if a file's diff should be suppressed (lock files, minified
/// files, etc.)
fn should_ignore_diff(path: &str) -> bool {
    let path_lower = path.to_lowercase();

    // lock files
    if path_lower.ends_with("-lock.json") || path_lower.ends_with("-lock.yaml") {
        return true;
    }
    if let Some(ext) = Path::new(path).extension()
        && ext.to_string_lossy().to_lowercase() == "lock"
    {
        return true;
    }

    // minified files
    path_lower.ends_with(".min.js")
        || path_lower.ends_with(".min.css")
        || path_lower.ends_with("-min.js")
        || path_lower.ends_with("-min.css")
}

/// format a diff object into unified diff text, suppressing ignored files
fn format_diff(diff: &git2::Diff, info: &[DeltaInfo]) -> Result<String> {
    let mut output = String::new();
    let mut skip_current_file = false;

    diff.print(DiffFormat::Patch, |delta, _hunk, line| {
        let origin = line.origin();

        // file headers decide whether the section is suppressed
        if origin == 'F'
            && let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path())
        {
            let path = path.to_string_lossy();
            skip_current_file = info
                .iter()
                .find(|i| i.path == path.as_ref())
                .is_some_and(|i| i.ignored);

            if skip_current_file {
                // leave a note that this file's diff was suppressed
                use std::fmt::Write as _;
                let _ = writeln!(output, "--- {path} (diff ignored)");
                return true;
            }
        }

        if skip_current_file {
            return true;
        }

        let content = std::str::from_utf8(line.content()).unwrap_or("");
        match origin {
            // diff line types that need the origin character
            '+' | '-' | ' ' => output.push(origin),
            // headers already carry their own text
            _ => {}
        }
        output.push_str(content);
        true
    })
    .context("failed to format diff")?;

    Ok(output.trim_end_matches('\n').to_string())
}
