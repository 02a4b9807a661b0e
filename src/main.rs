mod changeset;
mod claude;
mod cli;
mod config;
mod constants;
mod context;
mod diff;
mod git;
mod ui;

use crate::changeset::{ChangeSet, DiffSource};
use crate::config::ReviewConfig;
use crate::constants::{
    DIFF_SIZE_MAXIMUM_BYTES, DIFF_SIZE_WARNING_BYTES, LESS_CONTEXT, MAX_FILES_TO_SHOW,
};
use crate::context::AppContext;
use crate::diff::StructuredDiff;
use anyhow::{Context as _, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use num_format::{Locale, ToFormattedString};
use std::io::IsTerminal;
use std::path::Path;

fn main() {
    let cli = cli::Cli::parse_args();
    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &cli::Cli) -> Result<()> {
    let config = ReviewConfig::resolve(cli)?;
    let mut ctx = AppContext::new(cli);

    let changeset = gather_diff(cli, &ctx)?;

    // validation gate: empty input first, then pattern recognition
    if changeset.diff.trim().is_empty() {
        bail!("please enter a git diff");
    }
    if !diff::is_valid_diff(&changeset.diff) {
        bail!("invalid git diff format, please check your input");
    }

    let changeset = enforce_size_limits(changeset, &mut ctx)?;

    // structural decomposition drives the summary display; text that
    // passes the pattern gate can still lack parseable structure
    let structured = match diff::parse_diff(&changeset.diff) {
        Ok(parsed) => parsed,
        Err(e) => bail!("{e}"),
    };
    display_summary(&changeset, &structured);

    let interactive = std::io::stdin().is_terminal()
        && std::io::stdout().is_terminal()
        && changeset.source != DiffSource::Stdin;

    let review = if interactive {
        review_loop(&config, &mut ctx, &changeset)?
    } else {
        let markdown = claude::generate(&config, &ctx, &changeset.diff)?;
        display_review(&markdown);
        markdown
    };

    if let Some(path) = &cli.output {
        std::fs::write(path, &review)
            .with_context(|| format!("failed to write {}", path.display()))?;
        status!("review saved to {}", path.display());
    }

    Ok(())
}

/// resolve the diff to review: explicit file, piped stdin, the local
/// repository, or pasting into $EDITOR
fn gather_diff(cli: &cli::Cli, ctx: &AppContext) -> Result<ChangeSet> {
    if let Some(file) = &cli.file {
        if file == "-" {
            return read_stdin();
        }
        let diff =
            std::fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?;
        return Ok(ChangeSet {
            diff,
            source: DiffSource::File(file.clone()),
        });
    }

    if !std::io::stdin().is_terminal() {
        return read_stdin();
    }

    // no file and no pipe: try the local repository, then fall back to
    // pasting a diff into the editor
    match git::get_changes(Path::new("."), ctx.context_lines) {
        Ok(Some(changeset)) => return Ok(changeset),
        Ok(None) => status!("no changes in the repository, paste a diff to review..."),
        Err(e) => warning!("{}, paste a diff to review...", e),
    }

    let diff = ui::edit_in_editor("", ".diff")?;
    Ok(ChangeSet {
        diff,
        source: DiffSource::Editor,
    })
}

fn read_stdin() -> Result<ChangeSet> {
    use std::io::Read;

    let mut diff = String::new();
    std::io::stdin()
        .read_to_string(&mut diff)
        .context("failed to read stdin")?;
    Ok(ChangeSet {
        diff,
        source: DiffSource::Stdin,
    })
}

/// check diff size and enforce limits
/// repository diffs over the maximum are regenerated with minimal context
/// before giving up
fn enforce_size_limits(mut changeset: ChangeSet, ctx: &mut AppContext) -> Result<ChangeSet> {
    let mut diff_size = changeset.diff.len();

    if diff_size > DIFF_SIZE_MAXIMUM_BYTES && changeset.source.is_repository() {
        warning!(
            "diff is large ({} chars), retrying with {} context line(s)",
            diff_size.to_formatted_string(&Locale::en),
            LESS_CONTEXT
        );
        ctx.context_lines = LESS_CONTEXT;
        if let Some(smaller) = git::get_changes(Path::new("."), ctx.context_lines)? {
            changeset = smaller;
            diff_size = changeset.diff.len();
        }
    }

    if diff_size > DIFF_SIZE_MAXIMUM_BYTES {
        bail!(
            "diff is too large ({} chars, max {})",
            diff_size.to_formatted_string(&Locale::en),
            DIFF_SIZE_MAXIMUM_BYTES.to_formatted_string(&Locale::en)
        );
    }

    if diff_size > DIFF_SIZE_WARNING_BYTES {
        warning!(
            "diff is large ({} chars), this may use many tokens",
            diff_size.to_formatted_string(&Locale::en)
        );
        if std::io::stdin().is_terminal() && std::io::stdout().is_terminal() {
            let response = ui::prompt(&["continue", "abort"])?;
            if response == "a" {
                std::process::exit(1);
            }
        }
    }

    Ok(changeset)
}

/// display what is being reviewed and the files it touches
fn display_summary(changeset: &ChangeSet, structured: &StructuredDiff) {
    let file_count = structured.files.len();
    let file_word = if file_count == 1 { "file" } else { "files" };

    status!(
        "reviewing {} touching {} {} (+{} -{})...",
        changeset.describe(),
        file_count,
        file_word,
        structured.additions(),
        structured.deletions()
    );

    for file in structured.files.iter().take(MAX_FILES_TO_SHOW) {
        info!(
            "  {} (+{} -{})",
            file.display_path(),
            file.additions(),
            file.deletions()
        );
    }

    // show count of remaining files if there are more than MAX_FILES_TO_SHOW
    if file_count > MAX_FILES_TO_SHOW {
        info!("  (+{} more)", file_count - MAX_FILES_TO_SHOW);
    }

    info!();
}

/// interactive loop: generate, display, then act on the user's choice
fn review_loop(
    config: &ReviewConfig,
    ctx: &mut AppContext,
    changeset: &ChangeSet,
) -> Result<String> {
    loop {
        // regenerate the review, if required
        if ctx.regenerate && let Some(markdown) = generate(config, ctx, &changeset.diff) {
            if markdown.trim().is_empty() {
                warning!("generated review is empty, keeping the previous one");
            } else {
                ctx.review = markdown;
            }
        }
        ctx.regenerate = true;

        if ctx.review.is_empty() {
            bail!("no review was generated");
        }
        display_review(&ctx.review);

        let action = ui::prompt(&["DONE", "reroll", "focus", "save"])?;
        match action.as_str() {
            "d" => return Ok(ctx.review.clone()),
            "r" => status!("rerolling..."),
            "f" => {
                status!("focus the review (blank for a full review):");
                let old_directive = ctx.directive.clone();
                ctx.directive = ui::edit_one_line(&ctx.directive)?;
                if ctx.directive == old_directive {
                    ctx.regenerate = false;
                } else {
                    status!("thinking...");
                }
            }
            "s" => {
                status!("save the review to:");
                let path = ui::edit_one_line("review.md")?;
                if path.is_empty() {
                    warning!("no path given, not saving");
                } else {
                    match std::fs::write(&path, &ctx.review) {
                        Ok(()) => status!("review saved to {}", path),
                        Err(e) => error!("failed to save review: {}", e),
                    }
                }
                ctx.regenerate = false;
            }
            _ => ctx.regenerate = false,
        }
    }
}

/// generate a review with a spinner
fn generate(config: &ReviewConfig, ctx: &AppContext, diff: &str) -> Option<String> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .expect("invalid spinner template"),
    );
    spinner.set_message("reviewing");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = claude::generate(config, ctx, diff);

    spinner.finish_and_clear();

    match result {
        Ok(markdown) => Some(markdown),
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}

/// print the review markdown with light terminal styling
fn display_review(markdown: &str) {
    use colored::Colorize;
    use std::io::{self, Write};

    let _ = writeln!(io::stdout());
    let mut in_code_block = false;
    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            let _ = writeln!(io::stdout(), "{}", line.dimmed());
        } else if in_code_block {
            let _ = writeln!(io::stdout(), "{}", line.dimmed());
        } else if line.starts_with('#') {
            let _ = writeln!(io::stdout(), "{}", line.green().bold());
        } else {
            let _ = writeln!(io::stdout(), "{line}");
        }
    }
    let _ = writeln!(io::stdout());
}
