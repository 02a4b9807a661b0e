use clap::Parser;
use std::path::PathBuf;

/// git-diff-review: send a unified diff to claude and render the returned
/// markdown as a code review
#[derive(Parser, Debug)]
#[command(
    name = "git-diff-review",
    about,
    long_about = None,
    disable_version_flag = true
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// diff file to review ("-" for stdin); defaults to the local repository
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// narrow what the review should focus on
    #[arg(long, short = 'd')]
    pub directive: Option<String>,

    /// model to use (overrides environment and config file)
    #[arg(long)]
    pub model: Option<String>,

    /// api key to use (overrides environment and config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// force CLI usage
    #[arg(long, conflicts_with = "api")]
    pub cli: bool,

    /// force API usage
    #[arg(long, conflicts_with = "cli")]
    pub api: bool,

    /// write the final review to this file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// print the prompt sent to claude
    #[arg(long)]
    pub debug_prompt: bool,

    /// print the full JSON response from claude
    #[arg(long)]
    pub debug_response: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
