use crate::cli::Cli;
use crate::constants::DEFAULT_MODEL;
use crate::warning;
use anyhow::{Result, bail};
use serde::Deserialize;
use std::path::PathBuf;

/// which provider path generates the review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// POST to the anthropic messages API
    Api,
    /// spawn the claude CLI
    Cli,
}

/// process-wide defaults read from the user config file
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

/// resolved configuration handed to the provider boundary
#[derive(Debug)]
pub struct ReviewConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub backend: Backend,
}

impl ReviewConfig {
    /// resolve configuration once at startup
    ///
    /// precedence, highest first: command line flags, then environment
    /// variables, then the user config file, then the hardcoded fallback
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let config = Self::resolve_with(cli, |name| std::env::var(name).ok(), load_file_config());
        if cli.api && config.api_key.is_none() {
            bail!("api key not provided, set --api-key, ANTHROPIC_API_KEY, or the config file");
        }
        Ok(config)
    }

    fn resolve_with(cli: &Cli, env: impl Fn(&str) -> Option<String>, file: FileConfig) -> Self {
        let api_key = cli
            .api_key
            .clone()
            .or_else(|| env("ANTHROPIC_API_KEY"))
            .or(file.api_key);

        let model = cli
            .model
            .clone()
            .or_else(|| env("GIT_DIFF_REVIEW_MODEL"))
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let backend = if cli.cli {
            Backend::Cli
        } else if cli.api || api_key.is_some() {
            Backend::Api
        } else {
            Backend::Cli
        };

        Self {
            api_key,
            model,
            backend,
        }
    }
}

/// load the user config file, tolerating absence and malformed content
fn load_file_config() -> FileConfig {
    let Some(path) = config_file_path() else {
        return FileConfig::default();
    };
    let Ok(raw) = std::fs::read_to_string(&path) else {
        return FileConfig::default();
    };
    match serde_json::from_str(&raw) {
        Ok(config) => config,
        Err(e) => {
            warning!("ignoring malformed config file {}: {}", path.display(), e);
            FileConfig::default()
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("git-diff-review").join("config.json"))
}
