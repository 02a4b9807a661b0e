use crate::config::{Backend, ReviewConfig};
use crate::constants::{ANTHROPIC_VERSION, API_URL, CLAUDE_TIMEOUT_SECS, MAX_REVIEW_TOKENS};
use crate::context::AppContext;
use crate::{info, warning};
use anyhow::{Context as _, Result, bail};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

pub fn get_prompt(ctx: &AppContext) -> String {
    let base = r#"
YOU ARE A CODE REVIEWER.

MANDATORY OUTPUT FORMAT (NOT OPTIONAL):
- github-flavoured markdown only
- no preamble, no "here's my review"
- start with a one-paragraph summary of what the change does
- then one section per file, heading: ## path
- cite locations as `path:line` using the new line numbers
- end with a one-line verdict

REVIEW PRIORITIES (in order):
1. bugs and logic errors introduced by the change
2. security issues (injection, secrets, unchecked input)
3. risky edge cases and missing error handling
4. smaller suggestions, kept brief

RULES:
- review only what the diff changes, not the surrounding style
- no praise padding, no filler
- if the diff looks fine, say so in one line and stop
"#
    .trim()
    .to_string();

    if ctx.directive.is_empty() {
        base
    } else {
        format!(
            "{base}\n\nREVIEW DIRECTIVES (narrow the review to these):\n{}",
            ctx.directive
        )
    }
}

/// build the user-turn content: the request plus the fenced diff
fn get_request(diff: &str) -> String {
    format!("Review the following git diff.\n\n```diff\n{diff}\n```")
}

pub fn generate(config: &ReviewConfig, ctx: &AppContext, diff: &str) -> Result<String> {
    let prompt = get_prompt(ctx);

    // print prompt if requested (before adding the diff)
    if ctx.show_prompt {
        use colored::Colorize;
        let _ = writeln!(std::io::stdout(), "\n{}", prompt.dimmed());
    }

    match config.backend {
        Backend::Api => generate_api(config, ctx, &prompt, diff),
        Backend::Cli => generate_cli(ctx, &prompt, diff),
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// generate the review via the anthropic messages API
fn generate_api(
    config: &ReviewConfig,
    ctx: &AppContext,
    prompt: &str,
    diff: &str,
) -> Result<String> {
    let Some(api_key) = &config.api_key else {
        bail!("api key not provided, set --api-key, ANTHROPIC_API_KEY, or the config file");
    };

    let request = MessagesRequest {
        model: &config.model,
        max_tokens: MAX_REVIEW_TOKENS,
        system: prompt,
        messages: vec![Message {
            role: "user",
            content: get_request(diff),
        }],
    };

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(CLAUDE_TIMEOUT_SECS)))
        .http_status_as_error(false)
        .build()
        .into();

    let mut response = agent
        .post(API_URL)
        .header("x-api-key", api_key.as_str())
        .header("anthropic-version", ANTHROPIC_VERSION)
        .send_json(&request)
        .context("request to the anthropic API failed")?;

    let status = response.status();
    let body: serde_json::Value = response
        .body_mut()
        .read_json()
        .context("failed to read the anthropic API response")?;

    if ctx.show_response {
        use colored::Colorize;
        let pretty = serde_json::to_string_pretty(&body).unwrap_or_default();
        let _ = writeln!(std::io::stdout(), "\n{}", pretty.dimmed());
    }

    if !status.is_success() {
        let message = body
            .pointer("/error/message")
            .and_then(|m| m.as_str())
            .unwrap_or("no error details");
        bail!("anthropic API returned {status}: {message}");
    }

    let parsed: MessagesResponse =
        serde_json::from_value(body).context("unexpected anthropic API response shape")?;

    let markdown = parsed
        .content
        .iter()
        .filter(|block| block.kind == "text")
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    if markdown.trim().is_empty() {
        bail!("the model returned no review text");
    }
    Ok(markdown.trim().to_string())
}

/// generate the review by spawning the claude CLI
fn generate_cli(ctx: &AppContext, prompt: &str, diff: &str) -> Result<String> {
    let mut input = String::new();
    input.push_str(prompt);
    input.push_str("\n\n");
    input.push_str(&get_request(diff));
    input.push('\n');

    // spawn claude process
    let mut child = Command::new("claude")
        .args(["--print", "--tools", ""])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| anyhow::anyhow!("failed to spawn claude process: {e}"))?;

    // write input to stdin and close it
    if let Some(mut stdin) = child.stdin.take()
        && let Err(e) = stdin.write_all(input.as_bytes())
    {
        let _ = child.kill();
        let _ = child.wait();
        bail!("failed to write to claude stdin: {e}");
    }

    // take stdout and stderr handles
    let mut stdout = child
        .stdout
        .take()
        .expect("failed to take stdout from child process");
    let mut stderr = child
        .stderr
        .take()
        .expect("failed to take stderr from child process");

    // wait for process to complete with timeout
    let timeout = Duration::from_secs(CLAUDE_TIMEOUT_SECS);
    match child.wait_timeout(timeout) {
        Ok(Some(status)) => {
            // process completed within timeout, read output
            let mut stdout_data = Vec::new();
            let mut stderr_data = Vec::new();

            if let Err(e) = stdout.read_to_end(&mut stdout_data) {
                warning!("failed to read claude stdout: {}", e);
            }
            if let Err(e) = stderr.read_to_end(&mut stderr_data) {
                warning!("failed to read claude stderr: {}", e);
            }

            if !status.success() {
                if !stdout_data.is_empty() {
                    info!("{}", String::from_utf8_lossy(&stdout_data).trim());
                }
                if !stderr_data.is_empty() {
                    info!("{}", String::from_utf8_lossy(&stderr_data).trim());
                }
                bail!("claude exited with {status}");
            }

            let markdown = String::from_utf8_lossy(&stdout_data).trim().to_string();
            if markdown.is_empty() {
                bail!("claude produced no review text");
            }
            Ok(markdown)
        }
        Ok(None) => {
            // timeout occurred, kill the process
            if let Err(e) = child.kill() {
                warning!("failed to kill claude process: {}", e);
            }
            let _ = child.wait();
            bail!("claude thought for too long")
        }
        Err(e) => bail!("failed to wait for claude process: {e}"),
    }
}
