/// application state carried through the review workflow
pub struct AppContext {
    /// the current review markdown
    pub review: String,

    /// free-text directive narrowing what the review should focus on
    pub directive: String,

    /// number of context lines for repository-sourced diffs
    pub context_lines: u32,

    /// whether to regenerate the review on the next loop iteration
    pub regenerate: bool,

    /// whether to print the prompt sent to claude (from --debug-prompt)
    pub show_prompt: bool,

    /// whether to print the raw provider response (from --debug-response)
    pub show_response: bool,
}

impl AppContext {
    /// create a new context with default values
    pub fn new(cli: &crate::cli::Cli) -> Self {
        Self {
            review: String::new(),
            // prompt
            directive: cli.directive.clone().unwrap_or_default(),
            context_lines: crate::constants::DEFAULT_CONTEXT,
            // state
            regenerate: true,
            // debugging
            show_prompt: cli.debug_prompt,
            show_response: cli.debug_response,
        }
    }
}
