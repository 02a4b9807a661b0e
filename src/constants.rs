// diff
pub const DEFAULT_CONTEXT: u32 = 3;
pub const LESS_CONTEXT: u32 = 1;
pub const DIFF_SIZE_WARNING_BYTES: usize = 50 * 1024;
pub const DIFF_SIZE_MAXIMUM_BYTES: usize = 100 * 1024;

// ui
pub const MAX_FILES_TO_SHOW: usize = 10;

// claude
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
pub const API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const MAX_REVIEW_TOKENS: u32 = 8192;
pub const CLAUDE_TIMEOUT_SECS: u64 = 120;
