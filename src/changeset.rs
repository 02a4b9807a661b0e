/// where the diff under review came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffSource {
    Staged,
    Unstaged,
    File(String),
    Stdin,
    Editor,
}

impl DiffSource {
    /// repository-sourced diffs can be regenerated with fewer context lines
    pub fn is_repository(&self) -> bool {
        matches!(self, DiffSource::Staged | DiffSource::Unstaged)
    }
}

/// the raw diff text to review, with its provenance
#[derive(Debug)]
pub struct ChangeSet {
    pub diff: String,
    pub source: DiffSource,
}

impl ChangeSet {
    pub fn describe(&self) -> String {
        match &self.source {
            DiffSource::Staged => "staged changes".to_string(),
            DiffSource::Unstaged => "unstaged changes".to_string(),
            DiffSource::File(path) => format!("diff from {path}"),
            DiffSource::Stdin => "diff from stdin".to_string(),
            DiffSource::Editor => "pasted diff".to_string(),
        }
    }
}
