use crate::{AgentStatus, FileNode, Language, MissionReport};

/// Number of log lines the sidebar terminal shows.
pub const VISIBLE_LOG_LINES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub sidebar_open: bool,
    pub agent_status: AgentStatus,
    pub scanning: bool,
    /// Tail of the log, at most [`VISIBLE_LOG_LINES`] entries.
    pub visible_logs: Vec<String>,
    pub log_count: usize,
    /// Bumped every time the log is cleared.
    pub log_epoch: u64,
    pub files: Vec<FileNode>,
    pub mission_report: Option<MissionReport>,
    pub editor: EditorView,
    pub global_instruction: String,
    pub can_fix_project: bool,
    pub pending_changes: Vec<String>,
    pub review: Option<ReviewView>,
    pub has_screenshot: bool,
    pub saving: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
    pub file_name: String,
    pub icon: &'static str,
    pub language: Language,
    pub flash: bool,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewView {
    pub file_name: String,
    pub original_code: String,
    pub fixed_code: String,
}
