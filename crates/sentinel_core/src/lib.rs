//! Sentinel core: pure dashboard state machine, view-model helpers and the
//! language classifier.
mod effect;
mod language;
mod msg;
mod naming;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, TimerKind, OVERLAY_LINGER, SAVE_RESET_DELAY, STATUS_RESET_DELAY};
pub use language::{classify, Classification, Language};
pub use msg::Msg;
pub use naming::suggest_file_name;
pub use state::{
    AgentStatus, AppState, ChangeStatus, EditorFile, FileKind, FileNode, MissionReport,
    ProposedChange, ScanSummary, DEMO_EDITOR_CODE, DEMO_FILE_NAME,
};
pub use update::update;
pub use view_model::{AppViewModel, EditorView, ReviewView, VISIBLE_LOG_LINES};
