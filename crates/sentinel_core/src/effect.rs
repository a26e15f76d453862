use std::time::Duration;

/// Delay before a success status falls back to idle.
pub const STATUS_RESET_DELAY: Duration = Duration::from_millis(2000);
/// Delay before the status falls back to idle after a confirmed save.
pub const SAVE_RESET_DELAY: Duration = Duration::from_millis(3000);
/// How long the scanning overlay lingers after a call returns.
pub const OVERLAY_LINGER: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ScanProject {
        path: String,
    },
    FixProject {
        folder_path: String,
        instruction: String,
    },
    Analyze {
        code: String,
        file_name: String,
        image: Option<String>,
    },
    SaveFile {
        path: String,
        content: String,
        auto: bool,
    },
    /// Typewriter-reveal new editor content.
    RevealCode {
        text: String,
    },
    StartTimer {
        kind: TimerKind,
        delay: Duration,
    },
}

/// Timers the state machine can ask for; each comes back as
/// [`crate::Msg::TimerElapsed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Move the agent status back to idle.
    StatusReset,
    /// Hide the scanning overlay.
    ScanOverlay,
}
