use crate::{ProposedChange, ScanSummary, TimerKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User collapsed or expanded the sidebar.
    ToggleSidebar,
    /// User edited the code in the editor pane.
    EditorChanged(String),
    /// User edited the global fix instruction.
    InstructionChanged(String),
    /// A screenshot (base64 data URL) was attached for visual repair.
    ScreenshotAttached(String),
    /// User removed the attached screenshot.
    ScreenshotCleared,
    /// User picked a project folder to scan.
    ScanRequested { path: String },
    /// Agent service returned the project tree.
    ScanCompleted(ScanSummary),
    /// Scan call failed.
    ScanFailed(String),
    /// User clicked "Fix Project".
    BatchFixRequested,
    /// Agent service proposed changes for the batch instruction.
    BatchFixCompleted(Vec<ProposedChange>),
    /// Batch fix call failed.
    BatchFixFailed(String),
    /// User opened a proposed change for review.
    ReviewOpened { file_name: String },
    /// User accepted the change under review.
    ReviewAccepted,
    /// User rejected the change under review.
    ReviewRejected,
    /// User clicked "Fix my UI".
    AnalyzeRequested,
    /// Agent service finished analysing the current code.
    AnalyzeCompleted {
        fixed_code: Option<String>,
        explanations: String,
    },
    /// Analysis call failed.
    AnalyzeFailed(String),
    /// User clicked "Save & Push".
    SaveRequested,
    /// A save call succeeded.
    SaveCompleted { path: String, auto: bool },
    /// A save call failed.
    SaveFailed { message: String, auto: bool },
    /// A timer requested through [`crate::Effect::StartTimer`] fired.
    TimerElapsed(TimerKind),
    /// User dismissed the mission report.
    MissionReportAcknowledged,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
