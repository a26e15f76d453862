use sentinel_logging::{sentinel_debug, sentinel_warn};

use crate::effect::{OVERLAY_LINGER, SAVE_RESET_DELAY, STATUS_RESET_DELAY};
use crate::{AgentStatus, AppState, Effect, Msg, ScanSummary, TimerKind};

/// Directory the agent service resolves saved editor files against.
const SAVE_DIR: &str = "src/app";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ToggleSidebar => {
            state.toggle_sidebar();
            Vec::new()
        }
        Msg::EditorChanged(code) => {
            state.set_editor_code(code.clone());
            state.set_current_code(code);
            Vec::new()
        }
        Msg::InstructionChanged(instruction) => {
            state.set_instruction(instruction);
            Vec::new()
        }
        Msg::ScreenshotAttached(data) => {
            state.set_screenshot(Some(data));
            state.push_log("Visual context attached: Screenshot captured.");
            Vec::new()
        }
        Msg::ScreenshotCleared => {
            state.set_screenshot(None);
            Vec::new()
        }
        Msg::ScanRequested { path } => {
            if state.is_scanning() {
                return (state, Vec::new());
            }
            state.set_scanning(true);
            state.set_status(AgentStatus::Thinking);
            state.clear_logs();
            state.push_log("Initializing Project Scanner...");
            state.push_log("Reading directory structure...");
            state.push_log("Executing recursive walk...");
            vec![Effect::ScanProject { path }]
        }
        Msg::ScanCompleted(summary) => apply_scan(&mut state, summary),
        Msg::ScanFailed(reason) => {
            sentinel_warn!("Project scan failed: {}", reason);
            state.set_status(AgentStatus::Error);
            state.push_log("Critical Failure: Scan aborted.");
            vec![overlay_timer()]
        }
        Msg::BatchFixRequested => {
            if !state.can_fix_project() {
                return (state, Vec::new());
            }
            let instruction = state.global_instruction().to_string();
            state.set_scanning(true);
            state.set_status(AgentStatus::Thinking);
            state.push_log("Batch neural processing initiated...");
            state.push_log(format!("Instruction: \"{instruction}\""));
            vec![Effect::FixProject {
                folder_path: ".".to_string(),
                instruction,
            }]
        }
        Msg::BatchFixCompleted(changes) => {
            state.push_log(format!(
                "Analysis complete. {} modifications proposed.",
                changes.len()
            ));
            state.set_proposed_changes(changes);
            state.set_status(AgentStatus::Success);
            state.set_scanning(false);
            vec![status_reset_timer(STATUS_RESET_DELAY)]
        }
        Msg::BatchFixFailed(reason) => {
            sentinel_warn!("Batch fix failed: {}", reason);
            state.set_status(AgentStatus::Error);
            state.push_log("Error: Neural Batch process aborted.");
            state.set_scanning(false);
            Vec::new()
        }
        Msg::ReviewOpened { file_name } => {
            if !state.open_review(&file_name) {
                sentinel_debug!("Ignoring review request for unknown file {}", file_name);
            }
            Vec::new()
        }
        Msg::ReviewAccepted => {
            if let Some(change) = state.close_review() {
                state.push_log(format!("Accepted changes for {}", change.file_name));
            }
            Vec::new()
        }
        Msg::ReviewRejected => {
            if let Some(change) = state.close_review() {
                state.push_log(format!("Rejected changes for {}", change.file_name));
            }
            Vec::new()
        }
        Msg::AnalyzeRequested => {
            state.set_status(AgentStatus::Thinking);
            state.set_scanning(true);
            let line = if state.screenshot().is_some() {
                "ANALYZING PIXELS..."
            } else {
                "Initiating Neural Analysis..."
            };
            state.push_log(line);
            vec![Effect::Analyze {
                code: state.current_code().to_string(),
                file_name: state.editor_file().name.clone(),
                image: state.screenshot().map(ToOwned::to_owned),
            }]
        }
        Msg::AnalyzeCompleted {
            fixed_code,
            explanations,
        } => {
            sentinel_debug!("Analysis explanations: {}", explanations);
            let mut effects = Vec::with_capacity(3);
            match fixed_code {
                Some(code) => {
                    state.set_editor_code(code.clone());
                    effects.push(Effect::RevealCode { text: code.clone() });
                    effects.push(Effect::SaveFile {
                        path: save_path(&state),
                        content: code,
                        auto: true,
                    });
                    state.set_status(AgentStatus::Success);
                    state.push_log("Neural Patch Complete.");
                }
                None => {
                    state.set_status(AgentStatus::Idle);
                    state.push_log("AI: No critical issues found.");
                }
            }
            effects.push(overlay_timer());
            effects
        }
        Msg::AnalyzeFailed(reason) => {
            sentinel_warn!("Analysis failed: {}", reason);
            state.set_status(AgentStatus::Error);
            state.push_log("Error: Neural Link Interrupted.");
            vec![overlay_timer()]
        }
        Msg::SaveRequested => {
            if state.is_saving() {
                return (state, Vec::new());
            }
            state.set_saving(true);
            state.set_status(AgentStatus::Thinking);
            state.push_log("Compiling changes...");
            vec![Effect::SaveFile {
                path: save_path(&state),
                content: state.editor_code().to_string(),
                auto: false,
            }]
        }
        Msg::SaveCompleted { path, auto: true } => {
            let line = if state.screenshot().is_some() {
                "Visual repair complete. Auto-saved to disk.".to_string()
            } else {
                format!("AI: Code optimization applied & saved to {path}.")
            };
            state.push_log(line);
            Vec::new()
        }
        Msg::SaveCompleted { path, auto: false } => {
            state.set_saving(false);
            state.set_status(AgentStatus::Success);
            state.push_log(format!("Write confirmed: {path}"));
            state.push_log("Task successfully completed.");
            vec![status_reset_timer(SAVE_RESET_DELAY)]
        }
        Msg::SaveFailed {
            message,
            auto: true,
        } => {
            sentinel_warn!("Auto-save failed: {}", message);
            state.push_log("Visual repair complete. Warning: Auto-save failed.");
            Vec::new()
        }
        Msg::SaveFailed {
            message,
            auto: false,
        } => {
            sentinel_warn!("Save failed: {}", message);
            state.set_saving(false);
            state.set_status(AgentStatus::Error);
            state.push_log("Error: Write access denied.");
            Vec::new()
        }
        Msg::TimerElapsed(TimerKind::StatusReset) => {
            // A newer operation may have moved the status on in the meantime.
            if state.agent_status() == AgentStatus::Success {
                state.set_status(AgentStatus::Idle);
            }
            Vec::new()
        }
        Msg::TimerElapsed(TimerKind::ScanOverlay) => {
            state.set_scanning(false);
            Vec::new()
        }
        Msg::MissionReportAcknowledged => {
            state.set_mission_report(None);
            Vec::new()
        }
        Msg::Tick => {
            state.settle_flash();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn apply_scan(state: &mut AppState, summary: ScanSummary) -> Vec<Effect> {
    let ScanSummary { tree, stats } = summary;
    state.push_log(format!("Scanned {} root nodes.", tree.len()));
    if let Some(stats) = stats {
        state.push_log(format!("Processed {} files total.", stats.scanned));
        state.push_log(format!("Safely ignored {} directories.", stats.ignored));
    }
    if tree.is_empty() {
        state.push_log("Warning: No file tree returned.");
    } else {
        state.set_files(tree);
    }
    state.push_log("Generating file tree visualization...");
    state.set_mission_report(stats);
    state.set_status(AgentStatus::Success);
    state.push_log("Project Context Loaded.");
    vec![status_reset_timer(STATUS_RESET_DELAY), overlay_timer()]
}

fn save_path(state: &AppState) -> String {
    format!("{SAVE_DIR}/{}", state.editor_file().name)
}

fn status_reset_timer(delay: std::time::Duration) -> Effect {
    Effect::StartTimer {
        kind: TimerKind::StatusReset,
        delay,
    }
}

fn overlay_timer() -> Effect {
    Effect::StartTimer {
        kind: TimerKind::ScanOverlay,
        delay: OVERLAY_LINGER,
    }
}
