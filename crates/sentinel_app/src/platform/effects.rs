use std::sync::Arc;
use std::time::Duration;

use sentinel_core::{
    ChangeStatus, Effect, FileNode, MissionReport, Msg, ProposedChange, ScanSummary, TimerKind,
};
use sentinel_engine::{
    AnalyzeRequest, EngineEvent, EngineHandle, EntryKind, FileEntry, ProposedChangeEntry,
    ReqwestAgentApi, RevealFrame, ScanResponse, ScanStats, TimerId,
};
use sentinel_logging::{sentinel_info, sentinel_warn};

use super::config::AppConfig;

/// What the engine handed back: either a message for the reducer or a
/// typewriter frame for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Msg(Msg),
    Reveal(RevealFrame),
}

/// Executes core effects on the engine and tracks outstanding work.
pub struct EffectRunner {
    engine: EngineHandle,
    in_flight: usize,
    reveals_requested: u64,
    revealing: bool,
}

impl EffectRunner {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let api = ReqwestAgentApi::new(config.api_settings())?;
        sentinel_info!("Agent service at {}", api.base_url());
        let engine = EngineHandle::new(Arc::new(api), config.typewriter_settings())?;
        Ok(Self {
            engine,
            in_flight: 0,
            reveals_requested: 0,
            revealing: false,
        })
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ScanProject { path } => {
                    self.in_flight += 1;
                    self.engine.scan(path);
                }
                Effect::FixProject {
                    folder_path,
                    instruction,
                } => {
                    self.in_flight += 1;
                    self.engine.fix_project(folder_path, instruction);
                }
                Effect::Analyze {
                    code,
                    file_name,
                    image,
                } => {
                    self.in_flight += 1;
                    self.engine.analyze(AnalyzeRequest {
                        code,
                        file_name,
                        image,
                    });
                }
                Effect::SaveFile {
                    path,
                    content,
                    auto,
                } => {
                    self.in_flight += 1;
                    self.engine.save(path, content, auto);
                }
                Effect::RevealCode { text } => self.reveal(text),
                Effect::StartTimer { kind, delay } => {
                    self.in_flight += 1;
                    self.engine.start_timer(timer_id(kind), delay);
                }
            }
        }
    }

    /// Typewriter `text` outside of any core effect.
    pub fn reveal(&mut self, text: String) {
        self.reveals_requested += 1;
        self.revealing = true;
        self.engine.reveal(text);
    }

    /// Wait up to `timeout` for the next engine event.
    pub fn poll(&mut self, timeout: Duration) -> Option<Incoming> {
        let event = self.engine.recv_timeout(timeout)?;
        match &event {
            EngineEvent::Reveal(frame) => {
                // Only the newest reveal can finish the typing phase.
                self.revealing =
                    !(frame.is_complete && frame.generation >= self.reveals_requested);
            }
            _ => self.in_flight = self.in_flight.saturating_sub(1),
        }
        map_event(event)
    }

    /// No call, timer or reveal is outstanding.
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0 && !self.revealing
    }

    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}

fn timer_id(kind: TimerKind) -> TimerId {
    match kind {
        TimerKind::StatusReset => 1,
        TimerKind::ScanOverlay => 2,
    }
}

fn timer_kind(id: TimerId) -> Option<TimerKind> {
    match id {
        1 => Some(TimerKind::StatusReset),
        2 => Some(TimerKind::ScanOverlay),
        _ => None,
    }
}

fn map_event(event: EngineEvent) -> Option<Incoming> {
    let msg = match event {
        EngineEvent::Reveal(frame) => return Some(Incoming::Reveal(frame)),
        EngineEvent::ScanFinished(Ok(response)) => Msg::ScanCompleted(scan_summary(response)),
        EngineEvent::ScanFinished(Err(err)) => Msg::ScanFailed(err.to_string()),
        EngineEvent::FixFinished(Ok(response)) => Msg::BatchFixCompleted(
            response.changes.into_iter().map(proposed_change).collect(),
        ),
        EngineEvent::FixFinished(Err(err)) => Msg::BatchFixFailed(err.to_string()),
        EngineEvent::AnalyzeFinished(Ok(response)) => Msg::AnalyzeCompleted {
            fixed_code: response.fixed_code,
            explanations: response.explanations,
        },
        EngineEvent::AnalyzeFinished(Err(err)) => Msg::AnalyzeFailed(err.to_string()),
        EngineEvent::SaveFinished {
            path,
            auto,
            result: Ok(_),
        } => Msg::SaveCompleted { path, auto },
        EngineEvent::SaveFinished {
            auto,
            result: Err(err),
            ..
        } => Msg::SaveFailed {
            message: err.to_string(),
            auto,
        },
        EngineEvent::TimerElapsed(id) => match timer_kind(id) {
            Some(kind) => Msg::TimerElapsed(kind),
            None => {
                sentinel_warn!("Ignoring unknown timer {}", id);
                return None;
            }
        },
    };
    Some(Incoming::Msg(msg))
}

fn scan_summary(response: ScanResponse) -> ScanSummary {
    ScanSummary {
        tree: response.tree.into_iter().map(file_node).collect(),
        stats: response.stats.map(mission_report),
    }
}

fn file_node(entry: FileEntry) -> FileNode {
    match entry.kind {
        EntryKind::File => FileNode::file(entry.name),
        EntryKind::Folder => FileNode::folder(
            entry.name,
            entry
                .children
                .unwrap_or_default()
                .into_iter()
                .map(file_node)
                .collect(),
        ),
    }
}

fn mission_report(stats: ScanStats) -> MissionReport {
    MissionReport {
        scanned: stats.scanned,
        ignored: stats.ignored,
        issues: stats.issues,
    }
}

fn proposed_change(entry: ProposedChangeEntry) -> ProposedChange {
    let status = match entry.status.to_ascii_uppercase().as_str() {
        "STAGED" => ChangeStatus::Staged,
        "ACCEPTED" => ChangeStatus::Accepted,
        _ => ChangeStatus::Modified,
    };
    ProposedChange {
        file_name: entry.file_name,
        original_code: entry.original_code,
        fixed_code: entry.fixed_code,
        status,
    }
}
