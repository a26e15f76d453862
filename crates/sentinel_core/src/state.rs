use crate::language::{classify, Classification};
use crate::naming::suggest_file_name;
use crate::view_model::{AppViewModel, EditorView, ReviewView, VISIBLE_LOG_LINES};

/// File name the editor starts with before any rename.
pub const DEMO_FILE_NAME: &str = "DemoPage.tsx";

/// Seed content of the editor pane.
pub const DEMO_EDITOR_CODE: &str = r#"import React from 'react';
import { motion } from 'framer-motion';

export default function WaitlistPage() {
  return (
    <main className="min-h-screen bg-black text-white flex flex-col items-center justify-center relative overflow-hidden">
      {/* Gradient Background */}
      <div className="absolute inset-0 bg-gradient-to-b from-blue-900/20 to-black z-0" />

      <div className="z-10 text-center max-w-2xl px-4">
        <motion.h1
          initial={{ opacity: 0, y: 20 }}
          animate={{ opacity: 1, y: 0 }}
          className="text-6xl font-bold tracking-tighter mb-6 bg-clip-text text-transparent bg-gradient-to-r from-blue-400 to-emerald-400"
        >
          Join the Revolution
        </motion.h1>
      </div>
    </main>
  );
}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentStatus {
    #[default]
    Idle,
    Thinking,
    Success,
    Error,
}

impl AgentStatus {
    pub fn label(self) -> &'static str {
        match self {
            AgentStatus::Idle => "IDLE",
            AgentStatus::Thinking => "THINKING",
            AgentStatus::Success => "SUCCESS",
            AgentStatus::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub name: String,
    pub kind: FileKind,
    pub children: Vec<FileNode>,
}

impl FileNode {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FileKind::File,
            children: Vec::new(),
        }
    }

    pub fn folder(name: impl Into<String>, children: Vec<FileNode>) -> Self {
        Self {
            name: name.into(),
            kind: FileKind::Folder,
            children,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MissionReport {
    pub scanned: u64,
    pub ignored: u64,
    pub issues: u64,
}

/// Result of a project scan as reported by the agent service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanSummary {
    pub tree: Vec<FileNode>,
    pub stats: Option<MissionReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Modified,
    Staged,
    Accepted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedChange {
    pub file_name: String,
    pub original_code: String,
    pub fixed_code: String,
    pub status: ChangeStatus,
}

/// Name and display metadata of the file shown in the editor tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorFile {
    pub name: String,
    pub classification: Classification,
    /// Set for one tick after a rename so the tab can highlight.
    pub flash: bool,
}

impl Default for EditorFile {
    fn default() -> Self {
        Self {
            name: DEMO_FILE_NAME.to_string(),
            classification: Classification::fallback(),
            flash: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    sidebar_open: bool,
    files: Vec<FileNode>,
    scanning: bool,
    agent_status: AgentStatus,
    logs: Vec<String>,
    log_epoch: u64,
    mission_report: Option<MissionReport>,
    current_code: String,
    editor_code: String,
    editor_file: EditorFile,
    global_instruction: String,
    proposed_changes: Vec<ProposedChange>,
    active_review: Option<String>,
    screenshot: Option<String>,
    saving: bool,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            files: Vec::new(),
            scanning: false,
            agent_status: AgentStatus::Idle,
            logs: Vec::new(),
            log_epoch: 0,
            mission_report: None,
            current_code: String::new(),
            editor_code: DEMO_EDITOR_CODE.to_string(),
            editor_file: EditorFile::default(),
            global_instruction: String::new(),
            proposed_changes: Vec::new(),
            active_review: None,
            screenshot: None,
            saving: false,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let skip = self.logs.len().saturating_sub(VISIBLE_LOG_LINES);
        AppViewModel {
            sidebar_open: self.sidebar_open,
            agent_status: self.agent_status,
            scanning: self.scanning,
            visible_logs: self.logs[skip..].to_vec(),
            log_count: self.logs.len(),
            log_epoch: self.log_epoch,
            files: self.files.clone(),
            mission_report: self.mission_report,
            editor: EditorView {
                file_name: self.editor_file.name.clone(),
                icon: self.editor_file.classification.icon,
                language: self.editor_file.classification.language,
                flash: self.editor_file.flash,
                code: self.editor_code.clone(),
            },
            global_instruction: self.global_instruction.clone(),
            can_fix_project: self.can_fix_project(),
            pending_changes: self
                .proposed_changes
                .iter()
                .map(|change| change.file_name.clone())
                .collect(),
            review: self.active_change().map(|change| ReviewView {
                file_name: change.file_name.clone(),
                original_code: change.original_code.clone(),
                fixed_code: change.fixed_code.clone(),
            }),
            has_screenshot: self.screenshot.is_some(),
            saving: self.saving,
            dirty: self.dirty,
        }
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn agent_status(&self) -> AgentStatus {
        self.agent_status
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn editor_code(&self) -> &str {
        &self.editor_code
    }

    pub fn current_code(&self) -> &str {
        &self.current_code
    }

    pub fn editor_file(&self) -> &EditorFile {
        &self.editor_file
    }

    pub fn screenshot(&self) -> Option<&str> {
        self.screenshot.as_deref()
    }

    pub fn global_instruction(&self) -> &str {
        &self.global_instruction
    }

    pub fn proposed_changes(&self) -> &[ProposedChange] {
        &self.proposed_changes
    }

    pub fn active_change(&self) -> Option<&ProposedChange> {
        let name = self.active_review.as_deref()?;
        self.proposed_changes
            .iter()
            .find(|change| change.file_name == name)
    }

    pub fn is_review_mode(&self) -> bool {
        self.active_review.is_some()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn can_fix_project(&self) -> bool {
        !self.global_instruction.trim().is_empty() && !self.scanning
    }

    pub(crate) fn push_log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
        self.mark_dirty();
    }

    pub(crate) fn clear_logs(&mut self) {
        self.logs.clear();
        self.log_epoch += 1;
        self.mark_dirty();
    }

    pub(crate) fn set_status(&mut self, status: AgentStatus) {
        if self.agent_status != status {
            self.agent_status = status;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_scanning(&mut self, scanning: bool) {
        if self.scanning != scanning {
            self.scanning = scanning;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_saving(&mut self, saving: bool) {
        if self.saving != saving {
            self.saving = saving;
            self.mark_dirty();
        }
    }

    pub(crate) fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
        self.mark_dirty();
    }

    pub(crate) fn set_files(&mut self, files: Vec<FileNode>) {
        self.files = files;
        self.mark_dirty();
    }

    pub(crate) fn set_mission_report(&mut self, report: Option<MissionReport>) {
        self.mission_report = report;
        self.mark_dirty();
    }

    pub(crate) fn set_instruction(&mut self, instruction: String) {
        self.global_instruction = instruction;
        self.mark_dirty();
    }

    pub(crate) fn set_screenshot(&mut self, screenshot: Option<String>) {
        self.screenshot = screenshot;
        self.mark_dirty();
    }

    pub(crate) fn set_proposed_changes(&mut self, changes: Vec<ProposedChange>) {
        self.proposed_changes = changes;
        self.mark_dirty();
    }

    pub(crate) fn open_review(&mut self, file_name: &str) -> bool {
        if !self
            .proposed_changes
            .iter()
            .any(|change| change.file_name == file_name)
        {
            return false;
        }
        self.active_review = Some(file_name.to_string());
        self.mark_dirty();
        true
    }

    /// Removes the change under review and leaves review mode.
    pub(crate) fn close_review(&mut self) -> Option<ProposedChange> {
        let name = self.active_review.take()?;
        self.mark_dirty();
        let index = self
            .proposed_changes
            .iter()
            .position(|change| change.file_name == name)?;
        Some(self.proposed_changes.remove(index))
    }

    /// Replaces the editor content and re-derives the tab's file name.
    pub(crate) fn set_editor_code(&mut self, code: String) {
        let classification = classify(&code);
        let next_name = suggest_file_name(&self.editor_file.name, classification.extension);
        if next_name != self.editor_file.name {
            self.editor_file = EditorFile {
                name: next_name,
                classification,
                flash: true,
            };
        }
        self.editor_code = code;
        self.mark_dirty();
    }

    pub(crate) fn set_current_code(&mut self, code: String) {
        self.current_code = code;
    }

    /// Clears the one-tick rename highlight. Returns whether anything changed.
    pub(crate) fn settle_flash(&mut self) -> bool {
        if self.editor_file.flash {
            self.editor_file.flash = false;
            self.mark_dirty();
            true
        } else {
            false
        }
    }
}
