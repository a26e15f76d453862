//! Terminal rendering of the dashboard view model.
//!
//! The renderer remembers the last view it drew and only prints what changed:
//! new log lines, status transitions, the editor tab, the file tree and so on.
//! Typewriter frames are printed incrementally as they arrive.

use std::io::{self, Write};

use chrono::Local;
use colored::Colorize;
use sentinel_core::{AgentStatus, AppViewModel, FileKind, FileNode, MissionReport, ReviewView};
use sentinel_engine::RevealFrame;
use similar::{ChangeTag, TextDiff};

pub struct Renderer<W: Write> {
    out: W,
    last: Option<AppViewModel>,
    reveal_generation: u64,
    reveal_printed: usize,
}

impl Renderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: None,
            reveal_generation: 0,
            reveal_printed: 0,
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        let last = self.last.take();

        if last.as_ref().map(|prev| prev.agent_status) != Some(view.agent_status) {
            writeln!(self.out, "{} {}", "status:".dimmed(), status_label(view.agent_status))?;
        }
        if last.as_ref().is_some_and(|prev| prev.scanning != view.scanning) {
            let line = if view.scanning {
                "scanning..."
            } else {
                "scan overlay closed"
            };
            writeln!(self.out, "{}", line.dimmed())?;
        }

        self.render_logs(last.as_ref(), view)?;

        let tab_changed = last.as_ref().map_or(true, |prev| {
            prev.editor.file_name != view.editor.file_name || prev.editor.icon != view.editor.icon
        });
        if tab_changed {
            let marker = if view.editor.flash { " *" } else { "" };
            writeln!(
                self.out,
                "{} {} ({}){}",
                view.editor.icon,
                view.editor.file_name.bold(),
                view.editor.language,
                marker.yellow()
            )?;
        }

        let sidebar_changed = last
            .as_ref()
            .is_some_and(|prev| prev.sidebar_open != view.sidebar_open);
        if sidebar_changed && !view.sidebar_open {
            writeln!(self.out, "{}", "sidebar hidden".dimmed())?;
        }
        let files_changed = last.as_ref().map_or(true, |prev| prev.files != view.files);
        if view.sidebar_open && (files_changed || sidebar_changed) && !view.files.is_empty() {
            write_tree(&mut self.out, &view.files, 0)?;
        }

        if let Some(report) = view.mission_report {
            if last.as_ref().and_then(|prev| prev.mission_report) != Some(report) {
                write_mission_report(&mut self.out, &report)?;
            }
        }

        let changes_changed = last
            .as_ref()
            .map_or(true, |prev| prev.pending_changes != view.pending_changes);
        if changes_changed && !view.pending_changes.is_empty() {
            writeln!(
                self.out,
                "{} {}",
                "pending changes:".bold(),
                view.pending_changes.join(", ")
            )?;
        }

        let review_opened = view.review.is_some()
            && last.as_ref().map_or(true, |prev| prev.review != view.review);
        if let Some(review) = view.review.as_ref().filter(|_| review_opened) {
            write_review(&mut self.out, review)?;
            writeln!(self.out, "{}", "accept or reject?".dimmed())?;
        }

        self.last = Some(view.clone());
        self.out.flush()
    }

    fn render_logs(&mut self, last: Option<&AppViewModel>, view: &AppViewModel) -> io::Result<()> {
        let fresh = match last {
            Some(prev) if prev.log_epoch == view.log_epoch => {
                view.log_count.saturating_sub(prev.log_count)
            }
            // First draw or the log was cleared since: show everything visible.
            _ => view.log_count,
        };
        let start = view.visible_logs.len().saturating_sub(fresh);
        let stamp = Local::now().format("%H:%M:%S");
        for line in &view.visible_logs[start..] {
            writeln!(self.out, "{} {}", format!("[{stamp}]").dimmed(), line)?;
        }
        Ok(())
    }

    /// Print the part of `frame` not yet shown.
    pub fn reveal(&mut self, frame: &RevealFrame) -> io::Result<()> {
        if frame.generation != self.reveal_generation {
            if self.reveal_printed > 0 {
                writeln!(self.out)?;
            }
            self.reveal_generation = frame.generation;
            self.reveal_printed = 0;
        }
        if frame.revealed_len > self.reveal_printed {
            let fresh: String = frame
                .revealed
                .chars()
                .skip(self.reveal_printed)
                .collect();
            write!(self.out, "{fresh}")?;
            self.reveal_printed = frame.revealed_len;
        }
        if frame.is_complete {
            writeln!(self.out)?;
            self.reveal_printed = 0;
        }
        self.out.flush()
    }

    pub fn review(&mut self, review: &ReviewView) -> io::Result<()> {
        write_review(&mut self.out, review)?;
        self.out.flush()
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

fn status_label(status: AgentStatus) -> colored::ColoredString {
    let label = status.label();
    match status {
        AgentStatus::Idle => label.normal(),
        AgentStatus::Thinking => label.cyan(),
        AgentStatus::Success => label.green(),
        AgentStatus::Error => label.red().bold(),
    }
}

fn write_tree<W: Write>(out: &mut W, nodes: &[FileNode], depth: usize) -> io::Result<()> {
    for node in nodes {
        let indent = "  ".repeat(depth);
        match node.kind {
            FileKind::Folder => {
                writeln!(out, "{indent}{}/", node.name.blue())?;
                write_tree(out, &node.children, depth + 1)?;
            }
            FileKind::File => writeln!(out, "{indent}{}", node.name)?,
        }
    }
    Ok(())
}

fn write_mission_report<W: Write>(out: &mut W, report: &MissionReport) -> io::Result<()> {
    writeln!(out, "{}", "== mission report ==".bold())?;
    writeln!(out, "  files scanned:        {}", report.scanned)?;
    writeln!(out, "  directories ignored:  {}", report.ignored)?;
    writeln!(out, "  issues found:         {}", report.issues)
}

fn write_review<W: Write>(out: &mut W, review: &ReviewView) -> io::Result<()> {
    writeln!(out, "{} {}", "review:".bold(), review.file_name)?;
    let diff = TextDiff::from_lines(review.original_code.as_str(), review.fixed_code.as_str());
    for change in diff.iter_all_changes() {
        let line = change.value().trim_end_matches('\n');
        match change.tag() {
            ChangeTag::Delete => writeln!(out, "{}", format!("- {line}").red())?,
            ChangeTag::Insert => writeln!(out, "{}", format!("+ {line}").green())?,
            ChangeTag::Equal => writeln!(out, "  {line}")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sentinel_core::{update, AppState, ChangeStatus, FileNode, Msg, ProposedChange, ScanSummary};
    use sentinel_engine::RevealFrame;

    use super::Renderer;

    fn rendered(renderer: Renderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    fn plain() {
        colored::control::set_override(false);
    }

    fn frame(generation: u64, revealed: &str, total_len: usize) -> RevealFrame {
        let revealed_len = revealed.chars().count();
        RevealFrame {
            generation,
            revealed: revealed.to_string(),
            revealed_len,
            total_len,
            is_typing: revealed_len < total_len,
            is_complete: revealed_len == total_len,
        }
    }

    #[test]
    fn reveal_prints_only_new_chars() {
        plain();
        let mut renderer = Renderer::new(Vec::new());
        for revealed in ["", "h", "hé", "hél"] {
            renderer.reveal(&frame(1, revealed, 3)).unwrap();
        }
        assert_eq!(rendered(renderer), "hél\n");
    }

    #[test]
    fn new_generation_starts_a_new_line() {
        plain();
        let mut renderer = Renderer::new(Vec::new());
        renderer.reveal(&frame(1, "ab", 5)).unwrap();
        renderer.reveal(&frame(2, "", 2)).unwrap();
        renderer.reveal(&frame(2, "xy", 2)).unwrap();
        assert_eq!(rendered(renderer), "ab\nxy\n");
    }

    #[test]
    fn first_render_shows_status_and_tab() {
        plain();
        let mut renderer = Renderer::new(Vec::new());
        renderer.render(&AppState::default().view()).unwrap();
        let out = rendered(renderer);
        assert!(out.contains("status: IDLE"), "{out}");
        assert!(out.contains("DemoPage.tsx (typescript)"), "{out}");
    }

    #[test]
    fn only_new_log_lines_are_printed() {
        plain();
        let mut renderer = Renderer::new(Vec::new());
        let (state, _) = update(AppState::default(), Msg::ScanRequested { path: ".".into() });
        renderer.render(&state.view()).unwrap();
        let (state, _) = update(
            state,
            Msg::ScanCompleted(ScanSummary {
                tree: vec![FileNode::file("main.py")],
                stats: None,
            }),
        );
        renderer.render(&state.view()).unwrap();

        let out = rendered(renderer);
        assert_eq!(out.matches("Initializing Project Scanner...").count(), 1);
        assert!(out.contains("Project Context Loaded."));
        assert!(out.contains("main.py"));
    }

    #[test]
    fn cleared_log_is_reprinted_even_when_longer() {
        plain();
        let mut renderer = Renderer::new(Vec::new());
        let (state, _) = update(
            AppState::default(),
            Msg::ScreenshotAttached("data:image/png;base64,YWJj".into()),
        );
        renderer.render(&state.view()).unwrap();
        let (state, _) = update(state, Msg::ScanRequested { path: ".".into() });
        renderer.render(&state.view()).unwrap();

        let out = rendered(renderer);
        for line in state.view().visible_logs {
            assert!(out.contains(&line), "missing {line:?} in {out}");
        }
        assert!(out.contains("Initializing Project Scanner..."), "{out}");
    }

    #[test]
    fn review_shows_a_line_diff() {
        plain();
        let mut renderer = Renderer::new(Vec::new());
        let (state, _) = update(
            AppState::default(),
            Msg::BatchFixCompleted(vec![ProposedChange {
                file_name: "app.py".to_string(),
                original_code: "a = 1\nb = 2\n".to_string(),
                fixed_code: "a = 1\nb = 3\n".to_string(),
                status: ChangeStatus::Modified,
            }]),
        );
        let (state, _) = update(
            state,
            Msg::ReviewOpened {
                file_name: "app.py".to_string(),
            },
        );
        renderer.render(&state.view()).unwrap();

        let out = rendered(renderer);
        assert!(out.contains("review: app.py"), "{out}");
        assert!(out.contains("  a = 1"));
        assert!(out.contains("- b = 2"));
        assert!(out.contains("+ b = 3"));
    }
}
