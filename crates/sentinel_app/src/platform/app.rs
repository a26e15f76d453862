use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use sentinel_core::{classify, suggest_file_name, update, AppState, Msg, ReviewView, DEMO_FILE_NAME};
use sentinel_logging::{sentinel_debug, sentinel_warn};

use super::config::AppConfig;
use super::effects::{EffectRunner, Incoming};
use super::input::{parse_command, screenshot_data_url, Command, HELP};
use super::render::Renderer;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const TICK_INTERVAL: Duration = Duration::from_millis(75);
/// Upper bound for a one-shot command to settle.
const SETTLE_LIMIT: Duration = Duration::from_secs(180);

/// One dashboard session: reducer state, effect runner and renderer.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer<io::Stdout>,
}

impl Session {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            state: AppState::default(),
            runner: EffectRunner::new(config)?,
            renderer: Renderer::stdout(),
        })
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            if let Err(err) = self.renderer.render(&state.view()) {
                sentinel_warn!("Render failed: {}", err);
            }
        }
        self.state = state;
        self.runner.enqueue(effects);
    }

    /// Handle at most one engine event, waiting up to `timeout`.
    fn pump(&mut self, timeout: Duration) {
        match self.runner.poll(timeout) {
            Some(Incoming::Msg(msg)) => self.dispatch(msg),
            Some(Incoming::Reveal(frame)) => {
                if let Err(err) = self.renderer.reveal(&frame) {
                    sentinel_warn!("Render failed: {}", err);
                }
            }
            None => {}
        }
    }

    /// Drive the engine until no call, timer or reveal is outstanding.
    pub fn settle(&mut self) {
        let started = Instant::now();
        let mut last_tick = Instant::now();
        while !self.runner.is_idle() {
            if started.elapsed() > SETTLE_LIMIT {
                sentinel_warn!("Giving up waiting for the agent service");
                break;
            }
            self.pump(POLL_INTERVAL);
            if last_tick.elapsed() >= TICK_INTERVAL {
                self.dispatch(Msg::Tick);
                last_tick = Instant::now();
            }
        }
    }

    pub fn load_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let code =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        self.dispatch(Msg::EditorChanged(code));
        Ok(())
    }

    pub fn attach_screenshot(&mut self, path: &Path) -> anyhow::Result<()> {
        let data = screenshot_data_url(path)
            .with_context(|| format!("failed to read screenshot {}", path.display()))?;
        self.dispatch(Msg::ScreenshotAttached(data));
        Ok(())
    }

    /// Typewriter `text` to the terminal and wait for it to finish.
    pub fn type_out(&mut self, text: String) {
        self.runner.reveal(text);
        self.settle();
    }

    /// Print every proposed change with its diff, leaving them pending.
    pub fn show_changes(&mut self) {
        let reviews: Vec<ReviewView> = self
            .state
            .proposed_changes()
            .iter()
            .map(|change| ReviewView {
                file_name: change.file_name.clone(),
                original_code: change.original_code.clone(),
                fixed_code: change.fixed_code.clone(),
            })
            .collect();
        for review in &reviews {
            if let Err(err) = self.renderer.review(review) {
                sentinel_warn!("Render failed: {}", err);
            }
        }
    }

    pub fn print_editor(&mut self) {
        let code = self.state.editor_code().to_string();
        let _ = self.renderer.line(&code);
    }

    pub fn shutdown(self) {
        self.runner.shutdown();
    }
}

/// Interactive session: commands from stdin, engine events in between.
pub fn run_interactive(config: &AppConfig) -> anyhow::Result<()> {
    let mut session = Session::new(config)?;
    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::spawn(move || forward_lines(io::stdin().lock(), &line_tx));

    session.renderer.render(&session.state.view())?;
    session.renderer.line("type 'help' for commands")?;

    let mut last_tick = Instant::now();
    'session: loop {
        session.pump(POLL_INTERVAL);
        loop {
            match line_rx.try_recv() {
                Ok(line) => {
                    if !session.handle_line(&line) {
                        break 'session;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => break 'session,
            }
        }
        if last_tick.elapsed() >= TICK_INTERVAL {
            session.dispatch(Msg::Tick);
            last_tick = Instant::now();
        }
    }

    sentinel_debug!("Interactive session finished");
    session.shutdown();
    Ok(())
}

/// Send each line of `reader` until it ends, fails or nobody listens.
fn forward_lines(reader: impl BufRead, line_tx: &mpsc::Sender<String>) {
    for line in reader.lines() {
        let Ok(line) = line else { break };
        if line_tx.send(line).is_err() {
            break;
        }
    }
}

impl Session {
    /// Returns false when the session should end.
    fn handle_line(&mut self, line: &str) -> bool {
        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return true,
            Err(message) => {
                let _ = self.renderer.line(&message);
                return true;
            }
        };
        let result = match command {
            Command::Dispatch(msgs) => {
                for msg in msgs {
                    self.dispatch(msg);
                }
                Ok(())
            }
            Command::Load(path) => self.load_file(&path),
            Command::Screenshot(path) => self.attach_screenshot(&path),
            Command::Show => {
                self.print_editor();
                Ok(())
            }
            Command::Help => {
                let _ = self.renderer.line(HELP);
                Ok(())
            }
            Command::Quit => return false,
        };
        if let Err(err) = result {
            let _ = self.renderer.line(&format!("{err:#}"));
        }
        true
    }
}

/// Print the classification of `code` and the name the editor would use.
pub fn detect(code: &str, file_name: Option<&str>) -> String {
    let classification = classify(code);
    let current = file_name.unwrap_or(DEMO_FILE_NAME);
    format!(
        "{} {} .{} -> {}",
        classification.icon,
        classification.language,
        classification.extension,
        suggest_file_name(current, classification.extension)
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use std::io::Cursor;
    use std::sync::mpsc;

    use super::{detect, forward_lines};

    #[test]
    fn stdin_lines_are_forwarded_in_order() {
        let (tx, rx) = mpsc::channel();
        forward_lines(Cursor::new("scan .\nreview\n"), &tx);
        drop(tx);
        assert_eq!(rx.iter().collect::<Vec<_>>(), vec!["scan .", "review"]);
    }

    #[test]
    fn forwarding_stops_when_the_receiver_is_gone() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        forward_lines(Cursor::new("a\nb\n"), &tx);
    }

    #[test]
    fn detect_renames_demo_file_for_python() {
        assert_eq!(
            detect("def main():\n    pass\n", None),
            "🐍 python .py -> script.py"
        );
    }

    #[test]
    fn detect_keeps_matching_names() {
        assert_eq!(
            detect("SELECT * FROM users", Some("report.sql")),
            "🐘 sql .sql -> report.sql"
        );
    }

    #[test]
    fn detect_swaps_extension_of_other_names() {
        assert_eq!(
            detect("{\"a\": 1}", Some("notes.txt")),
            "📋 json .json -> notes.json"
        );
    }
}
