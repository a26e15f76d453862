use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use sentinel_logging::{sentinel_debug, sentinel_info};
use tokio::runtime::Runtime;

use crate::api::AgentApi;
use crate::typewriter::{RevealFrame, RevealHandle, RevealSink, Typewriter, TypewriterSettings};
use crate::{AnalyzeRequest, EngineEvent, TimerId};

enum EngineCommand {
    Reveal { text: String },
    CancelReveal,
    Scan { path: String },
    FixProject { folder_path: String, instruction: String },
    Analyze(AnalyzeRequest),
    Save { path: String, content: String, auto: bool },
    Timer { id: TimerId, delay: Duration },
    Shutdown,
}

/// Forwards every reveal frame onto the engine's event channel.
pub struct ChannelRevealSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelRevealSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl RevealSink for ChannelRevealSink {
    fn emit(&self, frame: &RevealFrame) {
        let _ = self.tx.send(EngineEvent::Reveal(frame.clone()));
    }
}

/// Runs async work on a background runtime; results come back as
/// [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(api: Arc<dyn AgentApi>, settings: TypewriterSettings) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .enable_io()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("sentinel-engine".to_string())
            .spawn(move || run_worker(runtime, api, settings, cmd_rx, event_tx))?;

        Ok(Self {
            cmd_tx,
            event_rx,
            worker: Some(worker),
        })
    }

    /// Typewriter-reveal `text`, replacing any reveal in progress.
    pub fn reveal(&self, text: impl Into<String>) {
        self.send(EngineCommand::Reveal { text: text.into() });
    }

    pub fn cancel_reveal(&self) {
        self.send(EngineCommand::CancelReveal);
    }

    pub fn scan(&self, path: impl Into<String>) {
        self.send(EngineCommand::Scan { path: path.into() });
    }

    pub fn fix_project(&self, folder_path: impl Into<String>, instruction: impl Into<String>) {
        self.send(EngineCommand::FixProject {
            folder_path: folder_path.into(),
            instruction: instruction.into(),
        });
    }

    pub fn analyze(&self, request: AnalyzeRequest) {
        self.send(EngineCommand::Analyze(request));
    }

    pub fn save(&self, path: impl Into<String>, content: impl Into<String>, auto: bool) {
        self.send(EngineCommand::Save {
            path: path.into(),
            content: content.into(),
            auto,
        });
    }

    /// Emit [`EngineEvent::TimerElapsed`] with `id` after `delay`.
    pub fn start_timer(&self, id: TimerId, delay: Duration) {
        self.send(EngineCommand::Timer { id, delay });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Cancel the reveal, drop pending work and join the worker thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    fn stop(&mut self) {
        self.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(
    runtime: Runtime,
    api: Arc<dyn AgentApi>,
    settings: TypewriterSettings,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let typewriter = Typewriter::new(settings)
        .with_sink(Arc::new(ChannelRevealSink::new(event_tx.clone())));
    let mut reveal: Option<RevealHandle> = None;

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Reveal { text } => match reveal.as_mut() {
                Some(handle) => handle.restart(text),
                None => reveal = Some(typewriter.start_on(runtime.handle(), text)),
            },
            EngineCommand::CancelReveal => {
                if let Some(handle) = reveal.as_mut() {
                    handle.cancel();
                }
            }
            EngineCommand::Shutdown => break,
            other => {
                let api = api.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), other, event_tx).await;
                });
            }
        }
    }

    // Cancel the reveal before the runtime goes away.
    drop(reveal);
    runtime.shutdown_background();
    sentinel_debug!("Engine worker stopped");
}

async fn handle_command(
    api: &dyn AgentApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Scan { path } => {
            sentinel_info!("Scanning project at {}", path);
            EngineEvent::ScanFinished(api.scan_project(&path).await)
        }
        EngineCommand::FixProject {
            folder_path,
            instruction,
        } => {
            sentinel_info!("Requesting batch fix for {}", folder_path);
            EngineEvent::FixFinished(api.fix_project(&folder_path, &instruction).await)
        }
        EngineCommand::Analyze(request) => {
            sentinel_info!(
                "Analyzing {} ({} bytes, image={})",
                request.file_name,
                request.code.len(),
                request.image.is_some()
            );
            EngineEvent::AnalyzeFinished(api.analyze(&request).await)
        }
        EngineCommand::Save {
            path,
            content,
            auto,
        } => {
            sentinel_info!("Saving {} ({} bytes, auto={})", path, content.len(), auto);
            let result = api.save_file(&path, &content).await;
            EngineEvent::SaveFinished { path, auto, result }
        }
        EngineCommand::Timer { id, delay } => {
            tokio::time::sleep(delay).await;
            EngineEvent::TimerElapsed(id)
        }
        EngineCommand::Reveal { .. } | EngineCommand::CancelReveal | EngineCommand::Shutdown => {
            return;
        }
    };
    let _ = event_tx.send(event);
}
