//! Character-by-character text reveal.
//!
//! A reveal runs as one tokio task per [`RevealHandle`]. Frames are published
//! through a `watch` channel and, optionally, pushed to a [`RevealSink`].
//! Every frame carries the generation of the reveal that produced it; a
//! restart bumps the generation so a tick from the superseded task can never
//! publish again.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use sentinel_logging::{sentinel_debug, sentinel_trace};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Nominal per-character delay when none is configured.
pub const DEFAULT_CHAR_DELAY: Duration = Duration::from_millis(20);
/// Maximum deviation applied to each per-character delay.
pub const DEFAULT_JITTER: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypewriterSettings {
    /// Zero means the whole text appears in a single step.
    pub per_char_delay: Duration,
    pub initial_delay: Duration,
    pub jitter: Duration,
}

impl Default for TypewriterSettings {
    fn default() -> Self {
        Self {
            per_char_delay: DEFAULT_CHAR_DELAY,
            initial_delay: Duration::ZERO,
            jitter: DEFAULT_JITTER,
        }
    }
}

impl TypewriterSettings {
    /// Build settings from signed millisecond values; negatives clamp to zero.
    pub fn from_millis(per_char_ms: i64, initial_ms: i64) -> Self {
        Self {
            per_char_delay: clamped_millis(per_char_ms),
            initial_delay: clamped_millis(initial_ms),
            ..Self::default()
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Settings that reveal the whole text at once.
    pub fn instant() -> Self {
        Self {
            per_char_delay: Duration::ZERO,
            initial_delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }
}

fn clamped_millis(ms: i64) -> Duration {
    Duration::from_millis(ms.max(0).unsigned_abs())
}

/// Snapshot of a reveal, as published after every step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RevealFrame {
    pub generation: u64,
    pub revealed: String,
    /// Revealed length in chars.
    pub revealed_len: usize,
    /// Full length in chars.
    pub total_len: usize,
    pub is_typing: bool,
    pub is_complete: bool,
}

impl RevealFrame {
    fn pending(generation: u64, total_len: usize) -> Self {
        Self {
            generation,
            total_len,
            ..Self::default()
        }
    }
}

/// Push-style observer of reveal frames. Called for every published frame,
/// in order, while the frame is being published.
pub trait RevealSink: Send + Sync {
    fn emit(&self, frame: &RevealFrame);
}

/// Factory for reveals sharing the same settings and sink.
#[derive(Clone)]
pub struct Typewriter {
    settings: TypewriterSettings,
    sink: Option<Arc<dyn RevealSink>>,
}

impl Typewriter {
    pub fn new(settings: TypewriterSettings) -> Self {
        Self {
            settings,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn RevealSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn settings(&self) -> TypewriterSettings {
        self.settings
    }

    /// Start revealing `text` on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime; use [`Typewriter::start_on`]
    /// from plain threads.
    pub fn start(&self, text: impl Into<String>) -> RevealHandle {
        self.start_on(&Handle::current(), text)
    }

    /// Start revealing `text` on the given runtime.
    pub fn start_on(&self, runtime: &Handle, text: impl Into<String>) -> RevealHandle {
        let (frames, _) = watch::channel(RevealFrame::default());
        let mut handle = RevealHandle {
            settings: self.settings,
            publisher: Arc::new(Publisher {
                frames,
                sink: self.sink.clone(),
            }),
            runtime: runtime.clone(),
            generation: 0,
            text: String::new(),
            active: None,
        };
        handle.restart(text);
        handle
    }
}

struct Publisher {
    frames: watch::Sender<RevealFrame>,
    sink: Option<Arc<dyn RevealSink>>,
}

impl Publisher {
    /// Starts a new generation unconditionally.
    fn reset(&self, frame: RevealFrame) {
        self.frames.send_modify(|current| {
            *current = frame;
            if let Some(sink) = &self.sink {
                sink.emit(current);
            }
        });
    }

    /// Applies `step` only if `generation` is still current and not cancelled.
    fn publish(
        &self,
        generation: u64,
        cancel: &CancellationToken,
        step: impl FnOnce(&mut RevealFrame),
    ) -> bool {
        self.frames.send_if_modified(|current| {
            if current.generation != generation || cancel.is_cancelled() {
                return false;
            }
            step(current);
            if let Some(sink) = &self.sink {
                sink.emit(current);
            }
            true
        })
    }

    /// Waits out any publish that is in flight on another thread.
    fn barrier(&self) {
        self.frames.send_if_modified(|_| false);
    }
}

struct ActiveReveal {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owner of a running reveal. Dropping it cancels the reveal.
pub struct RevealHandle {
    settings: TypewriterSettings,
    publisher: Arc<Publisher>,
    runtime: Handle,
    generation: u64,
    text: String,
    active: Option<ActiveReveal>,
}

impl RevealHandle {
    /// Discard the current reveal and start over with `text`, including the
    /// initial delay. No diffing is attempted, even for identical text.
    pub fn restart(&mut self, text: impl Into<String>) {
        self.stop_active();
        self.generation += 1;
        self.text = text.into();

        let total_len = self.text.chars().count();
        self.publisher
            .reset(RevealFrame::pending(self.generation, total_len));

        let cancel = CancellationToken::new();
        let task = self.runtime.spawn(run_reveal(
            self.text.clone(),
            self.generation,
            self.settings,
            self.publisher.clone(),
            cancel.clone(),
        ));
        sentinel_debug!(
            "Reveal generation {} started ({} chars)",
            self.generation,
            total_len
        );
        self.active = Some(ActiveReveal { cancel, task });
    }

    /// Restart only if `text` differs from the text being revealed.
    /// Returns whether a restart happened.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.restart(text);
        true
    }

    /// Stop the reveal. No further frame is published after this returns.
    pub fn cancel(&mut self) {
        if self.stop_active() {
            sentinel_debug!("Reveal generation {} cancelled", self.generation);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RevealFrame> {
        self.publisher.frames.subscribe()
    }

    pub fn snapshot(&self) -> RevealFrame {
        self.publisher.frames.borrow().clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether a reveal task is still scheduled.
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.task.is_finished())
    }

    /// Resolves with the completed frame of the current generation, or `None`
    /// if the reveal was cancelled before finishing.
    pub async fn wait_complete(&self) -> Option<RevealFrame> {
        let mut frames = self.subscribe();
        loop {
            {
                let frame = frames.borrow_and_update();
                if frame.generation != self.generation {
                    return None;
                }
                if frame.is_complete {
                    return Some(frame.clone());
                }
            }
            if self
                .active
                .as_ref()
                .map_or(true, |active| active.cancel.is_cancelled())
            {
                return None;
            }
            if frames.changed().await.is_err() {
                return None;
            }
        }
    }

    fn stop_active(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.cancel.cancel();
        active.task.abort();
        self.publisher.barrier();
        true
    }
}

impl Drop for RevealHandle {
    fn drop(&mut self) {
        self.stop_active();
    }
}

async fn run_reveal(
    text: String,
    generation: u64,
    settings: TypewriterSettings,
    publisher: Arc<Publisher>,
    cancel: CancellationToken,
) {
    if !pause(settings.initial_delay, &cancel).await {
        return;
    }

    let total_len = text.chars().count();
    if total_len == 0 || settings.per_char_delay.is_zero() {
        publisher.publish(generation, &cancel, |frame| {
            frame.revealed.clone_from(&text);
            frame.revealed_len = total_len;
            frame.is_typing = false;
            frame.is_complete = true;
        });
        sentinel_debug!("Reveal generation {} completed in one step", generation);
        return;
    }

    let boundaries = text.char_indices().map(|(start, ch)| start + ch.len_utf8());
    for (index, end) in boundaries.enumerate() {
        let revealed_len = index + 1;
        let done = revealed_len == total_len;
        let published = publisher.publish(generation, &cancel, |frame| {
            frame.revealed.clear();
            frame.revealed.push_str(&text[..end]);
            frame.revealed_len = revealed_len;
            frame.is_typing = !done;
            frame.is_complete = done;
        });
        if !published {
            return;
        }
        if done {
            break;
        }
        if !pause(jittered_delay(&settings), &cancel).await {
            return;
        }
        sentinel_trace!("Reveal generation {} at {}/{}", generation, revealed_len, total_len);
    }
    sentinel_debug!("Reveal generation {} completed", generation);
}

/// Sleeps for `delay` unless cancelled first. Returns false on cancellation.
async fn pause(delay: Duration, cancel: &CancellationToken) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

fn jittered_delay(settings: &TypewriterSettings) -> Duration {
    let nominal = settings.per_char_delay.as_micros() as i64;
    let spread = settings.jitter.as_micros() as i64;
    let offset = if spread == 0 {
        0
    } else {
        rand::thread_rng().gen_range(-spread..=spread)
    };
    Duration::from_micros((nominal + offset).max(0).unsigned_abs())
}
