//! Sentinel engine: typewriter reveals, timers and calls to the agent service.
mod api;
mod engine;
mod typewriter;
mod types;

pub use api::{AgentApi, ApiSettings, ReqwestAgentApi, DEFAULT_BASE_URL};
pub use engine::{ChannelRevealSink, EngineHandle};
pub use typewriter::{
    RevealFrame, RevealHandle, RevealSink, Typewriter, TypewriterSettings, DEFAULT_CHAR_DELAY,
    DEFAULT_JITTER,
};
pub use types::{
    AnalyzeRequest, AnalyzeResponse, ApiError, EngineEvent, EntryKind, FailureKind, FileEntry,
    FixProjectResponse, ProposedChangeEntry, SaveResponse, ScanResponse, ScanStats, TimerId,
};
