//! Chat-turn streaming: wire parsing, fragment reordering, orchestration.
//!
//! ```text
//! SSE bytes ──▶ RecordSplitter ──▶ StreamEvent ──┬─▶ transcripts ──▶ StreamHandler
//!                                                └─▶ audio ──▶ SequenceBuffer ──▶ decode ──▶ PlayerHandle
//! ```

pub mod orchestrator;
pub mod sequence;
pub mod sse;

pub use orchestrator::{
    StreamConfig, StreamHandler, StreamOrchestrator, StreamOutcome, StreamState,
};
pub use sequence::SequenceBuffer;
pub use sse::{RecordSplitter, StreamEvent};
