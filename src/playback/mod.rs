//! Real-time playback: the render-context processor, the engine hosting it,
//! and output sinks.
//!
//! ```text
//! ┌──────────────┐  commands (channel)  ┌───────────────────┐
//! │ Orchestrator │─────────────────────▶│ PlaybackProcessor │──▶ AudioSink
//! │ PlayerHandle │◀─────────────────────│  (render thread)  │
//! └──────────────┘   events (channel)   └───────────────────┘
//! ```
//!
//! The two sides share no mutable state. Commands flow in, `Ended` flows
//! out, and the render side never blocks on the orchestration side.

pub mod engine;
pub mod processor;
pub mod sink;

#[cfg(feature = "cpal-audio")]
pub mod cpal_out;

pub use engine::{EngineConfig, EngineHandle, PlaybackEngine, PlayerHandle};
pub use processor::{PlaybackProcessor, PlaybackState, RENDER_QUANTUM};
pub use sink::{AudioSink, CollectorSink, NullSink, WavSink};

#[cfg(feature = "cpal-audio")]
pub use cpal_out::CpalPlayer;

/// Control messages sent into the render context.
#[derive(Debug, Clone)]
pub enum PlayerCommand {
    /// Append decoded samples and start (or keep) playing.
    Audio { samples: Vec<f32> },
    /// Stop and discard all buffered audio without an `Ended` event.
    Clear,
    /// No more audio will arrive; emit `Ended` once the buffer drains.
    StreamComplete,
    /// Hard stop: the render context terminates.
    Stop,
}

/// Notifications emitted by the render context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// All buffered audio of a completed stream has been rendered.
    Ended,
}
