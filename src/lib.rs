//! voxplay - Sequenced real-time audio playback for streaming voice chat
//!
//! Consumes a server-sent-event stream of base64 PCM16 audio fragments and
//! renders gapless audio even when fragments arrive late, out of order, or
//! in bursts. Transcript text flows to caller callbacks without buffering.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod config;
pub mod error;
pub mod playback;
pub mod stream;

// Core pipeline (network → reorder → decode → render)
pub use stream::orchestrator::{
    StreamConfig, StreamHandler, StreamOrchestrator, StreamOutcome, StreamState,
};
pub use stream::sequence::SequenceBuffer;
pub use stream::sse::{RecordSplitter, StreamEvent};

// Playback (render context)
pub use playback::engine::{EngineConfig, EngineHandle, PlaybackEngine, PlayerHandle};
pub use playback::sink::{AudioSink, CollectorSink, NullSink, WavSink};
pub use playback::{PlayerCommand, PlayerEvent};

#[cfg(feature = "cpal-audio")]
pub use playback::cpal_out::CpalPlayer;

// Audio data handling
pub use audio::decode::{decode_base64_pcm16, encode_base64_pcm16};
pub use audio::ring_buffer::SampleRing;
pub use audio::wav::WavInput;

// Error handling
pub use error::{Result, VoxplayError};

// Config
pub use config::Config;
