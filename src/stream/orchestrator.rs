//! Stream orchestration: one chat turn from request to completion.
//!
//! Owns the SSE consumption loop. Raw network bytes go through the record
//! splitter, each record is parsed and dispatched: transcripts to the
//! caller's handler, audio through the sequence buffer into the player,
//! `done`/`error` terminate the turn. Runs on the async side; the render
//! context is reached only through the player handle's channel.

use crate::audio::decode::decode_base64_pcm16;
use crate::error::{Result, VoxplayError};
use crate::playback::engine::PlayerHandle;
use crate::stream::sequence::SequenceBuffer;
use crate::stream::sse::{RecordSplitter, StreamEvent};
use futures_util::StreamExt;

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// URL of the chat streaming endpoint.
    pub endpoint: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/api/chat/stream".to_string(),
        }
    }
}

/// Orchestrator lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    AwaitingResponse,
    Streaming,
    Completed,
    Errored,
}

/// Caller callbacks for transcript and terminal events.
///
/// All methods default to no-ops so callers implement only what they need.
pub trait StreamHandler: Send {
    /// Transcription of the caller's own input audio.
    fn on_user_transcript(&mut self, _text: &str) {}

    /// Incremental assistant transcript: the new delta and the running total.
    fn on_transcript(&mut self, _delta: &str, _full: &str) {}

    /// Stream finished; final transcript as reported by the backend.
    fn on_complete(&mut self, _transcript: &str) {}

    /// Stream failed (transport error or an explicit error record).
    fn on_error(&mut self, _message: &str) {}
}

/// Summary of a completed turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamOutcome {
    /// Final assistant transcript.
    pub transcript: String,
    /// Transcription of the caller's input, if the backend sent one.
    pub user_transcript: Option<String>,
    /// Number of audio fragments handed to the player.
    pub fragments: usize,
}

/// Result of dispatching one record: keep going or stop the turn.
enum Dispatch {
    Continue,
    Done,
    Failed(String),
}

/// Drives one chat turn against the streaming endpoint.
pub struct StreamOrchestrator {
    config: StreamConfig,
    client: reqwest::Client,
    player: PlayerHandle,
    state: StreamState,
    sequencer: SequenceBuffer<String>,
    transcript: String,
    user_transcript: Option<String>,
    fragments: usize,
}

impl StreamOrchestrator {
    pub fn new(config: StreamConfig, player: PlayerHandle) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            player,
            state: StreamState::Idle,
            sequencer: SequenceBuffer::new(),
            transcript: String::new(),
            user_transcript: None,
            fragments: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Fragments currently held back waiting for a sequence gap.
    pub fn pending_fragments(&self) -> usize {
        self.sequencer.pending_len()
    }

    /// Sends the recorded input and consumes the response stream.
    ///
    /// `audio_b64` is the fully-buffered input recording as base64 PCM16.
    /// Transport failures and explicit error records surface through both
    /// `handler.on_error` and the returned error; audio already rendered
    /// is never rolled back. Cancellation is the caller dropping the
    /// future.
    pub async fn run(
        &mut self,
        audio_b64: &str,
        handler: &mut dyn StreamHandler,
    ) -> Result<StreamOutcome> {
        self.reset();
        self.state = StreamState::AwaitingResponse;

        let response = match self
            .client
            .post(&self.config.endpoint)
            .json(&serde_json::json!({ "audio": audio_b64 }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Err(self.fail(handler, format!("request failed: {e}")));
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            handler.on_error(&format!("stream returned status {status}"));
            self.state = StreamState::Errored;
            return Err(VoxplayError::StreamStatus { status });
        }

        self.state = StreamState::Streaming;
        let mut splitter = RecordSplitter::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    return Err(self.fail(handler, format!("failed to read stream chunk: {e}")));
                }
            };

            for record in splitter.feed(&chunk) {
                match self.dispatch(&record, handler) {
                    Dispatch::Continue => {}
                    Dispatch::Done => return Ok(self.outcome()),
                    Dispatch::Failed(message) => {
                        self.state = StreamState::Errored;
                        return Err(VoxplayError::Stream { message });
                    }
                }
            }
        }

        // Body ended without a done record; flush any final unterminated
        // record before giving up on it.
        if let Some(record) = splitter.finish() {
            match self.dispatch(&record, handler) {
                Dispatch::Done => return Ok(self.outcome()),
                Dispatch::Failed(message) => {
                    self.state = StreamState::Errored;
                    return Err(VoxplayError::Stream { message });
                }
                Dispatch::Continue => {}
            }
        }

        Err(self.fail(handler, "stream ended without a done record".to_string()))
    }

    /// Parses and dispatches a single record.
    ///
    /// Malformed JSON is logged and skipped; only explicit error records
    /// and `done` terminate the turn.
    fn dispatch(&mut self, record: &str, handler: &mut dyn StreamHandler) -> Dispatch {
        let event = match StreamEvent::from_json(record) {
            Ok(event) => event,
            Err(e) => {
                eprintln!("voxplay: skipping malformed record: {e}");
                return Dispatch::Continue;
            }
        };

        match event {
            StreamEvent::UserTranscript { data } => {
                handler.on_user_transcript(&data);
                self.user_transcript = Some(data);
            }
            StreamEvent::Transcript { data } => {
                self.transcript.push_str(&data);
                handler.on_transcript(&data, &self.transcript);
            }
            StreamEvent::Audio { data, seq } => match seq {
                Some(seq) => {
                    for payload in self.sequencer.push(seq, data) {
                        self.play_fragment(&payload);
                    }
                }
                None => self.play_fragment(&data),
            },
            StreamEvent::Done { transcript } => {
                let _ = self.player.stream_complete();
                self.transcript = transcript;
                handler.on_complete(&self.transcript);
                self.state = StreamState::Completed;
                return Dispatch::Done;
            }
            StreamEvent::Error { error } => {
                handler.on_error(&error);
                return Dispatch::Failed(error);
            }
        }
        Dispatch::Continue
    }

    /// Decodes one fragment and pushes it to the player.
    ///
    /// A fragment that fails to decode is skipped: one bad payload should
    /// not sacrifice the rest of a live stream.
    fn play_fragment(&mut self, payload: &str) {
        match decode_base64_pcm16(payload) {
            Ok(samples) => {
                if self.player.push_samples(samples).is_err() {
                    eprintln!("voxplay: player stopped; dropping audio fragment");
                    return;
                }
                self.fragments += 1;
            }
            Err(e) => {
                eprintln!("voxplay: skipping undecodable audio fragment: {e}");
            }
        }
    }

    fn fail(&mut self, handler: &mut dyn StreamHandler, message: String) -> VoxplayError {
        handler.on_error(&message);
        self.state = StreamState::Errored;
        VoxplayError::Transport { message }
    }

    fn outcome(&self) -> StreamOutcome {
        StreamOutcome {
            transcript: self.transcript.clone(),
            user_transcript: self.user_transcript.clone(),
            fragments: self.fragments,
        }
    }

    fn reset(&mut self) {
        // Audio a previous turn left buffered must not leak into this one.
        let _ = self.player.clear();
        self.sequencer.reset();
        self.transcript.clear();
        self.user_transcript = None;
        self.fragments = 0;
    }

    /// Feeds raw stream bytes directly, bypassing the network layer.
    ///
    /// Test seam: lets unit tests replay canned SSE byte streams through
    /// the full dispatch path.
    #[cfg(test)]
    fn process_bytes(
        &mut self,
        splitter: &mut RecordSplitter,
        chunk: &[u8],
        handler: &mut dyn StreamHandler,
    ) -> Result<Option<StreamOutcome>> {
        for record in splitter.feed(chunk) {
            match self.dispatch(&record, handler) {
                Dispatch::Continue => {}
                Dispatch::Done => return Ok(Some(self.outcome())),
                Dispatch::Failed(message) => {
                    self.state = StreamState::Errored;
                    return Err(VoxplayError::Stream { message });
                }
            }
        }
        Ok(None)
    }
}
