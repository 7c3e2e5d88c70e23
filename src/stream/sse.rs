//! Event-stream wire format: record splitting and typed events.
//!
//! The chat endpoint speaks SSE: each record is a `data: ` line carrying a
//! JSON object, records separated by a blank line. Network chunks can cut
//! records anywhere, so the splitter buffers bytes across `feed` calls and
//! yields only complete records.

use serde::{Deserialize, Serialize};

/// One parsed record from the chat stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Transcription of the caller's own input audio.
    UserTranscript { data: String },
    /// Incremental assistant transcript delta.
    Transcript { data: String },
    /// One playable audio fragment (base64 PCM16), optionally sequenced.
    Audio {
        data: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seq: Option<u64>,
    },
    /// Terminal: stream finished, final transcript provided.
    Done { transcript: String },
    /// Terminal: stream failed.
    Error { error: String },
}

impl StreamEvent {
    /// Deserialize an event from a record's JSON payload.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Serialize the event to JSON (used by tests and fixtures).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Splits an incoming byte stream into complete SSE record payloads.
///
/// Yields the JSON text of each record, with the `data:` prefix stripped.
/// Multiple `data:` lines in one record are joined with a newline; comment
/// and field lines other than `data` are ignored.
#[derive(Debug, Default)]
pub struct RecordSplitter {
    buffer: Vec<u8>,
}

impl RecordSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw network bytes and returns the payloads of every record
    /// completed by this chunk.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut records = Vec::new();
        while let Some(boundary) = find_record_boundary(&self.buffer) {
            let rest = self.buffer.split_off(boundary.end);
            let record = std::mem::replace(&mut self.buffer, rest);
            if let Some(payload) = extract_data(&record[..boundary.start]) {
                records.push(payload);
            }
        }
        records
    }

    /// Flushes a final unterminated record, if any bytes remain.
    pub fn finish(&mut self) -> Option<String> {
        let remaining = std::mem::take(&mut self.buffer);
        extract_data(&remaining)
    }

    /// Bytes currently buffered awaiting a record terminator.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

struct Boundary {
    /// Byte offset where the record's content ends.
    start: usize,
    /// Byte offset just past the terminator.
    end: usize,
}

/// Finds the first blank-line record terminator (`\n\n` or `\r\n\r\n`).
fn find_record_boundary(buffer: &[u8]) -> Option<Boundary> {
    let mut i = 0;
    while i + 1 < buffer.len() {
        if buffer[i] == b'\n' && buffer[i + 1] == b'\n' {
            return Some(Boundary {
                start: i,
                end: i + 2,
            });
        }
        if i + 3 < buffer.len() && &buffer[i..i + 4] == b"\r\n\r\n" {
            return Some(Boundary {
                start: i,
                end: i + 4,
            });
        }
        i += 1;
    }
    None
}

/// Joins the `data:` lines of one record, stripping prefixes.
fn extract_data(record: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(record);
    let mut payload = String::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(rest) = line.strip_prefix("data:") {
            if !payload.is_empty() {
                payload.push('\n');
            }
            payload.push_str(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if payload.is_empty() {
        None
    } else {
        Some(payload)
    }
}
