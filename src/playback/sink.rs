//! Output sinks for rendered audio.
//!
//! Pairs with the processor: the engine renders a quantum, the sink takes
//! it. `CollectorSink` captures output for tests and headless runs,
//! `WavSink` writes it to disk, `NullSink` discards it.

use crate::error::{Result, VoxplayError};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Pluggable destination for rendered sample quanta.
pub trait AudioSink: Send + 'static {
    /// Handle one rendered quantum.
    fn write(&mut self, samples: &[f32]);

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Discards all output. Placeholder when only transcripts matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn write(&mut self, _samples: &[f32]) {}

    fn name(&self) -> &'static str {
        "null"
    }
}

/// Accumulates rendered output into a shared buffer.
#[derive(Default)]
pub struct CollectorSink {
    samples: Arc<Mutex<Vec<f32>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the collected samples; survives the sink moving
    /// onto the render thread.
    pub fn buffer(&self) -> Arc<Mutex<Vec<f32>>> {
        self.samples.clone()
    }
}

impl AudioSink for CollectorSink {
    fn write(&mut self, samples: &[f32]) {
        if let Ok(mut collected) = self.samples.lock() {
            collected.extend_from_slice(samples);
        }
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

/// Writes rendered output to a mono 16-bit WAV file.
///
/// The header is patched when the sink is dropped (hound finalizes on
/// Drop), so the file is valid once the engine shuts down.
pub struct WavSink {
    writer: hound::WavWriter<std::io::BufWriter<std::fs::File>>,
}

impl WavSink {
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(path, spec).map_err(|e| VoxplayError::AudioOutput {
            message: format!("Failed to create WAV output: {}", e),
        })?;
        Ok(Self { writer })
    }
}

impl AudioSink for WavSink {
    fn write(&mut self, samples: &[f32]) {
        for &sample in samples {
            let quantized = (sample * 32767.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            if let Err(e) = self.writer.write_sample(quantized) {
                eprintln!("voxplay: WAV sink write failed: {}", e);
                return;
            }
        }
    }

    fn name(&self) -> &'static str {
        "wav"
    }
}
