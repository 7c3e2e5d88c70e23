//! cpal-backed playback: the device callback is the render quantum.
//!
//! Instead of the paced engine thread, the processor moves into the output
//! stream's data callback, which pulls exactly as many frames as the device
//! asks for. Mono renders are duplicated across the device's channels.

use crate::error::{Result, VoxplayError};
use crate::playback::engine::{EngineConfig, PlayerHandle};
use crate::playback::processor::PlaybackProcessor;
use crate::playback::PlayerEvent;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, unbounded, Receiver};

/// Playback through the default cpal output device.
pub struct CpalPlayer {
    // Audio stops when the stream is dropped.
    _stream: cpal::Stream,
    player: PlayerHandle,
    events: Receiver<PlayerEvent>,
}

impl CpalPlayer {
    /// Opens the default output device and starts rendering.
    pub fn start(config: &EngineConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| VoxplayError::AudioOutput {
                message: "No default output device".to_string(),
            })?;

        let supported = device
            .default_output_config()
            .map_err(|e| VoxplayError::AudioOutput {
                message: format!("No default output config: {}", e),
            })?;
        let channels = supported.channels() as usize;

        let stream_config = cpal::StreamConfig {
            channels: supported.channels(),
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let (cmd_tx, cmd_rx) = unbounded();
        let (evt_tx, evt_rx) = bounded(16);
        let mut processor = PlaybackProcessor::new(config.initial_buffer_samples, cmd_rx, evt_tx);
        let mut mono = vec![0.0f32; 4096];
        let mut stopped = false;

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if stopped {
                        data.fill(0.0);
                        return;
                    }
                    let frames = data.len() / channels.max(1);
                    mono.resize(frames, 0.0);
                    if !processor.process(&mut mono) {
                        stopped = true;
                    }
                    for (frame, &sample) in data.chunks_mut(channels.max(1)).zip(mono.iter()) {
                        frame.fill(sample);
                    }
                },
                |err| {
                    eprintln!("voxplay: output stream error: {err}");
                },
                None,
            )
            .map_err(|e| VoxplayError::AudioOutput {
                message: format!("Failed to build output stream: {}", e),
            })?;

        stream.play().map_err(|e| VoxplayError::AudioOutput {
            message: format!("Failed to start output stream: {}", e),
        })?;

        Ok(Self {
            _stream: stream,
            player: PlayerHandle::new(cmd_tx),
            events: evt_rx,
        })
    }

    /// Orchestration-side handle for this player.
    pub fn handle(&self) -> PlayerHandle {
        self.player.clone()
    }

    /// Receiver for render-side notifications.
    pub fn events(&self) -> &Receiver<PlayerEvent> {
        &self.events
    }

    /// Blocks until `Ended` arrives or the timeout elapses.
    pub fn wait_ended(&self, timeout: std::time::Duration) -> bool {
        matches!(self.events.recv_timeout(timeout), Ok(PlayerEvent::Ended))
    }
}
