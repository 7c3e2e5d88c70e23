//! Render thread hosting and the orchestration-side player handle.
//!
//! `PlaybackEngine::start` spawns a thread that drives the processor one
//! quantum at a time into an [`AudioSink`]. In realtime mode the thread
//! paces itself to wall-clock audio time; with pacing off it renders as
//! fast as the sink accepts, which is what tests and file output use.

use crate::error::{Result, VoxplayError};
use crate::playback::processor::{PlaybackProcessor, RENDER_QUANTUM};
use crate::playback::sink::AudioSink;
use crate::playback::{PlayerCommand, PlayerEvent};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the playback engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Initial ring capacity in samples.
    pub initial_buffer_samples: usize,
    /// Frames per render quantum.
    pub quantum: usize,
    /// Pace rendering to wall-clock audio time.
    pub realtime: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24_000,
            initial_buffer_samples: 24_000,
            quantum: RENDER_QUANTUM,
            realtime: true,
        }
    }
}

/// Orchestration-side handle for feeding and controlling playback.
///
/// All operations are non-blocking channel sends; they fail only once the
/// render context has terminated.
#[derive(Clone)]
pub struct PlayerHandle {
    commands: Sender<PlayerCommand>,
}

impl PlayerHandle {
    pub(crate) fn new(commands: Sender<PlayerCommand>) -> Self {
        Self { commands }
    }

    /// Queues decoded samples for rendering.
    pub fn push_samples(&self, samples: Vec<f32>) -> Result<()> {
        self.send(PlayerCommand::Audio { samples })
    }

    /// Stops playback and discards buffered audio.
    pub fn clear(&self) -> Result<()> {
        self.send(PlayerCommand::Clear)
    }

    /// Marks the stream complete; `Ended` follows once the buffer drains.
    pub fn stream_complete(&self) -> Result<()> {
        self.send(PlayerCommand::StreamComplete)
    }

    /// Hard-stops the render context.
    pub fn stop(&self) -> Result<()> {
        self.send(PlayerCommand::Stop)
    }

    fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| VoxplayError::PlayerStopped)
    }
}

/// Handle to a running playback engine.
pub struct EngineHandle {
    events: Receiver<PlayerEvent>,
    commands: Sender<PlayerCommand>,
    thread: Option<JoinHandle<()>>,
}

impl EngineHandle {
    /// Receiver for render-side notifications.
    pub fn events(&self) -> &Receiver<PlayerEvent> {
        &self.events
    }

    /// Blocks until `Ended` arrives or the timeout elapses.
    pub fn wait_ended(&self, timeout: Duration) -> bool {
        matches!(self.events.recv_timeout(timeout), Ok(PlayerEvent::Ended))
    }

    /// Stops the engine and joins the render thread.
    ///
    /// Waits up to one second; after the deadline the thread is detached
    /// and dies with the process.
    pub fn stop(mut self) {
        let _ = self.commands.send(PlayerCommand::Stop);

        if let Some(handle) = self.thread.take() {
            let deadline = Instant::now() + Duration::from_secs(1);
            let poll_interval = Duration::from_millis(10);

            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    eprintln!("voxplay: shutdown timeout — render thread still running, detaching");
                    return;
                }
                thread::sleep(poll_interval);
            }

            if let Err(panic_info) = handle.join() {
                let msg = panic_info
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                    .unwrap_or("unknown panic");
                eprintln!("voxplay: render thread panicked: {msg}");
            }
        }
    }
}

/// Spawns and owns the render thread.
pub struct PlaybackEngine {
    config: EngineConfig,
}

impl PlaybackEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Starts the render thread writing into `sink`.
    ///
    /// Returns the orchestration-side handle and the engine handle carrying
    /// the event receiver and join control.
    pub fn start(self, mut sink: Box<dyn AudioSink>) -> (PlayerHandle, EngineHandle) {
        let (cmd_tx, cmd_rx) = unbounded();
        let (evt_tx, evt_rx) = bounded(16);

        let mut processor =
            PlaybackProcessor::new(self.config.initial_buffer_samples, cmd_rx, evt_tx);
        let quantum = self.config.quantum.max(1);
        let quantum_duration =
            Duration::from_secs_f64(quantum as f64 / self.config.sample_rate as f64);
        let realtime = self.config.realtime;

        let thread = thread::spawn(move || {
            let mut buffer = vec![0.0f32; quantum];
            loop {
                let started = Instant::now();
                if !processor.process(&mut buffer) {
                    break;
                }
                sink.write(&buffer);

                if realtime {
                    let elapsed = started.elapsed();
                    if elapsed < quantum_duration {
                        thread::sleep(quantum_duration - elapsed);
                    }
                } else if processor.buffered() == 0 {
                    // Unpaced rendering still naps while starved, otherwise
                    // an idle engine spins flat out producing silence.
                    thread::sleep(Duration::from_millis(1));
                }
            }
        });

        let player = PlayerHandle::new(cmd_tx.clone());
        let engine = EngineHandle {
            events: evt_rx,
            commands: cmd_tx,
            thread: Some(thread),
        };

        (player, engine)
    }
}
