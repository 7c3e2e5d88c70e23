//! Per-quantum playback processing.
//!
//! `PlaybackProcessor` is the only owner of the sample ring and runs on the
//! render context (a dedicated thread or an audio device callback). Each
//! invocation must finish within one render quantum: no allocation beyond
//! ring growth, no blocking, no I/O. Communication with the orchestration
//! side is channel-only.

use crate::audio::ring_buffer::SampleRing;
use crate::playback::{PlayerCommand, PlayerEvent};
use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// Frames rendered per invocation when the engine drives the processor.
pub const RENDER_QUANTUM: usize = 128;

/// Playback session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing to render; output is silence.
    Idle,
    /// Audio is buffered or expected; the ring is pulled each quantum.
    Playing,
}

/// Consumes the sample ring once per render quantum.
pub struct PlaybackProcessor {
    ring: SampleRing,
    state: PlaybackState,
    stream_complete: bool,
    commands: Receiver<PlayerCommand>,
    events: Sender<PlayerEvent>,
}

impl PlaybackProcessor {
    pub fn new(
        initial_capacity: usize,
        commands: Receiver<PlayerCommand>,
        events: Sender<PlayerEvent>,
    ) -> Self {
        Self {
            ring: SampleRing::new(initial_capacity),
            state: PlaybackState::Idle,
            stream_complete: false,
            commands,
            events,
        }
    }

    /// Renders one quantum into `output`.
    ///
    /// Returns false once the processor has been stopped (hard stop or the
    /// controlling side dropped its handle); the render context should
    /// terminate. Starvation is not an error: the output is zero-padded
    /// and playback resumes when more audio arrives.
    pub fn process(&mut self, output: &mut [f32]) -> bool {
        loop {
            match self.commands.try_recv() {
                Ok(PlayerCommand::Audio { samples }) => {
                    self.ring.push(&samples);
                    self.state = PlaybackState::Playing;
                }
                Ok(PlayerCommand::Clear) => {
                    self.ring.clear();
                    self.stream_complete = false;
                    self.state = PlaybackState::Idle;
                }
                Ok(PlayerCommand::StreamComplete) => {
                    self.stream_complete = true;
                }
                Ok(PlayerCommand::Stop) => {
                    output.fill(0.0);
                    return false;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    output.fill(0.0);
                    return false;
                }
            }
        }

        if self.state != PlaybackState::Playing {
            output.fill(0.0);
            return true;
        }

        self.ring.pull(output);

        // Completion is buffer-state-dependent: Ended fires only after the
        // last buffered sample has actually been rendered.
        if self.stream_complete && self.ring.available() == 0 {
            self.state = PlaybackState::Idle;
            self.stream_complete = false;
            let _ = self.events.try_send(PlayerEvent::Ended);
        }

        true
    }

    /// Current session state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Unrendered samples currently buffered.
    pub fn buffered(&self) -> usize {
        self.ring.available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{bounded, unbounded};

    fn make_processor() -> (
        PlaybackProcessor,
        Sender<PlayerCommand>,
        Receiver<PlayerEvent>,
    ) {
        let (cmd_tx, cmd_rx) = unbounded();
        let (evt_tx, evt_rx) = bounded(16);
        (PlaybackProcessor::new(256, cmd_rx, evt_tx), cmd_tx, evt_rx)
    }

    #[test]
    fn test_idle_outputs_silence() {
        let (mut processor, _cmd_tx, _evt_rx) = make_processor();
        let mut out = [1.0f32; RENDER_QUANTUM];
        assert!(processor.process(&mut out));
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(processor.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_audio_command_starts_playback() {
        let (mut processor, cmd_tx, _evt_rx) = make_processor();
        cmd_tx
            .send(PlayerCommand::Audio {
                samples: vec![0.25; 200],
            })
            .unwrap();

        let mut out = [0.0f32; RENDER_QUANTUM];
        assert!(processor.process(&mut out));
        assert_eq!(processor.state(), PlaybackState::Playing);
        assert!(out.iter().all(|&s| s == 0.25));
        assert_eq!(processor.buffered(), 200 - RENDER_QUANTUM);
    }

    #[test]
    fn test_starvation_mid_stream_yields_silence_then_resumes() {
        let (mut processor, cmd_tx, _evt_rx) = make_processor();
        cmd_tx
            .send(PlayerCommand::Audio {
                samples: vec![0.5; 64],
            })
            .unwrap();

        let mut out = [0.0f32; RENDER_QUANTUM];
        processor.process(&mut out);
        assert_eq!(&out[..64], &[0.5; 64][..]);
        assert_eq!(&out[64..], &[0.0; 64][..]);

        // Starved quantum: pure silence, still playing
        processor.process(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(processor.state(), PlaybackState::Playing);

        // Recovery once data arrives
        cmd_tx
            .send(PlayerCommand::Audio {
                samples: vec![0.75; RENDER_QUANTUM],
            })
            .unwrap();
        processor.process(&mut out);
        assert!(out.iter().all(|&s| s == 0.75));
    }

    #[test]
    fn test_ended_fires_only_after_drain() {
        let (mut processor, cmd_tx, evt_rx) = make_processor();
        cmd_tx
            .send(PlayerCommand::Audio {
                samples: vec![0.1; RENDER_QUANTUM * 2],
            })
            .unwrap();
        cmd_tx.send(PlayerCommand::StreamComplete).unwrap();

        let mut out = [0.0f32; RENDER_QUANTUM];
        processor.process(&mut out);
        // One quantum still buffered: no Ended yet
        assert!(evt_rx.try_recv().is_err());

        processor.process(&mut out);
        assert_eq!(evt_rx.try_recv(), Ok(PlayerEvent::Ended));
        assert_eq!(processor.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_ended_fires_once() {
        let (mut processor, cmd_tx, evt_rx) = make_processor();
        cmd_tx
            .send(PlayerCommand::Audio {
                samples: vec![0.1; 32],
            })
            .unwrap();
        cmd_tx.send(PlayerCommand::StreamComplete).unwrap();

        let mut out = [0.0f32; RENDER_QUANTUM];
        processor.process(&mut out);
        processor.process(&mut out);
        processor.process(&mut out);

        assert_eq!(evt_rx.try_recv(), Ok(PlayerEvent::Ended));
        assert!(evt_rx.try_recv().is_err());
    }

    #[test]
    fn test_complete_before_any_audio_then_push() {
        let (mut processor, cmd_tx, evt_rx) = make_processor();
        // Complete flag set while idle: nothing fires because nothing played
        cmd_tx.send(PlayerCommand::StreamComplete).unwrap();
        let mut out = [0.0f32; RENDER_QUANTUM];
        processor.process(&mut out);
        assert!(evt_rx.try_recv().is_err());

        cmd_tx
            .send(PlayerCommand::Audio {
                samples: vec![0.2; 16],
            })
            .unwrap();
        processor.process(&mut out);
        assert_eq!(evt_rx.try_recv(), Ok(PlayerEvent::Ended));
    }

    #[test]
    fn test_clear_discards_and_goes_idle_without_ended() {
        let (mut processor, cmd_tx, evt_rx) = make_processor();
        cmd_tx
            .send(PlayerCommand::Audio {
                samples: vec![0.9; 1000],
            })
            .unwrap();
        cmd_tx.send(PlayerCommand::StreamComplete).unwrap();
        cmd_tx.send(PlayerCommand::Clear).unwrap();

        let mut out = [0.5f32; RENDER_QUANTUM];
        assert!(processor.process(&mut out));
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(processor.state(), PlaybackState::Idle);
        assert_eq!(processor.buffered(), 0);
        assert!(evt_rx.try_recv().is_err());
    }

    #[test]
    fn test_stop_returns_false_and_silences() {
        let (mut processor, cmd_tx, _evt_rx) = make_processor();
        cmd_tx
            .send(PlayerCommand::Audio {
                samples: vec![0.9; 64],
            })
            .unwrap();
        cmd_tx.send(PlayerCommand::Stop).unwrap();

        let mut out = [0.5f32; RENDER_QUANTUM];
        assert!(!processor.process(&mut out));
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_disconnected_commands_stop_processor() {
        let (mut processor, cmd_tx, _evt_rx) = make_processor();
        drop(cmd_tx);
        let mut out = [0.0f32; RENDER_QUANTUM];
        assert!(!processor.process(&mut out));
    }

    #[test]
    fn test_playing_reentered_on_additional_pushes() {
        let (mut processor, cmd_tx, evt_rx) = make_processor();
        let mut out = [0.0f32; RENDER_QUANTUM];

        cmd_tx
            .send(PlayerCommand::Audio {
                samples: vec![0.1; RENDER_QUANTUM],
            })
            .unwrap();
        cmd_tx.send(PlayerCommand::StreamComplete).unwrap();
        processor.process(&mut out);
        assert_eq!(evt_rx.try_recv(), Ok(PlayerEvent::Ended));

        // A new session on the same processor
        cmd_tx
            .send(PlayerCommand::Audio {
                samples: vec![0.3; RENDER_QUANTUM],
            })
            .unwrap();
        processor.process(&mut out);
        assert_eq!(processor.state(), PlaybackState::Playing);
        assert!(out.iter().all(|&s| s == 0.3));
    }
}
