use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use voxplay::config::Config;
use voxplay::playback::engine::{EngineConfig, PlaybackEngine, PlayerHandle};
use voxplay::playback::sink::WavSink;
use voxplay::stream::orchestrator::{
    StreamConfig, StreamHandler, StreamOrchestrator, StreamOutcome,
};
use voxplay::WavInput;

#[derive(Parser)]
#[command(
    name = "voxplay",
    version,
    about = "Stream a recorded voice-chat turn and play the reply"
)]
struct Cli {
    /// Input WAV recording; reads WAV data from stdin when omitted
    input: Option<PathBuf>,

    /// Streaming endpoint URL (overrides config)
    #[arg(long)]
    url: Option<String>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the reply audio to a WAV file instead of the sound device
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Suppress transcript output
    #[arg(long, short)]
    quiet: bool,
}

/// Prints transcripts as they stream in.
struct ConsoleHandler {
    quiet: bool,
}

impl StreamHandler for ConsoleHandler {
    fn on_user_transcript(&mut self, text: &str) {
        if !self.quiet {
            eprintln!("you: {text}");
        }
    }

    fn on_transcript(&mut self, delta: &str, _full: &str) {
        if !self.quiet {
            print!("{delta}");
            let _ = std::io::stdout().flush();
        }
    }

    fn on_complete(&mut self, _transcript: &str) {
        if !self.quiet {
            println!();
        }
    }

    fn on_error(&mut self, message: &str) {
        eprintln!("voxplay: stream error: {message}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let sample_rate = config.playback.sample_rate;
    let input = match cli.input.as_deref() {
        Some(path) => WavInput::from_path(path, sample_rate)?,
        None => WavInput::from_stdin(sample_rate)?,
    };
    if !cli.quiet {
        eprintln!("voxplay: sending {} ms of audio", input.duration_ms());
    }
    let audio_b64 = input.to_base64();

    let stream_config = StreamConfig {
        endpoint: cli.url.unwrap_or(config.stream.endpoint),
    };
    let engine_config = EngineConfig {
        sample_rate,
        initial_buffer_samples: config.playback.initial_buffer_samples,
        ..EngineConfig::default()
    };

    let outcome = match cli.output {
        Some(path) => {
            let sink = WavSink::create(&path, sample_rate)?;
            let engine_config = EngineConfig {
                realtime: false,
                ..engine_config
            };
            let (player, engine) = PlaybackEngine::new(engine_config).start(Box::new(sink));

            let result = run_turn(stream_config, player, cli.quiet, &audio_b64).await;
            // A turn that completed without audio never emits Ended.
            let rendered = result.as_ref().map_or(0, |outcome| outcome.fragments);
            if rendered > 0 && !engine.wait_ended(Duration::from_secs(30)) {
                eprintln!("voxplay: timed out waiting for playback to finish");
            }
            engine.stop();
            result?
        }
        None => play_live(stream_config, engine_config, cli.quiet, &audio_b64).await?,
    };

    if !cli.quiet {
        eprintln!("voxplay: {} audio fragments rendered", outcome.fragments);
    }
    Ok(())
}

async fn run_turn(
    stream_config: StreamConfig,
    player: PlayerHandle,
    quiet: bool,
    audio_b64: &str,
) -> Result<StreamOutcome> {
    let mut orchestrator = StreamOrchestrator::new(stream_config, player);
    let mut handler = ConsoleHandler { quiet };
    Ok(orchestrator.run(audio_b64, &mut handler).await?)
}

#[cfg(feature = "cpal-audio")]
async fn play_live(
    stream_config: StreamConfig,
    engine_config: EngineConfig,
    quiet: bool,
    audio_b64: &str,
) -> Result<StreamOutcome> {
    use voxplay::playback::cpal_out::CpalPlayer;

    let player = CpalPlayer::start(&engine_config)?;
    let outcome = run_turn(stream_config, player.handle(), quiet, audio_b64).await?;
    if outcome.fragments > 0 && !player.wait_ended(Duration::from_secs(60)) {
        eprintln!("voxplay: timed out waiting for playback to finish");
    }
    let _ = player.handle().stop();
    Ok(outcome)
}

#[cfg(not(feature = "cpal-audio"))]
async fn play_live(
    stream_config: StreamConfig,
    engine_config: EngineConfig,
    quiet: bool,
    audio_b64: &str,
) -> Result<StreamOutcome> {
    use voxplay::playback::sink::NullSink;

    eprintln!("voxplay: built without cpal-audio; discarding reply audio");
    let (player, engine) = PlaybackEngine::new(engine_config).start(Box::new(NullSink));

    let result = run_turn(stream_config, player, quiet, audio_b64).await;
    let rendered = result.as_ref().map_or(0, |outcome| outcome.fragments);
    if rendered > 0 && !engine.wait_ended(Duration::from_secs(60)) {
        eprintln!("voxplay: timed out waiting for playback to finish");
    }
    engine.stop();
    result
}
