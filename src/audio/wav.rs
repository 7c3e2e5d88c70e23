//! WAV input for the CLI request path.
//!
//! The streaming endpoint expects a fully-buffered base64 PCM16 request
//! body. This module reads a recorded WAV file (or stdin in pipe mode),
//! downmixes stereo to mono and resamples to the session rate, then hands
//! back either raw i16 samples or the encoded payload.

use crate::audio::decode::encode_base64_i16;
use crate::error::{Result, VoxplayError};
use std::io::Read;

/// Recorded input audio, normalized to mono at a single sample rate.
pub struct WavInput {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl WavInput {
    /// Create from any reader (for testing/flexibility).
    pub fn from_reader(reader: Box<dyn Read + Send>, target_rate: u32) -> Result<Self> {
        let mut wav_reader = hound::WavReader::new(reader).map_err(|e| VoxplayError::AudioInput {
            message: format!("Failed to parse WAV file: {}", e),
        })?;

        let spec = wav_reader.spec();
        let source_rate = spec.sample_rate;
        let source_channels = spec.channels;

        let raw_samples: Vec<i16> = wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| VoxplayError::AudioInput {
                message: format!("Failed to read WAV samples: {}", e),
            })?;

        // Convert to mono if stereo
        let mono_samples = if source_channels == 2 {
            raw_samples
                .chunks_exact(2)
                .map(|pair| {
                    let left = pair[0] as i32;
                    let right = pair[1] as i32;
                    ((left + right) / 2) as i16
                })
                .collect()
        } else if source_channels == 1 {
            raw_samples
        } else {
            return Err(VoxplayError::AudioInput {
                message: format!("Unsupported channel count: {}", source_channels),
            });
        };

        // Resample to the session rate if needed
        let samples = if source_rate != target_rate {
            resample(&mono_samples, source_rate, target_rate)
        } else {
            mono_samples
        };

        Ok(Self {
            samples,
            sample_rate: target_rate,
        })
    }

    /// Create from a file on disk.
    pub fn from_path(path: &std::path::Path, target_rate: u32) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(Box::new(std::io::BufReader::new(file)), target_rate)
    }

    /// Create from stdin.
    pub fn from_stdin(target_rate: u32) -> Result<Self> {
        use std::io::Cursor;

        // Read all data from stdin into memory first (StdinLock is not Send)
        let mut buffer = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .map_err(|e| VoxplayError::AudioInput {
                message: format!("Failed to read from stdin: {}", e),
            })?;

        Self::from_reader(Box::new(Cursor::new(buffer)), target_rate)
    }

    /// Encode as the base64 PCM16 request payload.
    pub fn to_base64(&self) -> String {
        encode_base64_i16(&self.samples)
    }

    /// Duration of the recording in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        (self.samples.len() as u64 * 1000) / self.sample_rate as u64
    }

    /// Consume the input and return all samples as a single buffer.
    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decode::decode_base64_pcm16;
    use std::io::Cursor;

    fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn from_reader_matching_rate_mono_passes_through() {
        let input_samples = vec![100i16, 200, 300, 400, 500];
        let wav_data = make_wav_data(24_000, 1, &input_samples);

        let input = WavInput::from_reader(Box::new(Cursor::new(wav_data)), 24_000).unwrap();
        assert_eq!(input.into_samples(), input_samples);
    }

    #[test]
    fn from_reader_stereo_downmixes_to_mono() {
        // Stereo pairs: (100, 200), (300, 400), (500, 600)
        let stereo_samples = vec![100i16, 200, 300, 400, 500, 600];
        let wav_data = make_wav_data(24_000, 2, &stereo_samples);

        let input = WavInput::from_reader(Box::new(Cursor::new(wav_data)), 24_000).unwrap();
        assert_eq!(input.into_samples(), vec![150i16, 350, 550]);
    }

    #[test]
    fn from_reader_resamples_48khz_to_24khz() {
        let input_samples = vec![1000i16; 48_000]; // 1 second at 48kHz
        let wav_data = make_wav_data(48_000, 1, &input_samples);

        let input = WavInput::from_reader(Box::new(Cursor::new(wav_data)), 24_000).unwrap();
        let samples = input.into_samples();
        assert!(samples.len() >= 23_900 && samples.len() <= 24_100);
    }

    #[test]
    fn from_reader_rejects_garbage() {
        let result = WavInput::from_reader(Box::new(Cursor::new(vec![0u8; 16])), 24_000);
        assert!(matches!(result, Err(VoxplayError::AudioInput { .. })));
    }

    #[test]
    fn from_reader_rejects_unsupported_channels() {
        let wav_data = make_wav_data(24_000, 4, &[0i16; 8]);
        let result = WavInput::from_reader(Box::new(Cursor::new(wav_data)), 24_000);
        assert!(matches!(result, Err(VoxplayError::AudioInput { .. })));
    }

    #[test]
    fn to_base64_round_trips_through_decoder() {
        let input_samples = vec![0i16, 16384, -16384];
        let wav_data = make_wav_data(24_000, 1, &input_samples);

        let input = WavInput::from_reader(Box::new(Cursor::new(wav_data)), 24_000).unwrap();
        let decoded = decode_base64_pcm16(&input.to_base64()).unwrap();
        assert_eq!(decoded, vec![0.0, 0.5, -0.5]);
    }

    #[test]
    fn duration_ms_reflects_sample_count() {
        let wav_data = make_wav_data(24_000, 1, &vec![0i16; 12_000]);
        let input = WavInput::from_reader(Box::new(Cursor::new(wav_data)), 24_000).unwrap();
        assert_eq!(input.duration_ms(), 500);
    }

    #[test]
    fn resample_same_rate_is_identity() {
        let samples = vec![1i16, 2, 3];
        assert_eq!(resample(&samples, 16_000, 16_000), samples);
    }

    #[test]
    fn resample_empty_input() {
        assert!(resample(&[], 48_000, 24_000).is_empty());
    }
}
