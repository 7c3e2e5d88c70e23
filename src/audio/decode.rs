//! base64 PCM16 decoding for streamed audio fragments.
//!
//! The chat backend delivers audio as base64-encoded little-endian 16-bit
//! signed PCM. Decoding normalizes to f32 in [-1.0, 1.0) by dividing by
//! 32768, which is what the playback path renders.

use crate::error::{Result, VoxplayError};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

/// Decode a base64 PCM16 payload into normalized f32 samples.
///
/// Errors only on malformed base64. A trailing odd byte (a truncated
/// sample) is dropped.
pub fn decode_base64_pcm16(payload: &str) -> Result<Vec<f32>> {
    let bytes = BASE64_STANDARD
        .decode(payload)
        .map_err(|e| VoxplayError::Decode {
            message: format!("invalid base64: {e}"),
        })?;

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect())
}

/// Encode normalized f32 samples as a base64 PCM16 payload.
///
/// Inverse of [`decode_base64_pcm16`] up to one quantization step.
/// Values outside [-1.0, 1.0] are clamped.
pub fn encode_base64_pcm16(samples: &[f32]) -> String {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let quantized = (sample * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        bytes.extend_from_slice(&quantized.to_le_bytes());
    }
    BASE64_STANDARD.encode(&bytes)
}

/// Encode raw i16 PCM samples as a base64 payload (the request body format).
pub fn encode_base64_i16(samples: &[i16]) -> String {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    BASE64_STANDARD.encode(&bytes)
}
