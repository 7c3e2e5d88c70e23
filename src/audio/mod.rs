//! Audio data handling: payload decoding, the playback sample ring, and
//! WAV input for the request path.

pub mod decode;
pub mod ring_buffer;
pub mod wav;

pub use decode::{decode_base64_pcm16, encode_base64_i16, encode_base64_pcm16};
pub use ring_buffer::SampleRing;
pub use wav::WavInput;
