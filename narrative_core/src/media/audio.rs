//! Audio Decoder - raw PCM16 speech payloads into playable sample buffers.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bytes per 16-bit sample.
const SAMPLE_WIDTH: usize = 2;

/// Layout of an incoming speech payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for AudioFormat {
    /// Speech synthesis output: 24 kHz mono.
    fn default() -> Self {
        Self {
            sample_rate: 24_000,
            channels: 1,
        }
    }
}

/// Errors decoding a speech payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Payload of {len} bytes is not a whole number of {frame_bytes}-byte frames")]
    MisalignedPayload { len: usize, frame_bytes: usize },

    #[error("Invalid audio format: {0}")]
    InvalidFormat(&'static str),
}

/// Decoded linear PCM, one normalized sample vector per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Playback length.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_count() as f64 / f64::from(self.sample_rate))
    }
}

/// Decode signed 16-bit little-endian interleaved PCM.
///
/// Each sample becomes `i16 / 32768.0`. A payload that does not end on a
/// frame boundary is rejected whole rather than truncated.
pub fn decode_pcm16(bytes: &[u8], format: AudioFormat) -> Result<AudioBuffer, DecodeError> {
    if format.channels == 0 {
        return Err(DecodeError::InvalidFormat("channel count must be at least 1"));
    }
    if format.sample_rate == 0 {
        return Err(DecodeError::InvalidFormat("sample rate must be positive"));
    }

    let channel_count = usize::from(format.channels);
    let frame_bytes = SAMPLE_WIDTH * channel_count;
    if bytes.len() % frame_bytes != 0 {
        return Err(DecodeError::MisalignedPayload {
            len: bytes.len(),
            frame_bytes,
        });
    }

    let frame_count = bytes.len() / frame_bytes;
    let mut channels: Vec<Vec<f32>> = (0..channel_count)
        .map(|_| Vec::with_capacity(frame_count))
        .collect();

    for frame in bytes.chunks_exact(frame_bytes) {
        for (channel, sample) in channels.iter_mut().zip(frame.chunks_exact(SAMPLE_WIDTH)) {
            let value = i16::from_le_bytes([sample[0], sample[1]]);
            channel.push(f32::from(value) / 32768.0);
        }
    }

    Ok(AudioBuffer {
        sample_rate: format.sample_rate,
        channels,
    })
}
