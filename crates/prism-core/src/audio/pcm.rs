//! Interleaved 16-bit PCM decoding
//!
//! Speech responses arrive as base64 text wrapping little-endian, signed,
//! interleaved 16-bit samples. Decoding normalizes each sample by 2^15, so
//! `i16::MIN` maps to exactly `-1.0` and `i16::MAX` to `32767 / 32768`.

use base64::Engine;
use tracing::{debug, warn};

use super::buffer::AudioBuffer;
use crate::error::{Error, Result};

/// Divisor applied to every raw sample.
pub const PCM16_SCALE: f32 = 32768.0;

const BYTES_PER_SAMPLE: usize = 2;

/// Sample rate and channel layout of a raw PCM stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    sample_rate: u32,
    channels: u16,
}

impl PcmFormat {
    /// Mono 24 kHz, the layout speech generation returns by default
    pub const SPEECH: Self = Self {
        sample_rate: 24000,
        channels: 1,
    };

    pub fn new(sample_rate: u32, channels: u16) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidFormat("sample rate must be positive".to_string()));
        }
        if channels == 0 {
            return Err(Error::InvalidFormat(
                "channel count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Bytes occupied by one interleaved frame
    pub fn frame_bytes(&self) -> usize {
        BYTES_PER_SAMPLE * self.channels as usize
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self::SPEECH
    }
}

/// What to do with input that does not end on a frame boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramingPolicy {
    /// Drop the trailing partial sample and partial frame
    #[default]
    Truncate,
    /// Reject the input with [`Error::Framing`]
    Strict,
}

/// Decode interleaved little-endian PCM16 into planar normalized floats.
///
/// Trailing bytes that do not form a whole frame are dropped and logged at
/// `warn!`.
pub fn decode_pcm16(bytes: &[u8], format: PcmFormat) -> AudioBuffer {
    let dropped = trailing_bytes(bytes, format);
    if dropped != 0 {
        warn!(
            "Dropping {} trailing PCM bytes ({} bytes, {}-byte frames)",
            dropped,
            bytes.len(),
            format.frame_bytes()
        );
    }

    let channel_count = format.channels as usize;
    let frame_count = (bytes.len() / BYTES_PER_SAMPLE) / channel_count;

    let mut channels: Vec<Vec<f32>> = (0..channel_count)
        .map(|_| Vec::with_capacity(frame_count))
        .collect();

    for frame in bytes.chunks_exact(format.frame_bytes()) {
        for (channel, sample) in channels.iter_mut().zip(frame.chunks_exact(BYTES_PER_SAMPLE)) {
            let raw = i16::from_le_bytes([sample[0], sample[1]]);
            channel.push(f32::from(raw) / PCM16_SCALE);
        }
    }

    AudioBuffer::from_parts(format.sample_rate, channels)
}

/// Decode PCM16 under an explicit framing policy.
pub fn decode_with_policy(
    bytes: &[u8],
    format: PcmFormat,
    policy: FramingPolicy,
) -> Result<AudioBuffer> {
    if policy == FramingPolicy::Strict && trailing_bytes(bytes, format) != 0 {
        return Err(Error::Framing {
            len: bytes.len(),
            frame_bytes: format.frame_bytes(),
        });
    }
    Ok(decode_pcm16(bytes, format))
}

/// Bytes past the last whole frame
fn trailing_bytes(bytes: &[u8], format: PcmFormat) -> usize {
    bytes.len() % format.frame_bytes()
}

/// Decode a standard-alphabet base64 payload into raw bytes.
///
/// ASCII whitespace is ignored so line-wrapped payloads decode unchanged.
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let engine = base64::engine::general_purpose::STANDARD;
    if text.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        Ok(engine.decode(compact)?)
    } else {
        Ok(engine.decode(text)?)
    }
}

/// Decode a base64 PCM16 payload with the lenient truncation policy.
pub fn decode_base64_pcm16(text: &str, format: PcmFormat) -> Result<AudioBuffer> {
    let bytes = decode_base64(text)?;
    Ok(decode_pcm16(&bytes, format))
}

/// Reusable decoder bound to one format and framing policy
#[derive(Debug, Clone, Copy, Default)]
pub struct PcmDecoder {
    format: PcmFormat,
    policy: FramingPolicy,
}

impl PcmDecoder {
    pub fn new(format: PcmFormat) -> Self {
        Self {
            format,
            policy: FramingPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FramingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    pub fn policy(&self) -> FramingPolicy {
        self.policy
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer> {
        let buffer = decode_with_policy(bytes, self.format, self.policy)?;
        debug!(
            "Decoded {} bytes into {} frames x {} channels at {} Hz",
            bytes.len(),
            buffer.frame_count(),
            buffer.channel_count(),
            buffer.sample_rate()
        );
        Ok(buffer)
    }

    pub fn decode_base64(&self, text: &str) -> Result<AudioBuffer> {
        let bytes = decode_base64(text)?;
        self.decode(&bytes)
    }
}
