//! Audio encoding from normalized buffers back to byte formats

use hound::{WavSpec, WavWriter};
use std::io::Cursor;
use tracing::debug;

use super::buffer::AudioBuffer;
use super::pcm::PCM16_SCALE;
use crate::error::{Error, Result};

/// Supported audio output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// WAV container, 16-bit PCM
    Wav,
    /// Interleaved raw f32 samples
    RawF32,
    /// Interleaved raw i16 samples
    RawI16,
}

/// Quantize one normalized sample with the decoder's 2^15 scale.
#[inline]
pub fn quantize(sample: f32) -> i16 {
    (sample * PCM16_SCALE)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Interleaved little-endian PCM16, the exact inverse of the decoder's normalization.
pub fn encode_pcm16(buffer: &AudioBuffer) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(buffer.frame_count() * buffer.channel_count() * 2);
    for sample in buffer.interleaved() {
        bytes.extend_from_slice(&quantize(sample).to_le_bytes());
    }
    bytes
}

/// Audio encoder for converting normalized buffers to various formats
#[derive(Debug, Default, Clone, Copy)]
pub struct AudioEncoder;

impl AudioEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a buffer to the specified format
    pub fn encode(&self, buffer: &AudioBuffer, format: AudioFormat) -> Result<Vec<u8>> {
        match format {
            AudioFormat::Wav => self.encode_wav(buffer),
            AudioFormat::RawF32 => Ok(self.encode_raw_f32(buffer)),
            AudioFormat::RawI16 => Ok(encode_pcm16(buffer)),
        }
    }

    fn encode_wav(&self, buffer: &AudioBuffer) -> Result<Vec<u8>> {
        let channels = u16::try_from(buffer.channel_count())
            .map_err(|_| Error::AudioError("too many channels for WAV".to_string()))?;
        let spec = WavSpec {
            channels,
            sample_rate: buffer.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec)?;
            for sample in buffer.interleaved() {
                writer.write_sample(quantize(sample))?;
            }
            writer.finalize()?;
        }

        debug!(
            "Encoded {} frames to WAV ({} bytes)",
            buffer.frame_count(),
            cursor.get_ref().len()
        );
        Ok(cursor.into_inner())
    }

    fn encode_raw_f32(&self, buffer: &AudioBuffer) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(buffer.frame_count() * buffer.channel_count() * 4);
        for sample in buffer.interleaved() {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }

    /// Get content type for format
    pub fn content_type(format: AudioFormat) -> &'static str {
        match format {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::RawF32 | AudioFormat::RawI16 => "application/octet-stream",
        }
    }
}
