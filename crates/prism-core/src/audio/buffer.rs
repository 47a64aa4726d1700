//! Normalized multi-channel sample buffer handed to playback

use std::time::Duration;

use crate::error::{Error, Result};

/// Planar floating-point audio, one `Vec<f32>` per channel.
///
/// Values produced by the PCM decoder lie in `[-1.0, 1.0)`. The buffer is
/// immutable once built; callers own it outright and drop it when done.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build a buffer from planar channel data.
    ///
    /// Every channel must have the same number of frames and there must be
    /// at least one channel.
    pub fn from_channels(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidFormat("sample rate must be positive".to_string()));
        }
        let Some(first) = channels.first() else {
            return Err(Error::InvalidFormat(
                "at least one channel is required".to_string(),
            ));
        };
        let frames = first.len();
        if let Some(bad) = channels.iter().position(|c| c.len() != frames) {
            return Err(Error::InvalidFormat(format!(
                "channel {} has {} frames, expected {}",
                bad,
                channels[bad].len(),
                frames
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Caller guarantees a positive rate, at least one channel and equal lengths.
    pub(crate) fn from_parts(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        debug_assert!(sample_rate > 0);
        debug_assert!(!channels.is_empty());
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Samples for one channel, or `None` when out of range
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Playback length at the buffer's sample rate
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }

    /// Samples in frame-major (interleaved) order
    pub fn interleaved(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.frame_count())
            .flat_map(move |frame| self.channels.iter().map(move |channel| channel[frame]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_channels_rejects_ragged() {
        let err = AudioBuffer::from_channels(24000, vec![vec![0.0; 3], vec![0.0; 2]]).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_from_channels_rejects_empty() {
        assert!(AudioBuffer::from_channels(24000, Vec::new()).is_err());
        assert!(AudioBuffer::from_channels(0, vec![vec![0.0]]).is_err());
    }

    #[test]
    fn test_duration_and_interleaving() {
        let buffer =
            AudioBuffer::from_channels(4, vec![vec![0.1, 0.2], vec![-0.1, -0.2]]).unwrap();

        assert_eq!(buffer.frame_count(), 2);
        assert_eq!(buffer.duration(), Duration::from_millis(500));
        let interleaved: Vec<f32> = buffer.interleaved().collect();
        assert_eq!(interleaved, vec![0.1, -0.1, 0.2, -0.2]);
    }
}
