//! Scoped playback device and single-shot completion handles
//!
//! An [`AudioDevice`] is acquired per screen or session and released when it
//! is dropped or closed, which stops every playback still running on it.
//! Each [`Playback`] resolves exactly once, either when the buffer has run
//! for its full duration on the tokio clock or when it is stopped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tracing::{debug, info};

use super::buffer::AudioBuffer;
use crate::error::{Error, Result};

/// How a playback ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// The whole buffer was played
    Completed,
    /// Stopped explicitly or by closing the device
    Stopped,
}

/// Device handle configuration
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Label used in logs
    pub name: String,
    /// Maximum number of buffers playing at once
    pub max_voices: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            max_voices: 8,
        }
    }
}

/// Fires at most once.
#[derive(Debug)]
struct StopSignal {
    tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl StopSignal {
    fn new(tx: oneshot::Sender<()>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    fn fire(&self) -> bool {
        let sender = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }
}

type VoiceMap = Arc<Mutex<HashMap<u64, Arc<StopSignal>>>>;

/// An acquired output device
pub struct AudioDevice {
    config: DeviceConfig,
    voices: VoiceMap,
    next_id: AtomicU64,
    closed: bool,
}

impl AudioDevice {
    /// Acquire a device handle
    pub fn open(config: DeviceConfig) -> Self {
        info!("Opened audio device '{}'", config.name);
        Self {
            config,
            voices: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            closed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Number of playbacks that have not finished yet
    pub fn active_count(&self) -> usize {
        self.voices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Schedule a buffer for playback. Must be called inside a tokio runtime.
    pub fn play(&self, buffer: AudioBuffer) -> Result<Playback> {
        if self.closed {
            return Err(Error::Playback(format!(
                "device '{}' is closed",
                self.config.name
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (stop_tx, stop_rx) = oneshot::channel();
        let stop = Arc::new(StopSignal::new(stop_tx));
        {
            let mut voices = self.voices.lock().unwrap_or_else(PoisonError::into_inner);
            if voices.len() >= self.config.max_voices {
                return Err(Error::Playback(format!(
                    "device '{}' is already playing {} buffers",
                    self.config.name,
                    voices.len()
                )));
            }
            voices.insert(id, stop.clone());
        }

        let duration = buffer.duration();
        let (done_tx, done_rx) = watch::channel(None);
        let voices = self.voices.clone();

        debug!(
            "Playback {} started: {} frames x {} channels, {:?}",
            id,
            buffer.frame_count(),
            buffer.channel_count(),
            duration
        );

        tokio::spawn(async move {
            let end = tokio::select! {
                biased;
                _ = stop_rx => PlaybackEnd::Stopped,
                _ = tokio::time::sleep(duration) => PlaybackEnd::Completed,
            };
            drop(buffer);
            voices
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
            debug!("Playback {} ended: {:?}", id, end);
            let _ = done_tx.send(Some(end));
        });

        Ok(Playback {
            id,
            duration,
            stop,
            done: done_rx,
        })
    }

    /// Stop everything and release the device
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let voices: Vec<Arc<StopSignal>> = self
            .voices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, stop)| stop)
            .collect();
        for stop in &voices {
            stop.fire();
        }
        info!(
            "Closed audio device '{}' ({} playbacks stopped)",
            self.config.name,
            voices.len()
        );
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.close();
    }
}

/// Handle to one scheduled buffer
pub struct Playback {
    id: u64,
    duration: Duration,
    stop: Arc<StopSignal>,
    done: watch::Receiver<Option<PlaybackEnd>>,
}

impl Playback {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Full length of the scheduled buffer
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Stop playback. Returns `true` only for the call that actually stopped it.
    pub fn stop(&self) -> bool {
        self.stop.fire()
    }

    /// Outcome if the playback has already ended
    pub fn outcome(&self) -> Option<PlaybackEnd> {
        *self.done.borrow()
    }

    /// Wait for the playback to end
    pub async fn finished(&self) -> PlaybackEnd {
        let mut done = self.done.clone();
        let end = match done.wait_for(Option::is_some).await {
            Ok(end) => end.unwrap_or(PlaybackEnd::Stopped),
            // The playback task was torn down with its runtime.
            Err(_) => PlaybackEnd::Stopped,
        };
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_second_mono() -> AudioBuffer {
        AudioBuffer::from_channels(100, vec![vec![0.0; 100]]).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_completes() {
        let device = AudioDevice::open(DeviceConfig::default());
        let playback = device.play(one_second_mono()).unwrap();
        assert_eq!(playback.duration(), Duration::from_secs(1));
        assert_eq!(device.active_count(), 1);

        let start = tokio::time::Instant::now();
        assert_eq!(playback.finished().await, PlaybackEnd::Completed);
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert_eq!(device.active_count(), 0);
        assert_eq!(playback.outcome(), Some(PlaybackEnd::Completed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_single_shot() {
        let device = AudioDevice::open(DeviceConfig::default());
        let playback = device.play(one_second_mono()).unwrap();

        assert!(playback.stop());
        assert!(!playback.stop());
        assert_eq!(playback.finished().await, PlaybackEnd::Stopped);
        assert!(!playback.stop());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_after_completion_is_noop() {
        let device = AudioDevice::open(DeviceConfig::default());
        let playback = device.play(one_second_mono()).unwrap();
        assert_eq!(playback.finished().await, PlaybackEnd::Completed);
        assert!(!playback.stop());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_device_stops_playbacks() {
        let device = AudioDevice::open(DeviceConfig::default());
        let first = device.play(one_second_mono()).unwrap();
        let second = device.play(one_second_mono()).unwrap();
        drop(device);

        assert_eq!(first.finished().await, PlaybackEnd::Stopped);
        assert_eq!(second.finished().await, PlaybackEnd::Stopped);
        assert!(!first.stop());
    }

    #[tokio::test]
    async fn test_closed_device_rejects_play() {
        let mut device = AudioDevice::open(DeviceConfig::default());
        device.close();
        assert!(device.is_closed());
        assert!(matches!(
            device.play(one_second_mono()),
            Err(Error::Playback(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_voice_limit() {
        let device = AudioDevice::open(DeviceConfig {
            name: "limited".to_string(),
            max_voices: 1,
        });
        let playing = device.play(one_second_mono()).unwrap();
        assert!(device.play(one_second_mono()).is_err());

        playing.finished().await;
        assert!(device.play(one_second_mono()).is_ok());
    }
}
