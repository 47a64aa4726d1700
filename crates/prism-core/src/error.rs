//! Error types for the Prism briefing engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid PCM format: {0}")]
    InvalidFormat(String),

    #[error("PCM framing error: {len} bytes is not a multiple of the {frame_bytes}-byte frame")]
    Framing { len: usize, frame_bytes: usize },

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Audio encoding error: {0}")]
    AudioError(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Image generation failed: {0}")]
    ImageGeneration(String),

    #[error("Speech generation failed: {0}")]
    SpeechGeneration(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<hound::Error> for Error {
    fn from(e: hound::Error) -> Self {
        Error::AudioError(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::ConfigError(e.to_string())
    }
}
