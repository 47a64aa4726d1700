//! Topic briefings: text analysis plus generated image and narration
//!
//! A briefing is built in two stages. The text analysis comes first and is
//! mandatory. Its image prompt and narration script then feed the image and
//! speech collaborators, which run concurrently and fail independently.

mod analysis;
mod pipeline;

use std::future::Future;

use base64::Engine;
use bytes::Bytes;

pub use analysis::{AnalysisRecord, ChartPoint};
pub use pipeline::{Briefing, BriefingPipeline};

use crate::audio::PcmFormat;
use crate::error::Result;

/// Produces a structured analysis for a topic
pub trait TextAnalyzer {
    fn analyze(&self, topic: &str) -> impl Future<Output = Result<AnalysisRecord>> + Send;
}

/// Turns an image prompt into encoded image bytes
pub trait ImageGenerator {
    fn generate_image(&self, prompt: &str) -> impl Future<Output = Result<ImageAsset>> + Send;
}

/// Turns a narration script into base64 PCM
pub trait SpeechGenerator {
    fn synthesize(&self, script: &str) -> impl Future<Output = Result<SpeechPayload>> + Send;
}

/// Generated image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub mime_type: String,
    pub data: Bytes,
}

impl ImageAsset {
    pub fn from_base64(mime_type: impl Into<String>, data_base64: &str) -> Result<Self> {
        let data = base64::engine::general_purpose::STANDARD.decode(data_base64.trim())?;
        Ok(Self {
            mime_type: mime_type.into(),
            data: Bytes::from(data),
        })
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

/// Base64 PCM16 audio plus the layout needed to decode it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechPayload {
    pub audio_base64: String,
    pub format: PcmFormat,
}
