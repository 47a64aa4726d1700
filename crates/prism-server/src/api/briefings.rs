//! Topic briefing endpoint

use axum::{extract::State, Json};
use base64::Engine;
use prism_core::audio::{AudioEncoder, AudioFormat};
use prism_core::briefing::{AnalysisRecord, Briefing};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BriefingRequest {
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct ImagePart {
    pub mime_type: String,
    pub data_base64: String,
}

#[derive(Debug, Serialize)]
pub struct AudioPart {
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: usize,
    pub duration_ms: f64,
    pub wav_base64: String,
}

/// Media parts are `null` with an error message when their generation failed
#[derive(Debug, Serialize)]
pub struct BriefingResponse {
    pub id: String,
    pub topic: String,
    pub analysis: AnalysisRecord,
    pub image: Option<ImagePart>,
    pub image_error: Option<String>,
    pub audio: Option<AudioPart>,
    pub audio_error: Option<String>,
}

impl BriefingResponse {
    fn from_briefing(briefing: Briefing) -> Self {
        let (image, image_error) = match briefing.image {
            Ok(asset) => (
                Some(ImagePart {
                    data_base64: asset.to_base64(),
                    mime_type: asset.mime_type,
                }),
                None,
            ),
            Err(e) => (None, Some(e.to_string())),
        };

        let audio = briefing.audio.and_then(|buffer| {
            let wav = AudioEncoder::new().encode(&buffer, AudioFormat::Wav)?;
            Ok(AudioPart {
                sample_rate: buffer.sample_rate(),
                channels: buffer.channel_count(),
                frames: buffer.frame_count(),
                duration_ms: buffer.duration().as_secs_f64() * 1000.0,
                wav_base64: base64::engine::general_purpose::STANDARD.encode(wav),
            })
        });
        let (audio, audio_error) = match audio {
            Ok(part) => (Some(part), None),
            Err(e) => (None, Some(e.to_string())),
        };

        Self {
            id: briefing.id.to_string(),
            topic: briefing.topic,
            analysis: briefing.analysis,
            image,
            image_error,
            audio,
            audio_error,
        }
    }
}

/// Generate a briefing; only an analysis failure fails the request
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<BriefingRequest>,
) -> Result<Json<BriefingResponse>, ApiError> {
    info!("Briefing request: {} chars", req.topic.len());
    let briefing = state.pipeline.run(&req.topic).await?;
    Ok(Json(BriefingResponse::from_briefing(briefing)))
}
