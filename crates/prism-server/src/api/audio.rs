//! PCM decoding endpoints

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use prism_core::audio::{
    AudioBuffer, AudioEncoder, AudioFormat, FramingPolicy, PcmDecoder, PcmFormat,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Base64 PCM16 payload; omitted fields fall back to the decoder config
#[derive(Debug, Deserialize)]
pub struct DecodeRequest {
    pub audio_base64: String,
    #[serde(default)]
    pub sample_rate: Option<u32>,
    #[serde(default)]
    pub channels: Option<u16>,
    #[serde(default)]
    pub strict: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct DecodeResponse {
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: usize,
    pub duration_ms: f64,
    pub channel_data: Vec<Vec<f32>>,
}

impl From<AudioBuffer> for DecodeResponse {
    fn from(buffer: AudioBuffer) -> Self {
        Self {
            sample_rate: buffer.sample_rate(),
            channels: buffer.channel_count(),
            frames: buffer.frame_count(),
            duration_ms: buffer.duration().as_secs_f64() * 1000.0,
            channel_data: buffer.into_channels(),
        }
    }
}

fn decode_request(state: &AppState, req: &DecodeRequest) -> Result<AudioBuffer, ApiError> {
    let defaults = &state.config.decoder;
    let format = PcmFormat::new(
        req.sample_rate.unwrap_or(defaults.sample_rate),
        req.channels.unwrap_or(defaults.channels),
    )?;
    let policy = match req.strict {
        Some(true) => FramingPolicy::Strict,
        Some(false) => FramingPolicy::Truncate,
        None => defaults.policy(),
    };
    let buffer = PcmDecoder::new(format)
        .with_policy(policy)
        .decode_base64(&req.audio_base64)?;
    info!(
        "Decoded PCM payload: {} frames x {} channels at {} Hz",
        buffer.frame_count(),
        buffer.channel_count(),
        buffer.sample_rate()
    );
    Ok(buffer)
}

/// Decode to planar float samples
pub async fn decode(
    State(state): State<AppState>,
    Json(req): Json<DecodeRequest>,
) -> Result<Json<DecodeResponse>, ApiError> {
    let buffer = decode_request(&state, &req)?;
    Ok(Json(buffer.into()))
}

/// Decode and re-wrap as a WAV file
pub async fn wav(
    State(state): State<AppState>,
    Json(req): Json<DecodeRequest>,
) -> Result<Response, ApiError> {
    let buffer = decode_request(&state, &req)?;
    let bytes = AudioEncoder::new().encode(&buffer, AudioFormat::Wav)?;
    Ok((
        [(
            header::CONTENT_TYPE,
            AudioEncoder::content_type(AudioFormat::Wav),
        )],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::super::create_router;
    use super::super::tests::{post_json, send, test_state};
    use crate::state::AppState;
    use axum::http::StatusCode;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use prism_core::PrismConfig;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_decode_mono() {
        let router = create_router(test_state());
        // [0, 16384, -32768, 32767]
        let request = post_json(
            "/v1/audio/decode",
            json!({ "audio_base64": "AAAAQACA/38=" }),
        );
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["sample_rate"], 24000);
        assert_eq!(body["channels"], 1);
        assert_eq!(body["frames"], 4);
        assert_eq!(body["channel_data"][0][1], 0.5);
        assert_eq!(body["channel_data"][0][2], -1.0);
    }

    #[tokio::test]
    async fn test_decode_stereo_override() {
        let router = create_router(test_state());
        let request = post_json(
            "/v1/audio/decode",
            json!({ "audio_base64": "AAAAQACA/38=", "channels": 2, "sample_rate": 8000 }),
        );
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["channels"], 2);
        assert_eq!(body["frames"], 2);
        assert_eq!(body["channel_data"][0][1], -1.0);
        assert_eq!(body["channel_data"][1][0], 0.5);
    }

    #[tokio::test]
    async fn test_strict_rejects_misaligned() {
        let router = create_router(test_state());
        let request = post_json(
            "/v1/audio/decode",
            json!({ "audio_base64": "AABA", "strict": true }),
        );
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], 400);
    }

    #[tokio::test]
    async fn test_invalid_base64_and_channels() {
        let request = post_json("/v1/audio/decode", json!({ "audio_base64": "%%%" }));
        let (status, _) = send(create_router(test_state()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = post_json(
            "/v1/audio/decode",
            json!({ "audio_base64": "AAAA", "channels": 0 }),
        );
        let (status, _) = send(create_router(test_state()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wav_response() {
        let router = create_router(test_state());
        let request = post_json("/v1/audio/wav", json!({ "audio_base64": "AAAAQACA/38=" }));
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..4], b"RIFF");
        assert_eq!(&body[8..12], b"WAVE");
        // header + 4 samples
        assert!(body.len() >= 44 + 8);
    }

    #[tokio::test]
    async fn test_decode_accepts_long_narration() {
        // 40 s of 24 kHz mono silence: a body well past axum's 2 MB default
        let pcm = vec![0u8; 40 * 24000 * 2];
        let request = post_json(
            "/v1/audio/decode",
            json!({ "audio_base64": STANDARD.encode(&pcm) }),
        );
        let (status, body) = send(create_router(test_state()), request).await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["frames"], 40 * 24000);
        assert_eq!(body["duration_ms"], 40_000.0);
    }

    #[tokio::test]
    async fn test_body_limit_follows_config() {
        let mut config = PrismConfig::default();
        config.server.max_body_bytes = 64;
        let router = create_router(AppState::new(config).unwrap());

        let pcm = vec![0u8; 96];
        let request = post_json(
            "/v1/audio/decode",
            json!({ "audio_base64": STANDARD.encode(&pcm) }),
        );
        let (status, _) = send(router, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
