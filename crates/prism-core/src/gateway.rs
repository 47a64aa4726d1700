//! HTTP client for the generation gateway
//!
//! The gateway owns prompt construction and model selection. Prism forwards
//! the topic, image prompt or narration script and parses the reply.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio::PcmFormat;
use crate::briefing::{
    AnalysisRecord, ImageAsset, ImageGenerator, SpeechGenerator, SpeechPayload, TextAnalyzer,
};
use crate::config::{DecoderConfig, GatewayConfig};
use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
struct AnalysisRequest<'a> {
    topic: &'a str,
}

/// The gateway relays the model's raw text; structure is parsed here.
#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    image_base64: Option<String>,
    #[serde(default = "default_image_mime")]
    mime_type: String,
}

fn default_image_mime() -> String {
    "image/png".to_string()
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    script: &'a str,
}

#[derive(Debug, Deserialize)]
struct SpeechResponse {
    audio_base64: Option<String>,
    #[serde(default)]
    sample_rate: Option<u32>,
    #[serde(default)]
    channels: Option<u16>,
}

/// Which collaborator a call belongs to, for error naming
#[derive(Debug, Clone, Copy)]
enum Call {
    Analysis,
    Image,
    Speech,
}

impl Call {
    fn error(self, message: String) -> Error {
        match self {
            Call::Analysis => Error::Analysis(message),
            Call::Image => Error::ImageGeneration(message),
            Call::Speech => Error::SpeechGeneration(message),
        }
    }
}

/// Gateway-backed implementation of all three collaborators
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    analysis_timeout: Duration,
    media_timeout: Duration,
    speech_format: PcmFormat,
}

impl GatewayClient {
    pub fn new(gateway: &GatewayConfig, decoder: &DecoderConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("prism/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: gateway.base_url.trim_end_matches('/').to_string(),
            api_key: gateway.api_key.clone(),
            analysis_timeout: Duration::from_secs(gateway.analysis_timeout_secs),
            media_timeout: Duration::from_secs(gateway.media_timeout_secs),
            speech_format: decoder.format()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post<B: Serialize>(&self, path: &str, body: &B, timeout: Duration) -> RequestBuilder {
        let request = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .timeout(timeout)
            .json(body);
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn call<B, T>(&self, call: Call, path: &str, body: &B, timeout: Duration) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        debug!("Gateway request {:?} -> {}", call, path);
        let response = self
            .post(path, body, timeout)
            .send()
            .await
            .map_err(|e| call.error(format!("request failed: {}", e)))?;
        let response = check_status(call, response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| call.error(format!("unreadable response: {}", e)))
    }

    fn speech_format(&self, reply: &SpeechResponse) -> Result<PcmFormat> {
        PcmFormat::new(
            reply.sample_rate.unwrap_or(self.speech_format.sample_rate()),
            reply.channels.unwrap_or(self.speech_format.channels()),
        )
        .map_err(|e| Error::SpeechGeneration(e.to_string()))
    }
}

async fn check_status(call: Call, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(call.error(format!("gateway returned {}: {}", status, body.trim())))
}

impl TextAnalyzer for GatewayClient {
    async fn analyze(&self, topic: &str) -> Result<AnalysisRecord> {
        let reply: AnalysisResponse = self
            .call(
                Call::Analysis,
                "/v1/analysis",
                &AnalysisRequest { topic },
                self.analysis_timeout,
            )
            .await?;
        let text = reply
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Analysis("no text in response".to_string()))?;
        AnalysisRecord::parse(&text)
    }
}

impl ImageGenerator for GatewayClient {
    async fn generate_image(&self, prompt: &str) -> Result<ImageAsset> {
        let reply: ImageResponse = self
            .call(
                Call::Image,
                "/v1/images",
                &ImageRequest { prompt },
                self.media_timeout,
            )
            .await?;
        let data = reply
            .image_base64
            .ok_or_else(|| Error::ImageGeneration("no image in response".to_string()))?;
        ImageAsset::from_base64(reply.mime_type, &data)
    }
}

impl SpeechGenerator for GatewayClient {
    async fn synthesize(&self, script: &str) -> Result<SpeechPayload> {
        let reply: SpeechResponse = self
            .call(
                Call::Speech,
                "/v1/speech",
                &SpeechRequest { script },
                self.media_timeout,
            )
            .await?;
        let format = self.speech_format(&reply)?;
        let audio_base64 = reply
            .audio_base64
            .filter(|a| !a.is_empty())
            .ok_or_else(|| Error::SpeechGeneration("no audio in response".to_string()))?;
        Ok(SpeechPayload {
            audio_base64,
            format,
        })
    }
}
