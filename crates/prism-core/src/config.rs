//! Configuration types for the Prism briefing engine

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::audio::{FramingPolicy, PcmFormat};
use crate::error::{Error, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrismConfig {
    #[serde(default)]
    pub decoder: DecoderConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl PrismConfig {
    /// Parse a TOML document; missing keys fall back to defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Per-user config file location, e.g. `~/.config/prism/prism.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prism")
            .join("prism.toml")
    }
}

/// Speech payload decoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Sample rate assumed for speech payloads (Hz)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Interleaved channel count of speech payloads
    #[serde(default = "default_channels")]
    pub channels: u16,

    /// Reject misaligned payloads instead of truncating them
    #[serde(default)]
    pub strict_framing: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            strict_framing: false,
        }
    }
}

impl DecoderConfig {
    pub fn format(&self) -> Result<PcmFormat> {
        PcmFormat::new(self.sample_rate, self.channels)
            .map_err(|e| Error::ConfigError(format!("decoder: {}", e)))
    }

    pub fn policy(&self) -> FramingPolicy {
        if self.strict_framing {
            FramingPolicy::Strict
        } else {
            FramingPolicy::Truncate
        }
    }
}

fn default_sample_rate() -> u32 {
    24000
}

fn default_channels() -> u16 {
    1
}

/// Generation gateway connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the generation gateway
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request, if any
    #[serde(default)]
    pub api_key: Option<String>,

    /// Timeout for the text analysis call
    #[serde(default = "default_analysis_timeout_secs")]
    pub analysis_timeout_secs: u64,

    /// Timeout for image and speech calls
    #[serde(default = "default_media_timeout_secs")]
    pub media_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            analysis_timeout_secs: default_analysis_timeout_secs(),
            media_timeout_secs: default_media_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:9090".to_string()
}

fn default_analysis_timeout_secs() -> u64 {
    60
}

fn default_media_timeout_secs() -> u64 {
    120
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Largest accepted request body; base64 speech at 24 kHz mono is ~64 KB/s
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_cors_enabled(),
            cors_origins: vec!["*".to_string()],
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_enabled() -> bool {
    true
}

fn default_max_body_bytes() -> usize {
    32 * 1024 * 1024
}
