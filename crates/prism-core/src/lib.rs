//! Prism Core - speech decoding and topic briefing orchestration
//!
//! This crate turns generated narration (base64, little-endian, interleaved
//! 16-bit PCM) into normalized planar `f32` buffers, and coordinates the
//! text, image and speech collaborators that make up a topic briefing.
//!
//! # Example
//!
//! ```
//! use prism_core::audio::{decode_base64_pcm16, PcmFormat};
//!
//! // Samples [0, 16384] at 24 kHz mono
//! let buffer = decode_base64_pcm16("AAAAQA==", PcmFormat::SPEECH)?;
//! assert_eq!(buffer.channel(0), Some(&[0.0, 0.5][..]));
//! # Ok::<(), prism_core::Error>(())
//! ```

pub mod audio;
pub mod briefing;
pub mod config;
pub mod error;
pub mod gateway;

pub use audio::{AudioBuffer, FramingPolicy, PcmDecoder, PcmFormat};
pub use briefing::{AnalysisRecord, Briefing, BriefingPipeline};
pub use config::PrismConfig;
pub use error::{Error, Result};
pub use gateway::GatewayClient;
