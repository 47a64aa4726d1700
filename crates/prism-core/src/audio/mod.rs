//! Audio decoding, encoding and playback for generated speech

mod buffer;
mod encoder;
mod pcm;
mod playback;

pub use buffer::AudioBuffer;
pub use encoder::{encode_pcm16, quantize, AudioEncoder, AudioFormat};
pub use pcm::{
    decode_base64, decode_base64_pcm16, decode_pcm16, decode_with_policy, FramingPolicy,
    PcmDecoder, PcmFormat, PCM16_SCALE,
};
pub use playback::{AudioDevice, DeviceConfig, Playback, PlaybackEnd};
