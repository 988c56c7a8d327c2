//! Audio rendering: PCM encoding, WAV persistence, playback-rate conversion

pub mod encode;
pub mod resample;
pub mod wav;

pub use encode::{encode, encode_with, AudioBuffer, EncoderConfig};
pub use resample::resample;
pub use wav::{read_wav, write_wav, write_wavfile};
