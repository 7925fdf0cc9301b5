//! Audio plumbing for the native speech capabilities
//!
//! - `input`: microphone capture (cpal)
//! - `resampler`: streaming sample-rate conversion (rubato)
//! - `vad`: voice activity detection (Silero)
//! - `player`: playback of reply audio URLs (rodio)

#[cfg(feature = "audio-io")]
pub mod input;
pub mod player;
pub mod resampler;
pub mod vad;

#[cfg(feature = "audio-io")]
pub use input::MicCapture;
pub use player::{AudioUrlPlayer, RemoteAudioPlayer};
pub use resampler::StreamResampler;
pub use vad::VoiceActivityDetector;
