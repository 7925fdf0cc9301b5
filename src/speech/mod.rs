//! Speech input and output
//!
//! This module provides:
//! - The recognizer and synthesizer capabilities the UI talks to
//! - Controllers that turn them into listening/speaking state
//! - Native implementations: Whisper for recognition, VITS via sherpa-rs for synthesis

pub mod input;
pub mod output;
pub mod recognition;
pub mod sherpa;
pub mod synthesis;
#[cfg(feature = "audio-io")]
pub mod whisper;

pub use input::{DebounceTimer, ListeningState, SpeechInputController, SpeechInputUpdate};
pub use output::SpeechOutputController;
pub use recognition::{
    join_transcript, Alternative, RecognitionEvent, RecognitionResult, SpeechRecognizer,
};
pub use sherpa::SherpaSynthesizer;
pub use synthesis::{SpeechSynthesizer, SynthesisEvent, Utterance, Voice, VoiceCatalog};
#[cfg(feature = "audio-io")]
pub use whisper::{WhisperConfig, WhisperRecognizer};
