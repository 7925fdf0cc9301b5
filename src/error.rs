//! Error types for Parley
//!
//! Failures never take the widget down: most of them are logged and the
//! operation that produced them simply does nothing.

use thiserror::Error;

/// Parley errors
#[derive(Error, Debug, Clone)]
pub enum ParleyError {
    /// Transport-level failure talking to the chat backend
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Backend answered with a non-success status
    #[error("Backend error ({status}): {message}")]
    BackendError { status: u16, message: String },

    /// Backend payload could not be decoded
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Audio device initialization or operation error
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    /// Model file missing or unloadable
    #[error("Model load error: {0}")]
    ModelLoadError(String),

    /// Speech recognition error
    #[error("Transcription error: {0}")]
    TranscriptionError(String),

    /// Speech synthesis error
    #[error("TTS error: {0}")]
    TTSError(String),

    /// Remote audio fetch/decode/playback error
    #[error("Playback error: {0}")]
    PlaybackError(String),

    /// Audio processing error (resampling, VAD)
    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Channel communication error
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// File system I/O error
    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for ParleyError {
    fn from(e: std::io::Error) -> Self {
        ParleyError::IOError(e.to_string())
    }
}

impl From<reqwest::Error> for ParleyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ParleyError::DecodeError(e.to_string())
        } else {
            ParleyError::HttpError(e.to_string())
        }
    }
}

impl ParleyError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ParleyError::HttpError(_) => true,
            ParleyError::BackendError { status, .. } => *status >= 500,
            ParleyError::DecodeError(_) => false,
            // Hardware/device errors may require user intervention
            ParleyError::AudioDeviceError(_) => false,
            ParleyError::ModelLoadError(_) => false,
            ParleyError::TranscriptionError(_) => true,
            ParleyError::TTSError(_) => true,
            ParleyError::PlaybackError(_) => true,
            ParleyError::AudioProcessingError(_) => true,
            ParleyError::ConfigError(_) => false,
            ParleyError::ChannelError(_) => false,
            ParleyError::IOError(_) => false,
        }
    }
}

/// Result type alias for Parley operations
pub type Result<T> = std::result::Result<T, ParleyError>;
