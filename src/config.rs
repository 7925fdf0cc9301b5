//! Configuration for Parley
//!
//! Settings are read from a TOML file (`$PARLEY_CONFIG`, or
//! `<config dir>/parley/config.toml`) and fall back to defaults for anything
//! missing. `PARLEY_BACKEND_URL` overrides the backend base URL.

use crate::{ParleyError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "PARLEY_CONFIG";

/// Environment variable overriding the backend base URL
pub const BACKEND_URL_ENV: &str = "PARLEY_BACKEND_URL";

/// Chat backend settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the chat backend, without trailing slash
    pub base_url: String,

    /// Send the `ngrok-skip-browser-warning` header on every request
    pub skip_proxy_warning: bool,

    /// Per-request timeout in seconds (None = wait indefinitely)
    pub request_timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            skip_proxy_warning: true,
            request_timeout_secs: Some(60),
        }
    }
}

impl BackendConfig {
    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Speech input/output settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeechConfig {
    /// Silence after the last recognition result before the transcript is sent
    pub silence_timeout_ms: u64,

    /// Quiet audio after which a listening session with nothing left to say ends
    pub no_speech_timeout_ms: u64,

    /// Also synthesize the reply when the backend supplied an audio URL
    pub synthesize_with_audio_url: bool,

    /// Path to the Whisper model file
    pub whisper_model: PathBuf,

    /// Language to transcribe (None for auto-detection)
    pub language: Option<String>,

    /// Number of threads to use for transcription
    pub n_threads: i32,

    /// Speech probability threshold for the VAD (0.0-1.0)
    pub vad_threshold: f32,

    /// Directory holding one subdirectory per VITS voice
    pub voices_dir: PathBuf,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            silence_timeout_ms: 2000,
            no_speech_timeout_ms: 8000,
            synthesize_with_audio_url: false,
            whisper_model: PathBuf::from("models/ggml-base.en.bin"),
            language: Some("en".to_string()),
            n_threads: 4,
            vad_threshold: 0.5,
            voices_dir: PathBuf::from("voices"),
        }
    }
}

impl SpeechConfig {
    /// Debounce delay as a duration
    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms)
    }
}

/// Window settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 760.0,
        }
    }
}

/// Complete application configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParleyConfig {
    pub backend: BackendConfig,
    pub speech: SpeechConfig,
    pub window: WindowConfig,
}

impl ParleyConfig {
    /// Load configuration from the standard locations and the environment
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!("No config file at {:?}, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            config = config.with_backend_url(url);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading config from {:?}", path);
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(text)
            .map_err(|e| ParleyError::ConfigError(format!("Invalid config: {}", e)))?;
        config.normalize();
        Ok(config)
    }

    /// Set the backend base URL
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend.base_url = url.into();
        self.normalize();
        self
    }

    /// Set the silence debounce delay
    pub fn with_silence_timeout(mut self, timeout: Duration) -> Self {
        self.speech.silence_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.is_empty() {
            return Err(ParleyError::ConfigError(
                "Backend base URL is required".to_string(),
            ));
        }

        reqwest::Url::parse(&self.backend.base_url).map_err(|e| {
            ParleyError::ConfigError(format!(
                "Invalid backend URL {}: {}",
                self.backend.base_url, e
            ))
        })?;

        if self.speech.silence_timeout_ms == 0 {
            return Err(ParleyError::ConfigError(
                "Silence timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    fn normalize(&mut self) {
        let trimmed = self.backend.base_url.trim().trim_end_matches('/');
        self.backend.base_url = trimmed.to_string();
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("parley").join("config.toml"))
}
