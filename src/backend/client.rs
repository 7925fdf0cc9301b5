//! Async HTTP client for the chat backend

use crate::backend::types::{
    ChatReply, ChatRequest, ErrorBody, InstructionCatalog, NewSessionResponse, SessionId,
};
use crate::config::BackendConfig;
use crate::{ParleyError, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, Url};
use tracing::debug;

/// Header that suppresses the interstitial page of the ngrok tunnel
pub const PROXY_WARNING_HEADER: &str = "ngrok-skip-browser-warning";

pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if config.skip_proxy_warning {
            headers.insert(PROXY_WARNING_HEADER, HeaderValue::from_static("true"));
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ParleyError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /instruction_sets`
    pub async fn fetch_instruction_sets(&self) -> Result<InstructionCatalog> {
        let url = format!("{}/instruction_sets", self.base_url);
        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;

        let catalog: InstructionCatalog = response.json().await?;
        debug!("Fetched {} instruction sets", catalog.len());
        Ok(catalog)
    }

    /// `GET /new_session`
    pub async fn new_session(&self) -> Result<SessionId> {
        let url = format!("{}/new_session", self.base_url);
        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;

        let body: NewSessionResponse = response.json().await?;
        Ok(body.session_id)
    }

    /// `POST /chat`
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        let url = format!("{}/chat", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        let response = check_status(response).await?;

        let reply: ChatReply = response.json().await?;
        Ok(reply)
    }
}

/// Resolve an audio URL returned by the backend against its base URL.
///
/// Absolute URLs are returned unchanged.
pub fn resolve_audio_url(base_url: &str, raw: &str) -> Result<String> {
    if let Ok(url) = Url::parse(raw) {
        return Ok(url.to_string());
    }

    let mut base = Url::parse(base_url)
        .map_err(|e| ParleyError::ConfigError(format!("Invalid base URL {}: {}", base_url, e)))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(raw.trim_start_matches('/'))
        .map(|url| url.to_string())
        .map_err(|e| ParleyError::PlaybackError(format!("Invalid audio URL {}: {}", raw, e)))
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body);

    Err(ParleyError::BackendError {
        status: status.as_u16(),
        message,
    })
}
