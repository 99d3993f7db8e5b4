//! OpenAI-compatible backend implementation.
//!
//! Works with: OpenAI, DashScope compatible mode, OpenRouter, vLLM, and any
//! endpoint exposing `/v1/chat/completions`. The reply text lives at
//! `choices[0].message.content`.

use async_trait::async_trait;
use serde::Deserialize;
use stagehand_config::RemoteBackendConfig;
use stagehand_core::{Backend, ChatRequest, RawResponse, TransportError};
use tracing::debug;

use crate::{http_client, into_raw, transport_error};

/// A remote OpenAI-compatible backend with bearer-token auth.
pub struct OpenAiCompatBackend {
    name: String,
    base_url: String,
    chat_path: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatBackend {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chat_path: "/v1/chat/completions".into(),
            api_key: api_key.into(),
            client: http_client(timeout_secs)?,
        })
    }

    /// Build from the `[remote]` configuration section.
    pub fn from_config(config: &RemoteBackendConfig) -> Result<Self, TransportError> {
        let api_key = config.api_key.clone().unwrap_or_default();
        Ok(
            Self::new("remote", &config.base_url, api_key, config.timeout_secs)?
                .with_chat_path(&config.chat_path),
        )
    }

    /// Override the chat endpoint path (default `/v1/chat/completions`).
    pub fn with_chat_path(mut self, path: impl Into<String>) -> Self {
        self.chat_path = path.into();
        self
    }

    fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.chat_path)
    }
}

#[async_trait]
impl Backend for OpenAiCompatBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: &ChatRequest) -> Result<RawResponse, TransportError> {
        let url = self.chat_url();
        debug!(backend = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        into_raw(&url, response).await
    }

    async fn list_models(&self) -> Result<Vec<String>, TransportError> {
        let url = format!("{}/v1/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Network(format!(
                "failed to get model list: HTTP {}",
                status.as_u16()
            )));
        }

        let models: ModelsResponse = response.json().await.map_err(transport_error)?;
        Ok(models.data.into_iter().map(|m| m.id).collect())
    }
}

// --- OpenAI API types ---

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ApiModel>,
}

#[derive(Debug, Deserialize)]
struct ApiModel {
    id: String,
}
