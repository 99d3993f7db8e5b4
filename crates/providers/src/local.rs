//! Local model backend: an Ollama server on this machine or the LAN.
//!
//! Chat goes to `POST {base_url}/api/chat`; the reply text lives at
//! `message.content`. Model listing reads `GET {base_url}/api/tags`.

use async_trait::async_trait;
use serde::Deserialize;
use stagehand_config::LocalBackendConfig;
use stagehand_core::{Backend, ChatRequest, RawResponse, TransportError};
use tracing::debug;

use crate::{http_client, into_raw, transport_error};

/// A backend speaking the Ollama chat API.
pub struct OllamaBackend {
    base_url: String,
    chat_path: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, TransportError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chat_path: "/api/chat".into(),
            client: http_client(timeout_secs)?,
        })
    }

    /// Build from the `[local]` configuration section.
    pub fn from_config(config: &LocalBackendConfig) -> Result<Self, TransportError> {
        Ok(Self::new(&config.base_url, config.timeout_secs)?.with_chat_path(&config.chat_path))
    }

    /// Override the chat endpoint path (default `/api/chat`).
    pub fn with_chat_path(mut self, path: impl Into<String>) -> Self {
        self.chat_path = path.into();
        self
    }

    fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.chat_path)
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: &ChatRequest) -> Result<RawResponse, TransportError> {
        let url = self.chat_url();
        debug!(backend = "ollama", model = %request.model, %url, "Sending chat request");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        into_raw(&url, response).await
    }

    async fn list_models(&self) -> Result<Vec<String>, TransportError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Network(format!(
                "failed to get model list: HTTP {}",
                status.as_u16()
            )));
        }

        let tags: TagsResponse = response.json().await.map_err(transport_error)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

// --- Ollama API types ---

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<LocalModel>,
}

#[derive(Debug, Deserialize)]
struct LocalModel {
    name: String,
}
