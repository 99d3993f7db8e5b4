//! Backend trait: the abstraction over model endpoints.
//!
//! A Backend takes a fully formed chat request and hands back the raw HTTP
//! reply. It does not interpret the body: status checks, content extraction
//! and tool-call decoding happen in the dispatcher.
//!
//! Implementations: local Ollama chat API, OpenAI-compatible endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::TransportError;
use crate::message::Message;
use crate::tool::ToolCall;

/// The request payload sent to a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model to use (e.g. "qwen-max", "qwen2.5-coder:1.5b")
    pub model: String,

    /// The conversation messages, in order
    pub messages: Vec<Message>,

    /// Always false: replies are read in one piece
    #[serde(default)]
    pub stream: bool,

    /// Ask the backend to ground its answer with a search
    #[serde(default)]
    pub enable_search: bool,

    /// Tool descriptors advertised to the backend
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

/// A response that made it back over the wire, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Full URL the request was sent to
    pub url: String,

    /// HTTP status code
    pub status: u16,

    /// Response body
    pub body: String,
}

impl RawResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Whether the backend reported failure (4xx or 5xx).
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// The core Backend trait.
///
/// The dispatcher calls `send()` without knowing which endpoint is behind it.
#[async_trait]
pub trait Backend: Send + Sync {
    /// A human-readable name (e.g. "ollama", "dashscope").
    fn name(&self) -> &str;

    /// Base URL requests are sent under.
    fn base_url(&self) -> &str;

    /// Send one request. Only failures to complete the exchange are errors;
    /// HTTP error statuses come back as a `RawResponse`.
    async fn send(&self, request: &ChatRequest) -> std::result::Result<RawResponse, TransportError>;

    /// List model identifiers the backend can serve.
    async fn list_models(&self) -> std::result::Result<Vec<String>, TransportError> {
        Ok(Vec::new())
    }
}
