//! Shared test helpers for dispatcher and agent tests.

use stagehand_core::{Backend, ChatRequest, Message, RawResponse, TransportError};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

/// A backend that replays scripted outcomes in order and records every
/// request it sees.
///
/// Once the script runs out, the fallback outcome (if any) repeats forever.
/// Panics if called past the end of a script with no fallback.
pub struct ScriptedBackend {
    base_url: String,
    script: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    fallback: Option<Result<RawResponse, TransportError>>,
    requests: Mutex<Vec<ChatRequest>>,
    call_times: Mutex<Vec<Instant>>,
}

impl ScriptedBackend {
    pub const LOCAL_BASE: &'static str = "http://127.0.0.1:11434";
    pub const LOCAL_URL: &'static str = "http://127.0.0.1:11434/api/chat";
    pub const REMOTE_BASE: &'static str = "https://llm.example.com";
    pub const REMOTE_URL: &'static str = "https://llm.example.com/v1/chat/completions";

    fn new(base_url: &str, script: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self {
            base_url: base_url.into(),
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
            call_times: Mutex::new(Vec::new()),
        }
    }

    pub fn local(script: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self::new(Self::LOCAL_BASE, script)
    }

    pub fn remote(script: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self::new(Self::REMOTE_BASE, script)
    }

    /// A local backend whose every call fails with `err`.
    pub fn always_failing(err: TransportError) -> Self {
        let mut backend = Self::local(Vec::new());
        backend.fallback = Some(Err(err));
        backend
    }

    pub fn calls(&self) -> usize {
        self.call_times.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: &ChatRequest) -> Result<RawResponse, TransportError> {
        self.call_times.lock().unwrap().push(Instant::now());
        self.requests.lock().unwrap().push(request.clone());

        let next = self.script.lock().unwrap().pop_front();
        match (next, &self.fallback) {
            (Some(outcome), _) => outcome,
            (None, Some(fallback)) => fallback.clone(),
            (None, None) => panic!(
                "ScriptedBackend: no more responses (call #{})",
                self.calls()
            ),
        }
    }
}

/// A 200 response in the local (Ollama) shape.
pub fn local_body(content: &str) -> RawResponse {
    let body = serde_json::json!({
        "model": "qwen2.5-coder:1.5b",
        "message": { "role": "assistant", "content": content },
        "done": true
    });
    RawResponse::new(ScriptedBackend::LOCAL_URL, 200, body.to_string())
}

/// A 200 response in the OpenAI-compatible shape.
pub fn remote_body(content: &str) -> RawResponse {
    let body = serde_json::json!({
        "model": "qwen-max",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    });
    RawResponse::new(ScriptedBackend::REMOTE_URL, 200, body.to_string())
}

pub fn test_request() -> ChatRequest {
    ChatRequest {
        model: "test".into(),
        messages: vec![Message::user("hello")],
        stream: false,
        enable_search: false,
        tool_calls: vec![],
    }
}
