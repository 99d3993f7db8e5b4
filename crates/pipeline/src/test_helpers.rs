//! Shared test helpers for stage and preset tests.

use stagehand_agent::{Dispatcher, RateLimiter, RetryPolicy};
use stagehand_core::{Backend, ChatRequest, RawResponse, TransportError};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

pub const LOCAL_BASE: &str = "http://127.0.0.1:11434";

/// A backend that returns scripted responses in order and records requests.
///
/// Calls past the end of the script fail with a network error.
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<RawResponse>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<RawResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
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
        LOCAL_BASE
    }

    async fn send(&self, request: &ChatRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Network("script exhausted".into()))
    }
}

/// A 200 local-shape reply.
pub fn reply(content: &str) -> RawResponse {
    let body = serde_json::json!({ "message": { "role": "assistant", "content": content } });
    RawResponse::new(format!("{LOCAL_BASE}/api/chat"), 200, body.to_string())
}

/// A local-shape error reply.
pub fn status_reply(status: u16) -> RawResponse {
    RawResponse::new(format!("{LOCAL_BASE}/api/chat"), status, r#"{"error":"unavailable"}"#)
}

/// Single-attempt dispatcher with a roomy bucket.
pub fn dispatcher() -> Dispatcher {
    let policy = RetryPolicy {
        max_attempts: 1,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(1),
        throttle_delay: Duration::from_millis(1),
    };
    Dispatcher::new(RateLimiter::new(100, 100.0), policy).with_local_base_url(LOCAL_BASE)
}
