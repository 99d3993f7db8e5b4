//! Resilient backend dispatch: rate limiting plus bounded exponential
//! backoff around a single backend call.
//!
//! Only transport failures are retried. Once a response is back, its status,
//! tool calls and content decide the outcome with no further attempts.

use serde_json::Value;
use stagehand_config::AppConfig;
use stagehand_core::{Backend, ChatRequest, DispatchError, RawResponse, ToolCall};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

use crate::extract::{ReplyShape, content_at, tool_calls_at};
use crate::rate_limiter::RateLimiter;

/// Retry and throttling policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts per call, including the first
    pub max_attempts: u32,
    /// Sleep after the first transport failure; doubles each retry
    pub initial_backoff: Duration,
    /// Upper bound for the doubled backoff
    pub max_backoff: Duration,
    /// Sleep after the rate limiter denies admission
    pub throttle_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            throttle_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &stagehand_config::DispatchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            throttle_delay: Duration::from_millis(config.throttle_delay_ms),
        }
    }
}

/// A successful dispatch: decoded tool calls plus the reply text.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub tool_calls: Vec<ToolCall>,
    pub content: String,
}

/// Wraps backend calls with admission control and retry.
///
/// The limiter sits behind a mutex so one dispatcher can serve every stage
/// of a pipeline, or several pipelines at once.
pub struct Dispatcher {
    limiter: Mutex<RateLimiter>,
    policy: RetryPolicy,
    local_base_url: String,
}

impl Dispatcher {
    pub fn new(limiter: RateLimiter, policy: RetryPolicy) -> Self {
        Self {
            limiter: Mutex::new(limiter),
            policy,
            local_base_url: "http://127.0.0.1:11434".into(),
        }
    }

    /// Build from the `[dispatch]` and `[local]` configuration sections.
    pub fn from_config(config: &AppConfig) -> Self {
        let limiter = RateLimiter::new(config.dispatch.bucket_size, config.dispatch.refill_per_sec);
        Self::new(limiter, RetryPolicy::from_config(&config.dispatch))
            .with_local_base_url(&config.local.base_url)
    }

    /// Responses from URLs under this base are read as local replies.
    pub fn with_local_base_url(mut self, url: impl Into<String>) -> Self {
        self.local_base_url = url.into();
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn admit(&self) -> bool {
        self.limiter
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .allow()
    }

    /// Send `request`, retrying transport failures with exponential backoff.
    ///
    /// Throttle waits do not count against the attempt budget.
    pub async fn send(
        &self,
        backend: &dyn Backend,
        request: &ChatRequest,
    ) -> Result<RawResponse, DispatchError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut backoff = self.policy.initial_backoff;
        let mut attempts = 0;

        loop {
            if !self.admit() {
                debug!(
                    backend = %backend.name(),
                    delay_ms = self.policy.throttle_delay.as_millis() as u64,
                    "Rate limiter denied admission, waiting"
                );
                tokio::time::sleep(self.policy.throttle_delay).await;
                continue;
            }

            attempts += 1;
            match backend.send(request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempts >= max_attempts => {
                    warn!(backend = %backend.name(), attempts, error = %e, "Retries exhausted");
                    return Err(DispatchError::RetriesExhausted { attempts, source: e });
                }
                Err(e) => {
                    warn!(
                        backend = %backend.name(),
                        attempt = attempts,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Backend call failed, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.policy.max_backoff);
                }
            }
        }
    }

    /// Send `request` and interpret the response.
    pub async fn dispatch(
        &self,
        backend: &dyn Backend,
        request: &ChatRequest,
    ) -> Result<Reply, DispatchError> {
        let response = self.send(backend, request).await?;
        self.interpret(&response)
    }

    /// Turn a raw response into a reply.
    ///
    /// Order: tool calls are decoded first (a malformed list fails outright),
    /// then an error status fails, then an empty reply text fails.
    pub fn interpret(&self, response: &RawResponse) -> Result<Reply, DispatchError> {
        let parsed: Option<Value> = serde_json::from_str(&response.body).ok();

        let tool_calls = match &parsed {
            Some(value) => tool_calls_at(value)?,
            None => Vec::new(),
        };

        if response.is_error() {
            warn!(status = response.status, body = %response.body, "Request failed");
            return Err(DispatchError::Status {
                status: response.status,
                tool_calls,
            });
        }

        let shape = ReplyShape::for_url(&response.url, &self.local_base_url);
        let content = parsed
            .as_ref()
            .map(|value| content_at(shape, value))
            .unwrap_or_default();

        if content.is_empty() {
            warn!(status = response.status, ?shape, body = %response.body, "Empty content from API");
            return Err(DispatchError::EmptyContent { tool_calls });
        }

        Ok(Reply {
            tool_calls,
            content,
        })
    }
}
