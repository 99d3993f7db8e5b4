//! Error types for the Stagehand domain.
//!
//! Uses `thiserror`. Each bounded context has its own error enum.

use crate::agent::AgentState;
use crate::tool::ToolCall;
use thiserror::Error;

/// The backend call did not complete. These are the only failures the
/// dispatcher retries.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),
}

/// Terminal outcome of a failed dispatch.
///
/// `Status` and `EmptyContent` carry whatever tool calls were decoded from
/// the response before the content check failed.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("failed to send request after {attempts} retries: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("failed to parse tool calls: {0}")]
    ToolCallDecode(String),

    #[error("request failed: {status}")]
    Status { status: u16, tool_calls: Vec<ToolCall> },

    #[error("empty content from API")]
    EmptyContent { tool_calls: Vec<ToolCall> },

    #[error("agent '{agent}' cannot run a task from state {state}")]
    NotPending { agent: String, state: AgentState },
}

impl DispatchError {
    /// Tool calls decoded before the dispatch failed, if any.
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            DispatchError::Status { tool_calls, .. } | DispatchError::EmptyContent { tool_calls } => {
                tool_calls
            }
            _ => &[],
        }
    }

    /// Whether the failure happened before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, DispatchError::RetriesExhausted { .. })
    }
}
