//! Reading replies out of raw backend bodies.
//!
//! Pure functions over the response text; nothing here touches agent state.

use serde_json::Value;
use stagehand_core::{DispatchError, ToolCall};

/// Where the reply text sits in a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    /// Ollama chat API: `message.content`
    Local,
    /// OpenAI-compatible: `choices[0].message.content`
    OpenAiCompat,
}

impl ReplyShape {
    /// Pick the shape from the URL a response came from: anything under the
    /// local base URL is a local reply.
    pub fn for_url(url: &str, local_base_url: &str) -> Self {
        let base = local_base_url.trim_end_matches('/');
        let under_base = !base.is_empty()
            && url
                .strip_prefix(base)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?']));
        if under_base {
            ReplyShape::Local
        } else {
            ReplyShape::OpenAiCompat
        }
    }

    fn pointer(self) -> &'static str {
        match self {
            ReplyShape::Local => "/message/content",
            ReplyShape::OpenAiCompat => "/choices/0/message/content",
        }
    }
}

/// Extract the reply text. Missing paths, non-string values and bodies that
/// are not JSON all yield an empty string.
pub fn extract_content(shape: ReplyShape, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .map(|value| content_at(shape, &value))
        .unwrap_or_default()
}

pub(crate) fn content_at(shape: ReplyShape, value: &Value) -> String {
    value
        .pointer(shape.pointer())
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

/// Decode the top-level `tool_calls` list.
///
/// An absent or null field means no tool calls. A present field that does
/// not decode is a [`DispatchError::ToolCallDecode`].
pub fn decode_tool_calls(body: &str) -> Result<Vec<ToolCall>, DispatchError> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => tool_calls_at(&value),
        Err(_) => Ok(Vec::new()),
    }
}

pub(crate) fn tool_calls_at(value: &Value) -> Result<Vec<ToolCall>, DispatchError> {
    match value.get("tool_calls") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(raw) => serde_json::from_value(raw.clone())
            .map_err(|e| DispatchError::ToolCallDecode(e.to_string())),
    }
}
