//! The shared, per-run result set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stagehand_agent::Reply;
use stagehand_core::{DispatchError, ToolCall};

use crate::error::ContextError;

/// What one stage produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub data: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,

    pub completed_at: DateTime<Utc>,
}

impl StageResult {
    pub fn ok(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            tool_calls: Vec::new(),
            err: None,
            completed_at: Utc::now(),
        }
    }

    pub fn failed(err: impl Into<String>) -> Self {
        Self {
            data: String::new(),
            tool_calls: Vec::new(),
            err: Some(err.into()),
            completed_at: Utc::now(),
        }
    }

    /// Fold a dispatch outcome into a result. Failures keep any tool calls
    /// decoded before the failure.
    pub fn from_dispatch(outcome: Result<Reply, DispatchError>) -> Self {
        match outcome {
            Ok(reply) => Self {
                tool_calls: reply.tool_calls,
                ..Self::ok(reply.content)
            },
            Err(e) => Self {
                tool_calls: e.tool_calls().to_vec(),
                ..Self::failed(e.to_string())
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.err.is_none()
    }
}

/// One named entry in the context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEntry {
    pub stage: String,
    #[serde(flatten)]
    pub result: StageResult,
}

/// Results of one pipeline run, in the order the stages ran.
///
/// Keys are unique: recording a name twice replaces the earlier result in
/// place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineContext {
    pub run_id: String,
    pub message: String,
    pub started_at: DateTime<Utc>,
    stages: Vec<StageEntry>,
}

impl PipelineContext {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
            started_at: Utc::now(),
            stages: Vec::new(),
        }
    }

    pub fn record(&mut self, stage: impl Into<String>, result: StageResult) {
        let stage = stage.into();
        match self.stages.iter_mut().find(|e| e.stage == stage) {
            Some(entry) => entry.result = result,
            None => self.stages.push(StageEntry { stage, result }),
        }
    }

    pub fn get(&self, stage: &str) -> Option<&StageResult> {
        self.stages.iter().find(|e| e.stage == stage).map(|e| &e.result)
    }

    /// The `data` an earlier stage produced.
    ///
    /// Fails if that stage has not run or recorded an error.
    pub fn data_of(&self, stage: &str) -> Result<&str, ContextError> {
        let result = self
            .get(stage)
            .ok_or_else(|| ContextError::MissingStage(stage.to_string()))?;
        match &result.err {
            Some(error) => Err(ContextError::StageFailed {
                stage: stage.to_string(),
                error: error.clone(),
            }),
            None => Ok(&result.data),
        }
    }

    pub fn entries(&self) -> &[StageEntry] {
        &self.stages
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|e| e.stage.as_str()).collect()
    }

    /// Names of the stages that recorded an error.
    pub fn failed_stages(&self) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|e| !e.result.is_ok())
            .map(|e| e.stage.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
