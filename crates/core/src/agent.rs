//! Agent roles and the lifecycle state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role an agent plays. Selects the system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Turns a raw request into a structured requirement list
    DemandAnalysis,
    /// Writes complete front-end code
    FrontEnd,
    /// Carries out a concrete task
    TaskExecution,
    /// Gathers supporting information for other agents
    Assistance,
    /// Watches task progress
    Monitoring,
    /// Summarises results for the requester
    ResultFeedback,
}

impl AgentRole {
    pub const ALL: [AgentRole; 6] = [
        AgentRole::DemandAnalysis,
        AgentRole::FrontEnd,
        AgentRole::TaskExecution,
        AgentRole::Assistance,
        AgentRole::Monitoring,
        AgentRole::ResultFeedback,
    ];

    /// The snake_case key used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::DemandAnalysis => "demand_analysis",
            AgentRole::FrontEnd => "front_end",
            AgentRole::TaskExecution => "task_execution",
            AgentRole::Assistance => "assistance",
            AgentRole::Monitoring => "monitoring",
            AgentRole::ResultFeedback => "result_feedback",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == key)
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a single agent task.
///
/// `Pending → Running → {Completed | Failed}`. Terminal states never change;
/// a new task needs a new agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl AgentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentState::Completed | AgentState::Failed)
    }

    pub fn can_transition_to(&self, next: AgentState) -> bool {
        use AgentState::{Completed, Failed, Pending, Running};
        matches!(
            (self, next),
            (Pending, Running) | (Running, Completed) | (Running, Failed)
        )
    }

    /// Move to `next`, or return the current state if the move is illegal.
    pub fn transition(self, next: AgentState) -> Result<AgentState, AgentState> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentState::Pending => "pending",
            AgentState::Running => "running",
            AgentState::Completed => "completed",
            AgentState::Failed => "failed",
        };
        f.write_str(s)
    }
}
