//! Ready-made pipelines.

use stagehand_agent::{Dispatcher, PromptRegistry};
use stagehand_core::{AgentRole, Backend};
use std::path::PathBuf;
use std::sync::Arc;

use crate::pipeline::Pipeline;
use crate::stages::{AcknowledgeStage, AgentStage, ArtifactStage};

pub const REQUESTER: &str = "Requester";
pub const THINKER: &str = "Thinker";
pub const ARTIFACT: &str = "Artifact";
pub const TASK_PUBLISHER: &str = "TaskPublisher";
pub const TASK_EXECUTOR: &str = "TaskExecutor";
pub const TASK_COLLECTOR: &str = "TaskCollector";

/// User prompt for the front-end agent; the requirements follow it.
pub const COMPLETE_CODE_PROMPT: &str = "Give me the complete code, no omissions.";

/// Inputs for [`site_builder`].
pub struct SiteBuilder {
    pub backend: Arc<dyn Backend>,
    pub dispatcher: Arc<Dispatcher>,
    pub prompts: Arc<PromptRegistry>,
    /// Model used by both agent stages
    pub model: String,
    pub artifact_path: PathBuf,
}

/// Requirements analysis, then front-end code, then the code written to
/// `artifact_path`, then the task acknowledgement stages.
pub fn site_builder(opts: SiteBuilder) -> Pipeline {
    let agent = |name: &str, role: AgentRole| {
        AgentStage::new(
            name,
            role,
            Arc::clone(&opts.backend),
            Arc::clone(&opts.dispatcher),
            Arc::clone(&opts.prompts),
        )
        .with_model(&opts.model)
    };

    let requester = agent(REQUESTER, AgentRole::DemandAnalysis).with_agent_name("demand analyst");
    let thinker = agent(THINKER, AgentRole::FrontEnd)
        .with_agent_name("front-end engineer")
        .with_fixed_prompt(COMPLETE_CODE_PROMPT)
        .reading_from(REQUESTER);

    Pipeline::new("site_builder")
        .add_stage(requester)
        .add_stage(thinker)
        .add_stage(ArtifactStage::new(ARTIFACT, THINKER, opts.artifact_path))
        .add_stage(AcknowledgeStage::new(TASK_PUBLISHER))
        .add_stage(AcknowledgeStage::new(TASK_EXECUTOR))
        .add_stage(AcknowledgeStage::new(TASK_COLLECTOR))
}
