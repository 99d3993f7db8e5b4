//! Built-in stages: agent tasks, artifact output, and acknowledgements.

use async_trait::async_trait;
use stagehand_agent::{Agent, AgentConfig, Dispatcher, PromptRegistry};
use stagehand_core::{AgentRole, Backend, Message, ToolRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::artifact::write_first_block;
use crate::context::{PipelineContext, StageResult};
use crate::stage::Stage;

/// Where an agent stage gets its user prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    /// The message the run was started with
    RunMessage,
    /// A fixed prompt
    Fixed(String),
}

/// Runs one fresh [`Agent`] per pipeline run.
///
/// With an upstream stage set, that stage's data is sent as an extra user
/// message; if the upstream entry is missing or failed, the stage fails
/// without calling the backend.
pub struct AgentStage {
    name: String,
    role: AgentRole,
    agent_name: Option<String>,
    model: String,
    prompt: PromptSource,
    upstream: Option<String>,
    enable_search: bool,
    tools: ToolRegistry,
    backend: Arc<dyn Backend>,
    dispatcher: Arc<Dispatcher>,
    prompts: Arc<PromptRegistry>,
}

impl AgentStage {
    pub fn new(
        name: impl Into<String>,
        role: AgentRole,
        backend: Arc<dyn Backend>,
        dispatcher: Arc<Dispatcher>,
        prompts: Arc<PromptRegistry>,
    ) -> Self {
        Self {
            name: name.into(),
            role,
            agent_name: None,
            model: "qwen-max".into(),
            prompt: PromptSource::RunMessage,
            upstream: None,
            enable_search: false,
            tools: ToolRegistry::new(),
            backend,
            dispatcher,
            prompts,
        }
    }

    pub fn with_agent_name(mut self, name: impl Into<String>) -> Self {
        self.agent_name = Some(name.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_fixed_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = PromptSource::Fixed(prompt.into());
        self
    }

    /// Feed the data recorded by `stage` to the agent.
    pub fn reading_from(mut self, stage: impl Into<String>) -> Self {
        self.upstream = Some(stage.into());
        self
    }

    pub fn with_enable_search(mut self, enable: bool) -> Self {
        self.enable_search = enable;
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    fn agent_config(&self, ctx: &PipelineContext) -> AgentConfig {
        let user_prompt = match &self.prompt {
            PromptSource::RunMessage => ctx.message.clone(),
            PromptSource::Fixed(prompt) => prompt.clone(),
        };
        AgentConfig::new(self.role)
            .with_name(self.agent_name.as_deref().unwrap_or(&self.name))
            .with_model(&self.model)
            .with_user_prompt(user_prompt)
            .with_enable_search(self.enable_search)
            .with_tools(self.tools.clone())
    }
}

#[async_trait]
impl Stage for AgentStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, ctx: &PipelineContext) -> StageResult {
        let extra = match &self.upstream {
            Some(upstream) => match ctx.data_of(upstream) {
                Ok(data) => vec![Message::user(data)],
                Err(e) => return StageResult::failed(e.to_string()),
            },
            None => Vec::new(),
        };

        let mut agent = Agent::new(self.agent_config(ctx), &self.prompts);
        debug!(stage = %self.name, role = %self.role, "Running agent");
        let outcome = agent
            .execute(&self.dispatcher, self.backend.as_ref(), &extra)
            .await;
        StageResult::from_dispatch(outcome)
    }
}

/// Writes the first fenced code block of an earlier stage's data to a file.
pub struct ArtifactStage {
    name: String,
    source: String,
    path: PathBuf,
}

impl ArtifactStage {
    pub fn new(name: impl Into<String>, source: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl Stage for ArtifactStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, ctx: &PipelineContext) -> StageResult {
        let data = match ctx.data_of(&self.source) {
            Ok(data) => data,
            Err(e) => return StageResult::failed(e.to_string()),
        };

        match write_first_block(data, &self.path).await {
            Ok(bytes) => {
                info!(path = %self.path.display(), bytes, "Artifact written");
                StageResult::ok(self.path.display().to_string())
            }
            Err(e) => StageResult::failed(e.to_string()),
        }
    }
}

/// Records a fixed acknowledgement.
pub struct AcknowledgeStage {
    name: String,
}

impl AcknowledgeStage {
    pub const ACK: &'static str = "ok";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Stage for AcknowledgeStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, ctx: &PipelineContext) -> StageResult {
        debug!(stage = %self.name, message = %ctx.message, "Acknowledged");
        StageResult::ok(Self::ACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ScriptedBackend, dispatcher, reply};

    fn stage(backend: &Arc<ScriptedBackend>, role: AgentRole) -> AgentStage {
        AgentStage::new(
            "Agent",
            role,
            backend.clone(),
            Arc::new(dispatcher()),
            Arc::new(PromptRegistry::new()),
        )
    }

    #[tokio::test]
    async fn agent_stage_uses_run_message() {
        let backend = Arc::new(ScriptedBackend::new(vec![reply("requirements")]));
        let ctx = PipelineContext::new("Build a school homepage");

        let result = stage(&backend, AgentRole::DemandAnalysis)
            .with_model("qwen2.5-coder:1.5b")
            .handle(&ctx)
            .await;
        assert_eq!(result.data, "requirements");
        assert!(result.is_ok());

        let sent = &backend.requests()[0];
        assert_eq!(sent.model, "qwen2.5-coder:1.5b");
        assert_eq!(sent.messages[1].content, "Build a school homepage");
        assert_eq!(sent.messages.len(), 2);
    }

    #[tokio::test]
    async fn agent_stage_forwards_upstream_data() {
        let backend = Arc::new(ScriptedBackend::new(vec![reply("```html\n<p/>\n```")]));
        let mut ctx = PipelineContext::new("msg");
        ctx.record("Requester", StageResult::ok("1. A header"));

        let result = stage(&backend, AgentRole::FrontEnd)
            .with_fixed_prompt("Give me the complete code.")
            .reading_from("Requester")
            .handle(&ctx)
            .await;
        assert!(result.is_ok());

        let contents: Vec<String> = backend.requests()[0]
            .messages
            .iter()
            .map(|m| m.content.clone())
            .collect();
        assert_eq!(contents[1..], ["Give me the complete code.", "1. A header"]);
    }

    #[tokio::test]
    async fn agent_stage_fails_fast_without_upstream() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let mut ctx = PipelineContext::new("msg");
        ctx.record("Requester", StageResult::failed("empty content from API"));

        let result = stage(&backend, AgentRole::FrontEnd)
            .reading_from("Requester")
            .handle(&ctx)
            .await;
        assert!(result.err.unwrap().contains("Requester"));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn artifact_stage_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.html");
        let mut ctx = PipelineContext::new("msg");
        ctx.record("Thinker", StageResult::ok("Here:\n```html\n<html></html>\n```"));

        let result = ArtifactStage::new("Artifact", "Thinker", &path).handle(&ctx).await;
        assert!(result.is_ok());
        assert_eq!(result.data, path.display().to_string());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[tokio::test]
    async fn artifact_stage_without_code_block_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.html");
        let mut ctx = PipelineContext::new("msg");
        ctx.record("Thinker", StageResult::ok("Sorry, no code today."));

        let result = ArtifactStage::new("Artifact", "Thinker", &path).handle(&ctx).await;
        assert_eq!(result.err.as_deref(), Some("no fenced code block found"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn acknowledge_stage_records_ok() {
        let ctx = PipelineContext::new("msg");
        let result = AcknowledgeStage::new("TaskPublisher").handle(&ctx).await;
        assert_eq!(result.data, AcknowledgeStage::ACK);
    }
}
