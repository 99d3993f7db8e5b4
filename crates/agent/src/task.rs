//! A single agent task: configuration, request assembly, and the lifecycle
//! driven by one dispatch.

use serde::{Deserialize, Serialize};
use stagehand_core::{
    AgentRole, AgentState, Backend, ChatRequest, DispatchError, Message, ToolRegistry,
};
use tracing::{debug, info, warn};

use crate::dispatcher::{Dispatcher, Reply};
use crate::prompts::PromptRegistry;

/// What an agent is asked to do. Fixed once the agent is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub task_id: String,
    pub name: String,
    /// Backend model identifier
    pub model: String,
    pub role: AgentRole,
    pub user_prompt: String,
    /// Earlier conversation; only user turns are replayed
    #[serde(default)]
    pub context: Vec<Message>,
    #[serde(default)]
    pub enable_search: bool,
    #[serde(skip)]
    pub tools: ToolRegistry,
}

impl AgentConfig {
    pub fn new(role: AgentRole) -> Self {
        Self {
            task_id: uuid::Uuid::new_v4().to_string(),
            name: role.to_string(),
            model: "qwen-max".into(),
            role,
            user_prompt: String::new(),
            context: Vec::new(),
            enable_search: false,
            tools: ToolRegistry::new(),
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = task_id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_user_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.user_prompt = prompt.into();
        self
    }

    pub fn with_context(mut self, context: Vec<Message>) -> Self {
        self.context = context;
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
}

/// An agent runs exactly one task.
///
/// It starts `Pending`, moves to `Running` when dispatch starts, and ends
/// `Completed` or `Failed`. A finished agent cannot be run again.
#[derive(Debug)]
pub struct Agent {
    config: AgentConfig,
    system_prompt: String,
    state: AgentState,
}

impl Agent {
    /// Build an agent, resolving its system prompt from `prompts`.
    pub fn new(config: AgentConfig, prompts: &PromptRegistry) -> Self {
        let system_prompt = prompts.get(config.role).to_string();
        Self {
            config,
            system_prompt,
            state: AgentState::Pending,
        }
    }

    /// Agent name and system prompt.
    pub fn role_info(&self) -> (&str, &str) {
        (&self.config.name, &self.system_prompt)
    }

    pub fn is_finished(&self) -> bool {
        self.state == AgentState::Completed
    }

    pub fn has_context(&self) -> bool {
        !self.config.context.is_empty()
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Assemble the request payload.
    ///
    /// Message order: system prompt, user prompt, `extra`, then the user
    /// turns of the prior context. Other context roles are dropped.
    pub fn build_request(&self, extra: &[Message]) -> ChatRequest {
        let mut messages = Vec::with_capacity(2 + extra.len() + self.config.context.len());
        messages.push(Message::system(&self.system_prompt));
        messages.push(Message::user(&self.config.user_prompt));
        messages.extend_from_slice(extra);
        messages.extend(self.config.context.iter().filter(|m| m.is_user()).cloned());

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            stream: false,
            enable_search: self.config.enable_search,
            tool_calls: self.config.tools.descriptors().to_vec(),
        }
    }

    /// Run the task once through `dispatcher` against `backend`.
    pub async fn execute(
        &mut self,
        dispatcher: &Dispatcher,
        backend: &dyn Backend,
        extra: &[Message],
    ) -> Result<Reply, DispatchError> {
        if self.state != AgentState::Pending {
            return Err(DispatchError::NotPending {
                agent: self.config.name.clone(),
                state: self.state,
            });
        }
        self.set_state(AgentState::Running);

        let request = self.build_request(extra);
        debug!(
            agent = %self.config.name,
            task_id = %self.config.task_id,
            model = %request.model,
            messages = request.messages.len(),
            backend = %backend.name(),
            "Dispatching task"
        );

        let result = dispatcher.dispatch(backend, &request).await;
        match &result {
            Ok(reply) => {
                self.set_state(AgentState::Completed);
                info!(
                    agent = %self.config.name,
                    chars = reply.content.len(),
                    tool_calls = reply.tool_calls.len(),
                    "Task completed"
                );
            }
            Err(e) => {
                self.set_state(AgentState::Failed);
                warn!(agent = %self.config.name, error = %e, "Task failed");
            }
        }
        result
    }

    fn set_state(&mut self, next: AgentState) {
        // Only Pending→Running→terminal is reachable from execute.
        if let Ok(state) = self.state.transition(next) {
            self.state = state;
        }
    }
}
