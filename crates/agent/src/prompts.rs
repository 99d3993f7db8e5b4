//! Role → system prompt lookup.
//!
//! Every role has a built-in prompt. The `[prompts]` config table can
//! replace any of them by role key.

use stagehand_config::AppConfig;
use stagehand_core::AgentRole;
use std::collections::HashMap;

const DEMAND_ANALYSIS: &str = "\
You are a requirements analyst. Read the user's request and turn it into a \
clear, numbered list of concrete requirements: pages, sections, content, \
interactions and visual style. Fill gaps with sensible defaults for the kind \
of product described. Output only the requirement list.";

const FRONT_END: &str = "\
You are a senior front-end engineer. Based on the requirements you are given, \
produce one complete, self-contained HTML page built on Bootstrap 5.x.

Requirements:
- A polished, clean and modern layout that follows mainstream UI/UX practice.
- Complete structure: HTML, Bootstrap classes and any JavaScript needed.
- Responsive on mobile, tablet and desktop.
- Consistent typography, spacing and colour using the Bootstrap theme colours.
- A fixed or sticky navigation bar, Bootstrap buttons, clear forms, cards \
for content, and modals with smooth transitions where they fit.
- Load Bootstrap and Font Awesome from a CDN.
- No explanations, comments or hints. Output the full HTML in a single \
```html code block and nothing else.";

const TASK_EXECUTION: &str = "\
You are a task executor. Carry out the task you are given step by step, \
using the tools available to you when they help. Report what you did and the \
result of each step.";

const ASSISTANCE: &str = "\
You are an assistant to the task executor. Gather the supporting information \
a task needs: search the web, look up GitHub data or call APIs, then return \
the findings to the task executor.";

const MONITORING: &str = "\
You are a monitor. Track the progress of the running tasks, flag anything \
that is stuck, failing or drifting from the requirements, and suggest a fix.";

const RESULT_FEEDBACK: &str = "\
You are responsible for result feedback. Summarise what the other agents \
produced, check it against the original request, and tell the requester \
plainly what was delivered and what is still missing.";

/// Built-in prompt for `role`.
pub fn builtin_prompt(role: AgentRole) -> &'static str {
    match role {
        AgentRole::DemandAnalysis => DEMAND_ANALYSIS,
        AgentRole::FrontEnd => FRONT_END,
        AgentRole::TaskExecution => TASK_EXECUTION,
        AgentRole::Assistance => ASSISTANCE,
        AgentRole::Monitoring => MONITORING,
        AgentRole::ResultFeedback => RESULT_FEEDBACK,
    }
}

/// System prompts keyed by role.
#[derive(Debug, Clone, Default)]
pub struct PromptRegistry {
    overrides: HashMap<AgentRole, String>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every `[prompts]` entry from the config applied.
    pub fn from_config(config: &AppConfig) -> Self {
        AgentRole::ALL
            .into_iter()
            .fold(Self::new(), |registry, role| match config.prompt_override(role) {
                Some(prompt) => registry.with_override(role, prompt),
                None => registry,
            })
    }

    pub fn with_override(mut self, role: AgentRole, prompt: impl Into<String>) -> Self {
        self.overrides.insert(role, prompt.into());
        self
    }

    pub fn get(&self, role: AgentRole) -> &str {
        self.overrides
            .get(&role)
            .map(String::as_str)
            .unwrap_or_else(|| builtin_prompt(role))
    }

    pub fn is_overridden(&self, role: AgentRole) -> bool {
        self.overrides.contains_key(&role)
    }
}
