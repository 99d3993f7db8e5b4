//! Agent task execution.
//!
//! An [`Agent`] runs one task:
//!
//! 1. **Assemble** the request (system prompt + user prompt + extra turns +
//!    replayed user context)
//! 2. **Dispatch** it through the [`Dispatcher`]: rate-limited, with
//!    exponential backoff on transport failures
//! 3. **Interpret** the reply: decode tool calls, check status, extract the
//!    reply text for the backend's response shape
//! 4. **Settle** its state to `Completed` or `Failed`

pub mod dispatcher;
pub mod extract;
pub mod prompts;
pub mod rate_limiter;
pub mod task;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use dispatcher::{Dispatcher, Reply, RetryPolicy};
pub use extract::{ReplyShape, decode_tool_calls, extract_content};
pub use prompts::{PromptRegistry, builtin_prompt};
pub use rate_limiter::RateLimiter;
pub use task::{Agent, AgentConfig};
