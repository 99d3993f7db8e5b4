//! Stage pipeline: an ordered chain of stages threading one shared result
//! set through a run.
//!
//! ```text
//! Pipeline::run(message)
//!   → Stage₁.handle(ctx) → record(Stage₁, result)
//!   → Stage₂.handle(ctx) → record(Stage₂, result)
//!   → ...
//!   → PipelineContext
//! ```
//!
//! Stages run one at a time. A stage that needs an earlier stage's data
//! reads it with [`PipelineContext::data_of`] and fails fast if it is
//! missing or errored.

pub mod artifact;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod presets;
pub mod stage;
pub mod stages;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use artifact::{extract_code_blocks, write_first_block};
pub use context::{PipelineContext, StageEntry, StageResult};
pub use error::{ArtifactError, ContextError};
pub use pipeline::Pipeline;
pub use presets::{SiteBuilder, site_builder};
pub use stage::Stage;
pub use stages::{AcknowledgeStage, AgentStage, ArtifactStage, PromptSource};
