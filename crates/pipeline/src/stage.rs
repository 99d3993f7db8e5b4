//! The Stage trait.

use async_trait::async_trait;

use crate::context::{PipelineContext, StageResult};

/// A named pipeline step.
///
/// A stage reads what earlier stages recorded and returns its own result;
/// the pipeline records it under [`Stage::name`]. Failures are returned as
/// error-bearing results, never panics.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Key this stage's result is recorded under
    fn name(&self) -> &str;

    async fn handle(&self, ctx: &PipelineContext) -> StageResult;
}
