//! Ordered stage runner.

use std::time::Instant;
use tracing::{info, warn};

use crate::context::PipelineContext;
use crate::stage::Stage;

/// An ordered list of stages sharing one context per run.
///
/// Stages run strictly in the order they were added; each sees the results
/// of every stage before it.
pub struct Pipeline {
    name: String,
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Append a stage.
    pub fn add_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn push(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage against a fresh context seeded with `message`.
    ///
    /// A failing stage records its error and the run continues; later stages
    /// that depend on it fail fast on their own.
    pub async fn run(&self, message: impl Into<String>) -> PipelineContext {
        let mut ctx = PipelineContext::new(message);
        info!(
            pipeline = %self.name,
            run_id = %ctx.run_id,
            stages = self.stages.len(),
            "Pipeline run started"
        );

        for (index, stage) in self.stages.iter().enumerate() {
            let started = Instant::now();
            let result = stage.handle(&ctx).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match &result.err {
                None => info!(stage = %stage.name(), index, elapsed_ms, "Stage completed"),
                Some(err) => warn!(stage = %stage.name(), index, elapsed_ms, error = %err, "Stage failed"),
            }
            ctx.record(stage.name(), result);
        }

        info!(
            pipeline = %self.name,
            run_id = %ctx.run_id,
            failed = ctx.failed_stages().len(),
            "Pipeline run finished"
        );
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StageResult;
    use crate::error::ContextError;
    use async_trait::async_trait;

    /// Echoes the upstream data with a suffix, or the run message if it has
    /// no upstream.
    struct Append {
        name: String,
        upstream: Option<String>,
        suffix: &'static str,
    }

    impl Append {
        fn new(name: &str, upstream: Option<&str>, suffix: &'static str) -> Self {
            Self {
                name: name.into(),
                upstream: upstream.map(String::from),
                suffix,
            }
        }
    }

    #[async_trait]
    impl Stage for Append {
        fn name(&self) -> &str {
            &self.name
        }

        async fn handle(&self, ctx: &PipelineContext) -> StageResult {
            let input: Result<&str, ContextError> = match &self.upstream {
                Some(up) => ctx.data_of(up),
                None => Ok(&ctx.message),
            };
            match input {
                Ok(data) => StageResult::ok(format!("{data}{}", self.suffix)),
                Err(e) => StageResult::failed(e.to_string()),
            }
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl Stage for AlwaysFails {
        fn name(&self) -> &str {
            "first"
        }

        async fn handle(&self, _ctx: &PipelineContext) -> StageResult {
            StageResult::failed("request failed: 500")
        }
    }

    #[tokio::test]
    async fn stages_run_in_order() {
        let pipeline = Pipeline::new("test")
            .add_stage(Append::new("first", None, "-a"))
            .add_stage(Append::new("second", Some("first"), "-b"))
            .add_stage(Append::new("third", Some("second"), "-c"));

        let ctx = pipeline.run("msg").await;
        assert_eq!(ctx.stage_names(), ["first", "second", "third"]);
        assert_eq!(ctx.data_of("third").unwrap(), "msg-a-b-c");
        assert!(ctx.failed_stages().is_empty());
    }

    #[tokio::test]
    async fn dependent_stage_fails_fast_on_upstream_error() {
        let pipeline = Pipeline::new("test")
            .add_stage(AlwaysFails)
            .add_stage(Append::new("second", Some("first"), "-b"))
            .add_stage(Append::new("independent", None, "!"));

        let ctx = pipeline.run("msg").await;
        let second = ctx.get("second").unwrap();
        assert!(second.data.is_empty());
        assert!(second.err.as_deref().unwrap().contains("stage 'first' failed"));
        assert_eq!(ctx.data_of("independent").unwrap(), "msg!");
        assert_eq!(ctx.failed_stages(), ["first", "second"]);
    }

    #[tokio::test]
    async fn stage_cannot_read_later_stage() {
        let pipeline = Pipeline::new("test")
            .add_stage(Append::new("early", Some("late"), ""))
            .add_stage(Append::new("late", None, ""));

        let ctx = pipeline.run("msg").await;
        assert_eq!(
            ctx.get("early").unwrap().err.as_deref(),
            Some("stage 'late' has not run")
        );
    }

    #[tokio::test]
    async fn empty_pipeline_returns_seeded_context() {
        let pipeline = Pipeline::new("empty");
        assert!(pipeline.is_empty());

        let ctx = pipeline.run("hello").await;
        assert_eq!(ctx.message, "hello");
        assert!(ctx.is_empty());
    }
}
