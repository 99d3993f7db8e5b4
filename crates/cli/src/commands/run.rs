//! `stagehand run`: run the site-builder pipeline on one message.

use stagehand_agent::{Dispatcher, PromptRegistry};
use stagehand_config::{AppConfig, BackendKind};
use stagehand_pipeline::{PipelineContext, SiteBuilder, site_builder};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Command-line overrides for a run.
#[derive(Debug, Default)]
pub struct RunOptions {
    pub backend: Option<BackendKind>,
    pub artifact: Option<PathBuf>,
    pub model: Option<String>,
}

/// Resolve the backend kind and model a run uses.
pub fn resolve(config: &AppConfig, opts: &RunOptions) -> (BackendKind, String) {
    let kind = opts.backend.unwrap_or(config.pipeline.backend);
    let model = opts.model.clone().unwrap_or_else(|| match kind {
        BackendKind::Local => config.local.default_model.clone(),
        BackendKind::Remote => config.remote.default_model.clone(),
    });
    (kind, model)
}

pub async fn run(
    config: &AppConfig,
    message: &str,
    opts: RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = stagehand_providers::router::build_from_config(config)?;
    let (kind, model) = resolve(config, &opts);

    let pipeline = site_builder(SiteBuilder {
        backend: router.get(kind),
        dispatcher: Arc::new(Dispatcher::from_config(config)),
        prompts: Arc::new(PromptRegistry::from_config(config)),
        model,
        artifact_path: opts
            .artifact
            .unwrap_or_else(|| config.pipeline.artifact_path.clone()),
    });

    let ctx = pipeline.run(message).await;
    report(&ctx)
}

fn report(ctx: &PipelineContext) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(ctx)?);

    let failed = ctx.failed_stages();
    if !failed.is_empty() {
        warn!(stages = ?failed, "Some stages failed");
    }
    Ok(())
}
