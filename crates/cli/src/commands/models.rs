//! `stagehand models`: list the models a backend serves.

use stagehand_config::{AppConfig, BackendKind};

pub async fn run(
    config: &AppConfig,
    backend: Option<BackendKind>,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = stagehand_providers::router::build_from_config(config)?;
    let kind = backend.unwrap_or(router.default_kind());
    let backend = router.get(kind);

    let models = backend.list_models().await?;
    if models.is_empty() {
        println!("No models reported by {} ({})", backend.name(), backend.base_url());
        return Ok(());
    }

    println!("Models on {} ({}):", backend.name(), backend.base_url());
    for model in models {
        println!("  {model}");
    }
    Ok(())
}
