//! `stagehand config`: show the effective configuration.

use stagehand_config::AppConfig;
use std::path::Path;

/// The config as TOML, with the API key masked.
pub fn render(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.remote.api_key.is_some() {
        shown.remote.api_key = Some("[REDACTED]".into());
    }
    toml::to_string_pretty(&shown)
}

pub fn show(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render(config)?);
    Ok(())
}

pub fn path(config_path: &Path) {
    println!("{}", config_path.display());
}
