//! Backend router. Builds both backends from config and hands out the one
//! a pipeline asks for.

use std::sync::Arc;
use stagehand_config::{AppConfig, BackendKind};
use stagehand_core::{Backend, TransportError};
use crate::local::OllamaBackend;
use crate::openai_compat::OpenAiCompatBackend;

/// Holds one backend per kind.
pub struct BackendRouter {
    local: Arc<dyn Backend>,
    remote: Arc<dyn Backend>,
    default_kind: BackendKind,
}

impl BackendRouter {
    pub fn new(local: Arc<dyn Backend>, remote: Arc<dyn Backend>, default_kind: BackendKind) -> Self {
        Self {
            local,
            remote,
            default_kind,
        }
    }

    /// Get the backend for `kind`.
    pub fn get(&self, kind: BackendKind) -> Arc<dyn Backend> {
        match kind {
            BackendKind::Local => Arc::clone(&self.local),
            BackendKind::Remote => Arc::clone(&self.remote),
        }
    }

    /// Get the backend configured as the pipeline default.
    pub fn default_backend(&self) -> Arc<dyn Backend> {
        self.get(self.default_kind)
    }

    pub fn default_kind(&self) -> BackendKind {
        self.default_kind
    }
}

/// Build backends from configuration.
pub fn build_from_config(config: &AppConfig) -> Result<BackendRouter, TransportError> {
    let local: Arc<dyn Backend> = Arc::new(OllamaBackend::from_config(&config.local)?);
    let remote: Arc<dyn Backend> = Arc::new(OpenAiCompatBackend::from_config(&config.remote)?);
    Ok(BackendRouter::new(local, remote, config.pipeline.backend))
}
