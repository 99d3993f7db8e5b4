//! Pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

/// A stage could not use an earlier stage's output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("stage '{0}' has not run")]
    MissingStage(String),

    #[error("stage '{stage}' failed: {error}")]
    StageFailed { stage: String, error: String },
}

/// Persisting a generated artifact failed.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("no fenced code block found")]
    NoCodeBlock,

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
