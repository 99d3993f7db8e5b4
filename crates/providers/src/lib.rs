//! Model backend implementations for Stagehand.
//!
//! All backends implement the `stagehand_core::Backend` trait.
//! The router selects the correct backend based on configuration.

pub mod local;
pub mod openai_compat;
pub mod router;

pub use local::OllamaBackend;
pub use openai_compat::OpenAiCompatBackend;
pub use router::BackendRouter;

use stagehand_core::{RawResponse, TransportError};

/// Map a reqwest failure onto the transport taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}

/// Read status and body off a completed exchange.
pub(crate) async fn into_raw(
    url: &str,
    response: reqwest::Response,
) -> Result<RawResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(transport_error)?;
    Ok(RawResponse::new(url, status, body))
}

/// Build a client with the given transport timeout.
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, TransportError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| TransportError::NotConfigured(format!("Failed to create HTTP client: {e}")))
}
