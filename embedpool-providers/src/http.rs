//! Shared HTTP plumbing for the provider adapters.

use std::time::Duration;

use embedpool_core::{EmbedPoolError, Result};

/// Build the reqwest client every adapter uses.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| EmbedPoolError::provider(format!("failed to build HTTP client: {e}")))
}

/// Translate a transport-level failure into the core error taxonomy.
pub(crate) fn map_request_error(err: &reqwest::Error, timeout: Duration) -> EmbedPoolError {
    if err.is_timeout() {
        EmbedPoolError::timeout(timeout.as_secs())
    } else {
        EmbedPoolError::provider(format!("request failed: {err}"))
    }
}

/// Reject non-success statuses with the body text attached when available.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(EmbedPoolError::provider(format!(
        "API error {status}: {body}"
    )))
}
