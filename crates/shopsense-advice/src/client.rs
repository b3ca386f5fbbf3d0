//! HTTP client for the advisory backend.
//!
//! Wraps `reqwest` with the backend's JSON envelope handling: non-2xx
//! responses and `"success": false` envelopes both surface as
//! [`AdviceError::Api`], and request timeouts as [`AdviceError::Timeout`].

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::AdviceError;
use crate::types::{AdviceEnvelope, AdviceRequest, SalesAdvice};

const DEFAULT_BASE_URL: &str = "https://shopsense-advice-api.onrender.com/";

/// Client for the advisory backend.
///
/// Use [`AdviceClient::new`] for production or
/// [`AdviceClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug)]
pub struct AdviceClient {
    client: Client,
    endpoint: Url,
}

impl AdviceClient {
    /// Creates a client pointed at the production backend.
    ///
    /// # Errors
    ///
    /// Returns [`AdviceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, AdviceError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AdviceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`AdviceError::Api`] if `base_url` is not a
    /// valid URL.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, AdviceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("shopsense/0.1 (advisory-client)")
            .build()?;

        // Normalise: exactly one trailing slash so join() appends rather
        // than replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join("api/analyze"))
            .map_err(|e| AdviceError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// Submits a product for analysis and returns the advisory payload.
    ///
    /// # Errors
    ///
    /// - [`AdviceError::Timeout`] when the backend does not answer in time.
    /// - [`AdviceError::Api`] on a non-2xx status or an unsuccessful
    ///   envelope; the backend's own error message is surfaced when present.
    /// - [`AdviceError::Http`] on network failure.
    /// - [`AdviceError::Deserialize`] if the body is not the expected shape.
    pub async fn analyze(&self, request: &AdviceRequest) -> Result<SalesAdvice, AdviceError> {
        tracing::debug!(
            title = %request.product_data.title,
            language = %request.language,
            currency = %request.currency,
            "submitting product for analysis"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<AdviceEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .unwrap_or_else(|| format!("server error: {status}"));
            return Err(AdviceError::Api(message));
        }

        let envelope: AdviceEnvelope =
            serde_json::from_str(&body).map_err(|e| AdviceError::Deserialize {
                context: self.endpoint.to_string(),
                source: e,
            })?;

        if !envelope.success {
            return Err(AdviceError::Api(
                envelope
                    .error
                    .unwrap_or_else(|| "server returned unsuccessful response".to_string()),
            ));
        }

        Ok(envelope.sales_advice.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_joined_onto_the_base() {
        let client = AdviceClient::with_base_url(30, "https://advice.example.com")
            .expect("client construction should not fail");
        assert_eq!(
            client.endpoint.as_str(),
            "https://advice.example.com/api/analyze"
        );

        let slashed = AdviceClient::with_base_url(30, "https://advice.example.com///")
            .expect("client construction should not fail");
        assert_eq!(
            slashed.endpoint.as_str(),
            "https://advice.example.com/api/analyze"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = AdviceClient::with_base_url(30, "not a url").unwrap_err();
        assert!(matches!(err, AdviceError::Api(_)));
    }
}
